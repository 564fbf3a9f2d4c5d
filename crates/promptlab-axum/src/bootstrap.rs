//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use promptlab_core::services::AppCore;
use promptlab_core::{
    CoreError, EndpointError, ModelEndpointPort, Repos, Settings, validate_settings,
};
use promptlab_db::{CoreFactory, setup_database};
use promptlab_ollama::{DefaultOllamaClient, map_error};

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Startup settings (bind address, database, endpoint).
    pub settings: Settings,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            cors: CorsConfig::default(),
        }
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.settings.effective_server_host(),
            self.settings.effective_server_port()
        )
    }
}

/// Builds a model endpoint client from settings.
pub type EndpointFactory =
    Arc<dyn Fn(&Settings) -> Result<Arc<dyn ModelEndpointPort>, EndpointError> + Send + Sync>;

/// Factory producing reqwest-backed Ollama clients.
pub fn ollama_endpoint_factory() -> EndpointFactory {
    Arc::new(|settings: &Settings| {
        let client = DefaultOllamaClient::from_settings(settings).map_err(map_error)?;
        Ok(Arc::new(client) as Arc<dyn ModelEndpointPort>)
    })
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// The core application facade.
    pub core: Arc<AppCore>,
    endpoint_factory: EndpointFactory,
}

impl AxumContext {
    pub fn new(core: Arc<AppCore>, endpoint_factory: EndpointFactory) -> Self {
        Self {
            core,
            endpoint_factory,
        }
    }

    /// Build a client for `settings` without installing it.
    pub fn build_endpoint(
        &self,
        settings: &Settings,
    ) -> Result<Arc<dyn ModelEndpointPort>, CoreError> {
        (self.endpoint_factory)(settings).map_err(CoreError::from)
    }

    /// Build a client for `settings` and swap it in for new requests.
    pub async fn rebuild_endpoint(&self, settings: &Settings) -> Result<(), CoreError> {
        let endpoint = self.build_endpoint(settings)?;
        self.core.playground().replace_endpoint(endpoint).await;
        Ok(())
    }
}

/// Wire repositories and an endpoint client into a context.
///
/// The startup settings are validated and stored so the config API starts
/// from them.
pub async fn build_context(
    repos: Repos,
    settings: &Settings,
    endpoint_factory: EndpointFactory,
) -> Result<AxumContext> {
    validate_settings(settings)?;
    let endpoint = endpoint_factory(settings)?;
    let core = Arc::new(AppCore::new(repos, endpoint));
    core.settings().save(settings).await?;
    Ok(AxumContext::new(core, endpoint_factory))
}

/// Bootstrap the Axum server with all services.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let settings = &config.settings;
    let db_path = Path::new(settings.effective_database_path());

    tracing::info!(
        target: "promptlab.bootstrap",
        database_path = %db_path.display(),
        ollama_endpoint = settings.effective_ollama_endpoint(),
        default_model = settings.effective_default_model(),
        "Axum bootstrap resolved settings"
    );

    let pool = setup_database(db_path).await?;
    let repos = CoreFactory::build_repos(pool);
    build_context(repos, settings, ollama_endpoint_factory()).await
}

/// Start the web server on the configured address.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config).await?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("promptlab API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
