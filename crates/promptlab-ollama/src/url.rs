//! URL construction helpers for the Ollama API.

use url::Url;

use crate::error::{OllamaError, OllamaResult};

/// Path of the model listing call.
pub const TAGS_PATH: &str = "api/tags";

/// Path of the generation call.
pub const GENERATE_PATH: &str = "api/generate";

/// Parse the configured endpoint into a base URL ending in `/`.
///
/// Only `http` and `https` are accepted. A trailing slash is added so
/// relative joins keep any path prefix (e.g. a reverse-proxy mount).
pub fn parse_base_url(endpoint: &str) -> OllamaResult<Url> {
    let invalid = |message: String| OllamaError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        message,
    };

    let mut url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Join an API path onto the base URL.
pub fn api_url(base: &Url, path: &str) -> OllamaResult<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| OllamaError::InvalidEndpoint {
            endpoint: base.to_string(),
            message: e.to_string(),
        })
}
