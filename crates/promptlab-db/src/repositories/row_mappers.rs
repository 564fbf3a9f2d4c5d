//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDateTime, Utc};
use promptlab_core::{Prompt, RepositoryError};
use sqlx::Row;

/// Shared SELECT column list for prompt queries.
pub const PROMPT_SELECT_COLUMNS: &str =
    "id, name, description, system_prompt, model, temperature, created_at, updated_at";

/// Format a timestamp for storage.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 as written by this crate, and the bare
/// `YYYY-MM-DD HH:MM:SS` form that `SQLite`'s `datetime()` produces.
pub fn parse_datetime(datetime_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(datetime_str)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            let trimmed = datetime_str.trim_end_matches(" UTC");
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .ok()
        })
}

fn column<'r, T>(row: &'r sqlx::sqlite::SqliteRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Storage(e.to_string()))
}

fn timestamp(row: &sqlx::sqlite::SqliteRow, name: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let raw: String = column(row, name)?;
    parse_datetime(&raw)
        .ok_or_else(|| RepositoryError::Serialization(format!("Invalid {name} timestamp: {raw}")))
}

/// Parse a database row into a Prompt.
pub fn row_to_prompt(row: &sqlx::sqlite::SqliteRow) -> Result<Prompt, RepositoryError> {
    Ok(Prompt {
        id: column(row, "id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        system_prompt: column(row, "system_prompt")?,
        model: column(row, "model")?,
        temperature: column(row, "temperature")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_datetime("2024-03-01T12:30:00+00:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01 12:30:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01 12:30:00 UTC"), Some(expected));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn test_format_round_trips() {
        let now = Utc::now();
        assert_eq!(parse_datetime(&format_datetime(&now)), Some(now));
    }
}
