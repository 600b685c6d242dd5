//! Fetch table bytes from a local path or an `http(s)://` URL.
//!
//! Remote tables are typically spreadsheet "publish as CSV" links. The body
//! is read fully into memory; tables are small.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::AppError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether `location` should be fetched over HTTP.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Read the full contents of `location`.
pub fn open_source(location: &str) -> Result<Vec<u8>, AppError> {
    let location = location.trim();
    if is_remote(location) {
        fetch_remote(location)
    } else {
        std::fs::read(location)
            .map_err(|e| AppError::new(2, format!("Failed to open '{location}': {e}")))
    }
}

fn fetch_remote(url: &str) -> Result<Vec<u8>, AppError> {
    tracing::info!(url, "fetching remote table");
    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;

    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::new(2, format!("Request to '{url}' failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::new(2, format!("Request to '{url}' returned HTTP {status}")));
    }

    let bytes = resp
        .bytes()
        .map_err(|e| AppError::new(2, format!("Failed to read body from '{url}': {e}")))?;
    Ok(bytes.to_vec())
}
