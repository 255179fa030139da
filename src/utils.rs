use crate::error::{HarvestError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Name used when a URL path has no final segment
pub const PLACEHOLDER_FILE_NAME: &str = "image";

/// Build the HTTP client shared by page fetches and image downloads.
///
/// Only connecting is time-limited; a slow image body is read to the end.
pub fn build_http_client(
    headers: &BTreeMap<String, String>,
    connect_timeout: Duration,
) -> Result<reqwest::Client> {
    let mut header_map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HarvestError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HarvestError::InvalidHeader(format!("{}: {}", name.as_str(), e)))?;
        header_map.insert(name, value);
    }

    let client = reqwest::Client::builder()
        .default_headers(header_map)
        .connect_timeout(connect_timeout)
        .build()?;
    Ok(client)
}

/// Derive a file name from the last path segment of a URL
pub fn file_name_for_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(PLACEHOLDER_FILE_NAME)
        .to_string()
}

/// Produce the `attempt`-th candidate for a file name: `photo.png`, `photo_1.png`, `photo_2.png`, ...
pub fn numbered_file_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, attempt, ext.to_string_lossy()),
        None => format!("{}_{}", stem, attempt),
    }
}
