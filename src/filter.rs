use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for filtering resolved image URLs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageFilterConfig {
    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Decides which resolved image URLs are handed to the downloader
#[derive(Debug, Default)]
pub struct ImageFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl ImageFilter {
    /// Create a new image filter from configuration
    pub fn new(config: &ImageFilterConfig) -> Result<Self, regex::Error> {
        let mut include_regexes = Vec::with_capacity(config.include_patterns.len());
        for pattern in &config.include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if an image URL should be downloaded
    pub fn should_download(&self, url: &Url) -> bool {
        // Inline data: and blob: images have nothing to fetch
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|regex| regex.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty()
            || self.include_regexes.iter().any(|regex| regex.is_match(url_str))
    }
}
