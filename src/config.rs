use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a single harvesting run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// URL of the page to harvest images from
    pub start_url: String,

    /// Folder the images are written to (created if missing)
    #[serde(default = "default_folder")]
    pub folder: PathBuf,

    /// Pause after each scroll, in milliseconds
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,

    /// Maximum number of scroll iterations before giving up on stabilization
    #[serde(default = "default_max_scroll_iterations")]
    pub max_scroll_iterations: usize,

    /// Timeout for the initial page load, in seconds
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Fetch the page over plain HTTP instead of rendering it
    #[serde(default)]
    pub use_static: bool,

    /// Extra headers attached to every outbound request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Regex patterns for image URLs to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for image URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Default output folder
fn default_folder() -> PathBuf {
    PathBuf::from("images")
}

fn default_scroll_pause_ms() -> u64 {
    1000
}

fn default_max_scroll_iterations() -> usize {
    100
}

fn default_page_load_timeout_secs() -> u64 {
    60
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl HarvestConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            folder: default_folder(),
            scroll_pause_ms: default_scroll_pause_ms(),
            max_scroll_iterations: default_max_scroll_iterations(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            webdriver_url: default_webdriver_url(),
            use_static: false,
            headers: BTreeMap::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}
