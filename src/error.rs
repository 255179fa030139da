use thiserror::Error;

/// Errors raised while harvesting images from a page
#[derive(Debug, Error)]
pub enum HarvestError {
    /// No WebDriver server could be reached
    #[error("failed to connect to any WebDriver server (tried {0})")]
    WebDriverConnect(String),

    /// The page could not be loaded, scrolled or read back
    #[error("failed to load {url}: {reason}")]
    PageLoad { url: String, reason: String },

    /// A single image could not be fetched or written
    #[error("failed to download {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid request header: {0}")]
    InvalidHeader(String),

    #[error("invalid url pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HarvestError {
    /// Builds a page load failure for the given URL
    pub fn page_load(url: &str, reason: impl ToString) -> Self {
        HarvestError::PageLoad {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Builds an image fetch failure for the given URL
    pub fn image_fetch(url: &str, reason: impl ToString) -> Self {
        HarvestError::ImageFetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
