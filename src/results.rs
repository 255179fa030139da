use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// The fully rendered HTML of a page together with the URL used to resolve its references
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    /// Base URL for relative image references
    pub base_url: Url,

    /// Rendered HTML captured after scrolling stabilized
    pub html: String,
}

impl PageSnapshot {
    pub fn new(base_url: Url, html: String) -> Self {
        Self { base_url, html }
    }
}

/// How the scroll loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollOutcome {
    /// Two consecutive height measurements were equal
    Stabilized { iterations: usize, height: u64 },

    /// The iteration ceiling was hit while the page was still growing
    GaveUp { iterations: usize, height: u64 },
}

impl ScrollOutcome {
    pub fn is_stable(&self) -> bool {
        matches!(self, ScrollOutcome::Stabilized { .. })
    }

    pub fn iterations(&self) -> usize {
        match self {
            ScrollOutcome::Stabilized { iterations, .. }
            | ScrollOutcome::GaveUp { iterations, .. } => *iterations,
        }
    }
}

/// Result of a single image download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadOutcome {
    Saved { bytes: u64 },
    Failed { reason: String },
}

/// Per-URL record produced by the downloader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Absolute URL of the image
    pub url: String,

    /// File the image was written to (None if the download failed)
    pub path: Option<PathBuf>,

    pub outcome: DownloadOutcome,
}

impl DownloadRecord {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DownloadOutcome::Saved { .. })
    }
}

/// Totals for a download batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadReport {
    pub records: Vec<DownloadRecord>,
}

impl DownloadReport {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }
}

/// Everything a harvesting run reports back to its caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestSummary {
    /// URL of the harvested page
    pub url: String,

    /// Number of `<img>` elements in the final HTML
    pub images_found: usize,

    /// Number of unique image URLs after resolution and filtering.
    /// None when the run only counted images, since nothing was resolved.
    pub unique_urls: Option<usize>,

    pub scroll: ScrollOutcome,

    /// Empty when the run only counted images
    pub downloads: DownloadReport,
}
