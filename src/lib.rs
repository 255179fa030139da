pub mod config;
pub mod download;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod renderers;
pub mod results;
pub mod scroll;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use error::{HarvestError, Result};
pub use results::{DownloadOutcome, DownloadRecord, HarvestSummary, PageSnapshot, ScrollOutcome};

use download::{Downloader, HttpFetcher, ImageFetcher};
use filter::{ImageFilter, ImageFilterConfig};
use parsers::ImageResolver;
use renderers::{HttpRenderer, PageRenderer, WebDriverRenderer};
use scroll::ScrollStabilizer;
use std::path::PathBuf;
use url::Url;

/// Builder for a single image harvesting run
pub struct Harvest {
    config: HarvestConfig,
    count_only: bool,
}

impl Harvest {
    /// Create a new Harvest builder for the given page URL
    pub fn new(url: &str) -> Self {
        Self::from_config(HarvestConfig::new(url))
    }

    /// Create a builder from a complete configuration
    pub fn from_config(config: HarvestConfig) -> Self {
        Self {
            config,
            count_only: false,
        }
    }

    /// Load configuration from a JSON file, keeping this builder's URL
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = HarvestConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string, keeping this builder's URL
    pub fn with_config_str(self, json: &str) -> Result<Self> {
        let config = HarvestConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    fn with_config(mut self, config: HarvestConfig) -> Self {
        let start_url = std::mem::take(&mut self.config.start_url);
        self.config = HarvestConfig {
            start_url,
            ..config
        };
        self
    }

    /// Set the folder images are written to
    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.folder = folder.into();
        self
    }

    /// Set the pause after each scroll
    pub fn with_scroll_pause(mut self, millis: u64) -> Self {
        self.config.scroll_pause_ms = millis;
        self
    }

    /// Set the scroll iteration ceiling (0 disables it)
    pub fn with_max_scroll_iterations(mut self, iterations: usize) -> Self {
        self.config.max_scroll_iterations = iterations;
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: &str) -> Self {
        self.config.webdriver_url = webdriver_url.to_string();
        self
    }

    /// Fetch the page over plain HTTP instead of a WebDriver session
    pub fn with_static(mut self, use_static: bool) -> Self {
        self.config.use_static = use_static;
        self
    }

    /// Attach a header to every outbound HTTP request
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.config
            .headers
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_include_pattern(mut self, pattern: &str) -> Self {
        self.config.include_patterns.push(pattern.to_string());
        self
    }

    pub fn with_exclude_pattern(mut self, pattern: &str) -> Self {
        self.config.exclude_patterns.push(pattern.to_string());
        self
    }

    /// Only count images, do not download them
    pub fn count_only(mut self, count_only: bool) -> Self {
        self.count_only = count_only;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Render the page with the configured backend and harvest its images
    pub async fn run(self) -> Result<HarvestSummary> {
        let client =
            utils::build_http_client(&self.config.headers, self.config.page_load_timeout())?;
        let fetcher = HttpFetcher::new(client.clone());

        if self.config.use_static {
            let renderer = HttpRenderer::new(client, self.config.page_load_timeout());
            self.run_with(renderer, fetcher).await
        } else {
            let renderer = WebDriverRenderer::connect(
                &self.config.webdriver_url,
                self.config.page_load_timeout(),
            )
            .await?;
            self.run_with(renderer, fetcher).await
        }
    }

    /// Harvest images using the given renderer and fetcher
    pub async fn run_with<R, F>(self, renderer: R, fetcher: F) -> Result<HarvestSummary>
    where
        R: PageRenderer,
        F: ImageFetcher,
    {
        let config = &self.config;
        let url = Url::parse(&config.start_url)?;
        let filter = ImageFilter::new(&ImageFilterConfig {
            include_patterns: config.include_patterns.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        })?;
        let stabilizer =
            ScrollStabilizer::new(config.scroll_pause(), config.max_scroll_iterations);

        ::log::info!("Loading page: {}", url);
        let (snapshot, scroll) = scroll::capture_page(renderer, &url, &stabilizer).await?;
        ::log::info!(
            "Scrolling finished after {} iterations ({})",
            scroll.iterations(),
            if scroll.is_stable() { "stable" } else { "gave up" }
        );

        if self.count_only {
            let images_found = parsers::count_image_elements(&snapshot.html);
            ::log::info!("Found {} <img> tags", images_found);
            return Ok(HarvestSummary {
                url: url.to_string(),
                images_found,
                unique_urls: None,
                scroll,
                downloads: Default::default(),
            });
        }

        let images = ImageResolver::new(filter).resolve(&snapshot);
        ::log::info!(
            "Found {} <img> tags, {} unique image URLs",
            images.images_found,
            images.urls.len()
        );

        let downloads = Downloader::new(fetcher, &config.folder)
            .download_all(&images.urls)
            .await?;

        Ok(HarvestSummary {
            url: url.to_string(),
            images_found: images.images_found,
            unique_urls: Some(images.urls.len()),
            scroll,
            downloads,
        })
    }
}
