use crate::error::{HarvestError, Result};
use crate::renderers::PageRenderer;
use std::time::Duration;
use url::Url;

/// Fetches the page over plain HTTP without executing scripts.
///
/// The document never grows, so the scroll loop stabilizes on its second
/// measurement and only images present in the served HTML are found.
pub struct HttpRenderer {
    client: reqwest::Client,
    load_timeout: Duration,
    url: Option<Url>,
    html: Option<String>,
}

impl HttpRenderer {
    pub fn new(client: reqwest::Client, load_timeout: Duration) -> Self {
        Self {
            client,
            load_timeout,
            url: None,
            html: None,
        }
    }

    fn loaded_html(&self) -> Result<&str> {
        match (&self.url, &self.html) {
            (_, Some(html)) => Ok(html.as_str()),
            (Some(url), None) => Err(HarvestError::page_load(url.as_str(), "page has no content")),
            (None, None) => Err(HarvestError::page_load("<no page>", "no page loaded")),
        }
    }
}

impl PageRenderer for HttpRenderer {
    async fn load(&mut self, url: &Url) -> Result<()> {
        self.url = Some(url.clone());
        self.html = None;

        let response = self
            .client
            .get(url.clone())
            .timeout(self.load_timeout)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| HarvestError::page_load(url.as_str(), e))?;
        let html = response
            .text()
            .await
            .map_err(|e| HarvestError::page_load(url.as_str(), e))?;

        ::log::info!("Successfully loaded the page: {}", url);
        self.html = Some(html);
        Ok(())
    }

    async fn current_height(&mut self) -> Result<u64> {
        self.loaded_html()?;
        Ok(0)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        Ok(())
    }

    async fn wait(&mut self, _pause: Duration) -> Result<()> {
        Ok(())
    }

    async fn rendered_html(&mut self) -> Result<String> {
        self.loaded_html().map(str::to_string)
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}
