use crate::error::{HarvestError, Result};
use crate::renderers::PageRenderer;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

const HEIGHT_SCRIPT: &str = "return document.body.scrollHeight;";
const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Renders pages through a WebDriver server (ChromeDriver, geckodriver, ...)
pub struct WebDriverRenderer {
    client: Client,
    load_timeout: Duration,
    current_url: Option<String>,
}

impl WebDriverRenderer {
    /// Open a session on the WebDriver server, trying common local ports if the given URL fails
    pub async fn connect(webdriver_url: &str, load_timeout: Duration) -> Result<Self> {
        let client = connect_to_webdriver(webdriver_url).await?;
        Ok(Self {
            client,
            load_timeout,
            current_url: None,
        })
    }

    fn page_url(&self) -> &str {
        self.current_url.as_deref().unwrap_or("<no page>")
    }

    async fn execute(&self, script: &str) -> Result<serde_json::Value> {
        self.client
            .execute(script, Vec::new())
            .await
            .map_err(|e| HarvestError::page_load(self.page_url(), e))
    }
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // geckodriver / Selenium default
        "http://127.0.0.1:4444",
    ];

    for url in fallback_urls.iter().filter(|url| **url != webdriver_url) {
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(HarvestError::WebDriverConnect(webdriver_url.to_string()))
}

impl PageRenderer for WebDriverRenderer {
    async fn load(&mut self, url: &Url) -> Result<()> {
        self.current_url = Some(url.to_string());
        ::log::debug!("Loading page: {}", url);

        match timeout(self.load_timeout, self.client.goto(url.as_str())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HarvestError::page_load(url.as_str(), e)),
            Err(_) => Err(HarvestError::page_load(
                url.as_str(),
                format!("timed out after {:?}", self.load_timeout),
            )),
        }
    }

    async fn current_height(&mut self) -> Result<u64> {
        let value = self.execute(HEIGHT_SCRIPT).await?;
        value
            .as_u64()
            .or_else(|| value.as_f64().map(|height| height.max(0.0) as u64))
            .ok_or_else(|| {
                HarvestError::page_load(
                    self.page_url(),
                    format!("unexpected document height {}", value),
                )
            })
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.execute(SCROLL_SCRIPT).await?;
        Ok(())
    }

    async fn rendered_html(&mut self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| HarvestError::page_load(self.page_url(), e))
    }

    async fn close(self) -> Result<()> {
        let page_url = self.page_url().to_string();
        self.client
            .close()
            .await
            .map_err(|e| HarvestError::page_load(&page_url, e))
    }
}
