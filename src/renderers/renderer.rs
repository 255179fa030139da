use crate::error::Result;
use std::time::Duration;
use url::Url;

/// A browser-like environment that can load a page, scroll it and hand back the live HTML.
///
/// Each renderer owns a single page session. Any backend that provides these
/// operations can drive the scroll loop, so tests substitute scripted pages.
#[allow(async_fn_in_trait)]
pub trait PageRenderer {
    /// Navigate to the URL and wait for the initial load
    async fn load(&mut self, url: &Url) -> Result<()>;

    /// Current full document height
    async fn current_height(&mut self) -> Result<u64>;

    /// Scroll to the current maximum vertical extent
    async fn scroll_to_bottom(&mut self) -> Result<()>;

    /// Give asynchronous content time to arrive
    async fn wait(&mut self, pause: Duration) -> Result<()> {
        tokio::time::sleep(pause).await;
        Ok(())
    }

    /// Serialized HTML of the live DOM
    async fn rendered_html(&mut self) -> Result<String>;

    /// End the session
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}
