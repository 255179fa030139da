use crate::error::{HarvestError, Result};
use crate::renderers::PageRenderer;
use crate::results::{PageSnapshot, ScrollOutcome};
use std::time::Duration;
use url::Url;

/// Scrolls a page to the bottom until its height stops growing
#[derive(Debug, Clone)]
pub struct ScrollStabilizer {
    pause: Duration,
    max_iterations: usize,
}

impl Default for ScrollStabilizer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), 100)
    }
}

impl ScrollStabilizer {
    /// `max_iterations` of 0 disables the ceiling
    pub fn new(pause: Duration, max_iterations: usize) -> Self {
        Self {
            pause,
            max_iterations,
        }
    }

    /// Drive the renderer until two consecutive height measurements are equal.
    ///
    /// Each iteration scrolls to the bottom and waits `pause` before measuring
    /// again. Hitting the iteration ceiling is reported as
    /// [`ScrollOutcome::GaveUp`] rather than an error; renderer failures are
    /// propagated.
    pub async fn stabilize<R: PageRenderer>(&self, renderer: &mut R) -> Result<ScrollOutcome> {
        let mut previous_height = None;
        let mut iterations = 0;

        loop {
            let height = renderer.current_height().await?;
            ::log::debug!("Iteration {}: current page height: {}", iterations, height);

            if previous_height == Some(height) {
                ::log::debug!("No change in page height detected. Reached the bottom.");
                return Ok(ScrollOutcome::Stabilized { iterations, height });
            }

            if self.max_iterations > 0 && iterations >= self.max_iterations {
                ::log::warn!(
                    "Page height still growing after {} scrolls (height {}), giving up",
                    iterations,
                    height
                );
                return Ok(ScrollOutcome::GaveUp { iterations, height });
            }

            previous_height = Some(height);
            renderer.scroll_to_bottom().await?;
            renderer.wait(self.pause).await?;
            iterations += 1;
        }
    }
}

/// Load `url`, scroll it until stable and capture the final HTML.
///
/// The renderer is closed whether or not the page could be captured.
pub async fn capture_page<R: PageRenderer>(
    mut renderer: R,
    url: &Url,
    stabilizer: &ScrollStabilizer,
) -> Result<(PageSnapshot, ScrollOutcome)> {
    let captured = async {
        renderer.load(url).await?;
        ::log::debug!("Page loaded. Starting full scroll to bottom...");
        let outcome = stabilizer.stabilize(&mut renderer).await?;
        let html = renderer.rendered_html().await?;
        ::log::debug!("Final HTML content obtained after full scroll.");
        Ok::<_, HarvestError>((PageSnapshot::new(url.clone(), html), outcome))
    }
    .await;

    if let Err(e) = renderer.close().await {
        ::log::warn!("Failed to close renderer for {}: {}", url, e);
    }

    captured
}
