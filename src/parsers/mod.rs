pub mod html;
pub mod srcset;


use crate::filter::ImageFilter;
use crate::results::PageSnapshot;
use std::collections::HashSet;
use url::Url;

pub use html::{ImageCandidate, count_image_elements};
pub use srcset::SrcsetEntry;

/// Unique image URLs found in a page snapshot
#[derive(Debug, Clone, Default)]
pub struct ResolvedImages {
    /// Number of `<img>` elements in the document
    pub images_found: usize,

    /// Absolute URLs in first-discovery order, each appearing once
    pub urls: Vec<Url>,
}

/// Turns a rendered page into the ordered set of image URLs to download
#[derive(Debug, Default)]
pub struct ImageResolver {
    filter: ImageFilter,
}

impl ImageResolver {
    pub fn new(filter: ImageFilter) -> Self {
        Self { filter }
    }

    /// Resolve one URL per `<img>` element and drop duplicates.
    ///
    /// Relative references resolve against the document's `<base href>` when
    /// present, otherwise against the snapshot's base URL.
    pub fn resolve(&self, snapshot: &PageSnapshot) -> ResolvedImages {
        let parsed = html::parse(&snapshot.html);

        let base_url = parsed
            .base_href
            .as_deref()
            .and_then(|href| resolve_reference(&snapshot.base_url, href))
            .unwrap_or_else(|| snapshot.base_url.clone());

        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for candidate in &parsed.candidates {
            let Some(reference) = candidate.chosen_reference() else {
                continue;
            };
            let Some(url) = resolve_reference(&base_url, reference) else {
                ::log::debug!("Could not resolve image reference: {}", reference);
                continue;
            };
            if !self.filter.should_download(&url) {
                ::log::debug!("Image filter rejected: {}", url);
                continue;
            }
            if seen.insert(url.as_str().to_string()) {
                urls.push(url);
            }
        }

        ::log::debug!("Total unique image URLs extracted: {}", urls.len());

        ResolvedImages {
            images_found: parsed.candidates.len(),
            urls,
        }
    }
}

/// Resolve a possibly relative reference against a base URL
pub fn resolve_reference(base_url: &Url, reference: &str) -> Option<Url> {
    base_url.join(reference.trim()).ok()
}
