use crate::parsers::srcset::{self, SrcsetEntry};
use scraper::{Html, Selector};

/// The image references declared by one `<img>` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageCandidate {
    /// Density candidates parsed from `srcset`
    pub srcset: Vec<SrcsetEntry>,

    /// Plain `src` attribute, if present and not blank
    pub src: Option<String>,
}

impl ImageCandidate {
    /// The single reference this element contributes, before resolution
    pub fn chosen_reference(&self) -> Option<&str> {
        if let Some(best) = srcset::best_candidate(&self.srcset) {
            ::log::debug!(
                "Using srcset candidate: {} with multiplier {}",
                best.url,
                best.density
            );
            return Some(best.url.as_str());
        }

        match &self.src {
            Some(src) => {
                if self.srcset.is_empty() {
                    ::log::debug!("Using src: {}", src);
                } else {
                    ::log::debug!("No srcset candidate above 1x; using src: {}", src);
                }
                Some(src.as_str())
            }
            None => {
                ::log::debug!("<img> tag without usable src; skipping");
                None
            }
        }
    }
}

/// Result of scanning a document for images
#[derive(Debug, Clone, Default)]
pub struct ImageParseResult {
    /// `href` of the document's `<base>` element
    pub base_href: Option<String>,

    /// One entry per `<img>` element, in document order
    pub candidates: Vec<ImageCandidate>,
}

/// Parses HTML content to extract every `<img>` element
pub fn parse(html: &str) -> ImageParseResult {
    let doc = Html::parse_document(html);

    let base_selector = Selector::parse("base[href]").unwrap();
    let base_href = doc
        .select(&base_selector)
        .filter_map(|e| e.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string);

    let img_selector = Selector::parse("img").unwrap();
    let candidates = doc
        .select(&img_selector)
        .map(|e| {
            let element = e.value();
            ImageCandidate {
                srcset: element
                    .attr("srcset")
                    .map(srcset::parse_srcset)
                    .unwrap_or_default(),
                src: element
                    .attr("src")
                    .map(str::trim)
                    .filter(|src| !src.is_empty())
                    .map(str::to_string),
            }
        })
        .collect::<Vec<_>>();

    ::log::debug!("Found {} <img> tags in the HTML", candidates.len());

    ImageParseResult {
        base_href,
        candidates,
    }
}

/// Counts `<img>` elements without building candidates
pub fn count_image_elements(html: &str) -> usize {
    let doc = Html::parse_document(html);
    let img_selector = Selector::parse("img").unwrap();
    doc.select(&img_selector).count()
}
