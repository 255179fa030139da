/// Density every image has when no descriptor says otherwise
pub const BASELINE_DENSITY: f64 = 1.0;

/// One `url density` pair from a `srcset` attribute
#[derive(Debug, Clone, PartialEq)]
pub struct SrcsetEntry {
    pub url: String,
    pub density: f64,
}

/// Parses a pixel density descriptor such as `2x` or `1.5x`.
///
/// Returns None for width descriptors (`300w`), missing units and anything
/// that is not a finite positive number.
pub fn parse_density(descriptor: &str) -> Option<f64> {
    let value = descriptor.strip_suffix('x')?.parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Parses a `srcset` attribute into its density candidates.
///
/// A candidate URL runs up to the next whitespace, so commas inside it (CDN
/// transforms like `w_400,h_300`) stay part of the URL; its descriptor runs up
/// to the next comma. Only candidates written as exactly `url descriptor` are
/// kept; malformed ones are skipped so the rest of the list still counts.
pub fn parse_srcset(srcset: &str) -> Vec<SrcsetEntry> {
    let mut entries = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (url, after_url) = rest.split_at(url_end);

        // `b.jpg, c.jpg 2x`: the comma closes a candidate with no descriptor
        if url.ends_with(',') || after_url.trim_start().is_empty() {
            ::log::debug!(
                "Skipping srcset candidate without descriptor: {}",
                url.trim_end_matches(',')
            );
            rest = after_url;
            continue;
        }

        let descriptor_end = after_url.find(',').unwrap_or(after_url.len());
        let (descriptor, after_descriptor) = after_url.split_at(descriptor_end);
        rest = after_descriptor;
        let descriptor = descriptor.trim();

        let density = if descriptor.contains(char::is_whitespace) {
            None
        } else {
            parse_density(descriptor)
        };
        match density {
            Some(density) => entries.push(SrcsetEntry {
                url: url.to_string(),
                density,
            }),
            None => {
                ::log::debug!("Skipping srcset candidate with bad density: {} {}", url, descriptor);
            }
        }
    }

    entries
}

/// Picks the candidate with the strictly greatest density above the baseline.
///
/// Earlier candidates win ties. None means the plain `src` should be used.
pub fn best_candidate(entries: &[SrcsetEntry]) -> Option<&SrcsetEntry> {
    let mut best: Option<&SrcsetEntry> = None;
    let mut best_density = BASELINE_DENSITY;

    for entry in entries {
        if entry.density > best_density {
            best = Some(entry);
            best_density = entry.density;
        }
    }

    best
}
