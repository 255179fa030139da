use clap::Parser;
use lazy_harvest::{Harvest, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lazy-harvest")]
#[command(about = "Download every image from a page, scrolling it first so lazy-loaded images appear")]
#[command(version)]
pub struct Args {
    /// URL of the page to download images from
    pub url: String,

    /// Folder to save the images in [default: images]
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// Pause after each scroll in milliseconds [default: 1000]
    #[arg(long)]
    pub scroll_pause: Option<u64>,

    /// Give up scrolling after this many iterations, 0 for no limit [default: 100]
    #[arg(long)]
    pub max_scrolls: Option<usize>,

    /// WebDriver server to render the page with (falls back to WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Fetch the page over plain HTTP without running its scripts
    #[arg(long = "static")]
    pub static_page: bool,

    /// Only report how many images the page has
    #[arg(long)]
    pub count_only: bool,

    /// Extra request header, e.g. "User-Agent: harvester/1.0" (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Only download image URLs matching this regex (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Skip image URLs matching this regex (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debugging output
    #[arg(long)]
    pub debug: bool,
}

/// Parse a `Name: value` header argument
fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got \"{}\"", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in \"{}\"", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl Args {
    /// Default log filter: this crate at info (debug with `--debug`), dependencies at warn
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "warn,lazy_harvest=debug"
        } else {
            "warn,lazy_harvest=info"
        }
    }

    /// Build the harvest from the config file (if any) with command-line overrides on top
    pub fn into_harvest(self) -> Result<Harvest> {
        let mut harvest = Harvest::new(&self.url);

        if let Some(config_file) = &self.config {
            ::log::info!("Loading configuration from file: {}", config_file.display());
            harvest = harvest.with_config_file(config_file)?;
        }

        if let Some(folder) = self.folder {
            harvest = harvest.with_folder(folder);
        }
        if let Some(pause) = self.scroll_pause {
            harvest = harvest.with_scroll_pause(pause);
        }
        if let Some(max_scrolls) = self.max_scrolls {
            harvest = harvest.with_max_scroll_iterations(max_scrolls);
        }

        let webdriver_url = self.webdriver_url.or_else(|| {
            std::env::var("WEBDRIVER_URL")
                .ok()
                .filter(|url| !url.is_empty())
        });
        if let Some(webdriver_url) = webdriver_url {
            harvest = harvest.with_webdriver_url(&webdriver_url);
        }

        if self.static_page {
            harvest = harvest.with_static(true);
        }
        for (name, value) in &self.headers {
            harvest = harvest.with_header(name, value);
        }
        for pattern in &self.include {
            harvest = harvest.with_include_pattern(pattern);
        }
        for pattern in &self.exclude {
            harvest = harvest.with_exclude_pattern(pattern);
        }

        Ok(harvest.count_only(self.count_only))
    }
}
