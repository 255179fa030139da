use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use lazy_harvest::{Harvest, HarvestConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to harvest configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Override the scroll pause in milliseconds
    #[arg(short, long)]
    scroll_pause: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let config = HarvestConfig::from_file(&args.config)?;
    println!("Harvest configuration:");
    println!("  Start URL: {}", config.start_url);
    println!("  Folder: {}", config.folder.display());
    println!("  WebDriver URL: {}", config.webdriver_url);
    println!("  Scroll pause: {} ms", config.scroll_pause_ms);
    println!("  Headers: {}", config.headers.len());

    let mut harvest = Harvest::from_config(config);
    if let Some(pause) = args.scroll_pause {
        println!("Overriding scroll pause: {} ms", pause);
        harvest = harvest.with_scroll_pause(pause);
    }

    let start_time = std::time::Instant::now();
    let summary = harvest.run().await?;

    println!(
        "Harvest complete. {} unique images, {} saved, {} failed in {:.2} seconds.",
        summary.unique_urls.unwrap_or_default(),
        summary.downloads.succeeded(),
        summary.downloads.failed(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
