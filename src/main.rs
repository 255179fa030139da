use clap::Parser;
use lazy_harvest::HarvestSummary;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging; RUST_LOG still takes precedence
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let harvest = match args.into_harvest() {
        Ok(harvest) => harvest,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let config = harvest.config();
    ::log::info!("Starting image harvest for: {}", config.start_url);
    if !config.use_static {
        println!("Note: Rendering requires a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL or --webdriver-url if not using the default {}",
            config.webdriver_url
        );
    }

    let start_time = std::time::Instant::now();
    match harvest.run().await {
        Ok(summary) => {
            print_summary(&summary);
            ::log::info!(
                "Harvest complete in {:.2} seconds",
                start_time.elapsed().as_secs_f64()
            );
        }
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_summary(summary: &HarvestSummary) {
    println!("Total images found on the page: {}", summary.images_found);
    if let Some(unique) = summary.unique_urls {
        println!("Unique image URLs: {}", unique);
    }

    if !summary.scroll.is_stable() {
        println!(
            "Warning: page was still growing after {} scrolls",
            summary.scroll.iterations()
        );
    }

    if !summary.downloads.records.is_empty() {
        println!(
            "Downloaded {} of {} images ({} failed)",
            summary.downloads.succeeded(),
            summary.downloads.records.len(),
            summary.downloads.failed()
        );
    }
}
