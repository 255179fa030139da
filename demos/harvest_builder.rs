use clap::Parser;
use std::error::Error;
use lazy_harvest::Harvest;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the page to harvest
    #[arg(short, long)]
    url: String,

    /// JSON configuration string
    #[arg(short, long)]
    config: Option<String>,

    /// Folder to save images in
    #[arg(short, long, default_value = "images")]
    folder: String,

    /// Fetch the page without a WebDriver server
    #[arg(long = "static")]
    static_page: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    println!("Harvesting images from: {}", args.url);

    let mut harvest = Harvest::new(&args.url);

    // Apply configuration from string if specified
    if let Some(config_str) = args.config {
        println!("Applying configuration from string");
        harvest = harvest.with_config_str(&config_str)?;
    }

    let summary = harvest
        .with_folder(&args.folder)
        .with_static(args.static_page)
        .with_header("User-Agent", "lazy-harvest-demo/0.1")
        .run()
        .await?;

    for record in &summary.downloads.records {
        match &record.path {
            Some(path) if record.is_success() => println!("{} -> {}", record.url, path.display()),
            _ => println!("{} failed: {:?}", record.url, record.outcome),
        }
    }

    println!(
        "Done. {} images on the page, {} downloaded.",
        summary.images_found,
        summary.downloads.succeeded()
    );

    Ok(())
}
