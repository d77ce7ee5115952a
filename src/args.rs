use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "yield-image")]
#[command(author = "Ryan Northey <ryan@synca.io>")]
#[command(about = "Crawler that downloads images matching search keywords")]
#[command(version)]
pub struct Args {
    /// Search keywords; each keyword runs as its own crawl
    #[arg(required = true)]
    pub keywords: Vec<String>,

    /// Number of images to download per keyword
    #[arg(short = 'n', long, default_value_t = 50)]
    pub count: u32,

    /// Directory where per-keyword subdirectories are created
    #[arg(short, long, default_value = "downloads")]
    pub save_dir: String,

    /// Run the browser without a visible window
    #[arg(long)]
    pub headless: bool,
}
