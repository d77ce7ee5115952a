use clap::Parser;
use tokio_util::sync::CancellationToken;
use yield_image::Images;
use yield_image::results::CrawlEvent;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    ::log::info!(
        "Starting image crawl for {} keyword(s)",
        args.keywords.len()
    );

    println!("Note: Crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
    );

    // One token for the whole batch; Ctrl-C stops the active crawl and
    // skips the remaining keywords, keeping whatever was downloaded
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ::log::warn!("Interrupt received, stopping after the work in flight");
            signal_cancel.cancel();
        }
    });

    let start_time = std::time::Instant::now();

    // Keywords crawl strictly one after another, each with its own session
    for keyword in &args.keywords {
        if cancel.is_cancelled() {
            break;
        }

        let images = Images::new(keyword)
            .with_target_count(args.count)
            .with_save_dir(&args.save_dir)
            .with_headless(args.headless)
            .with_cancel_token(cancel.clone());

        let mut rx = match images.generate().await {
            Ok(rx) => rx,
            Err(e) => {
                ::log::error!("Failed to start crawl for '{}': {}", keyword, e);
                continue;
            }
        };

        // Process events as they come in
        while let Some(event) = rx.recv().await {
            report_event(keyword, &event);
        }
    }

    let duration = start_time.elapsed();
    ::log::info!(
        "All crawls complete in {:.2} seconds",
        duration.as_secs_f64()
    );
}

/// Print one progress event for the user
fn report_event(keyword: &str, event: &CrawlEvent) {
    match event {
        CrawlEvent::PageLoaded { offset } => {
            ::log::info!("'{}': loaded result page at offset {}", keyword, offset);
        }
        CrawlEvent::UrlsExtracted { count } => {
            ::log::info!("'{}': extracted {} candidate URLs", keyword, count);
        }
        CrawlEvent::Downloaded {
            filename,
            index,
            total,
        } => {
            println!("[{}/{}] {}", index, total, filename);
        }
        CrawlEvent::PageFailed { offset } => {
            ::log::warn!("'{}': page at offset {} yielded nothing", keyword, offset);
        }
        CrawlEvent::Done {
            downloaded,
            save_path,
        } => {
            println!(
                "'{}': downloaded {} images to {}",
                keyword,
                downloaded,
                save_path.display()
            );
        }
    }
}
