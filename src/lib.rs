#![allow(async_fn_in_trait)]

// Re-export modules
pub mod advance;
pub mod config;
pub mod crawlers;
pub mod download;
pub mod extract;
pub mod results;
pub mod session;
pub mod utils;

// Re-export commonly used types for convenience
pub use results::{CrawlEvent, CrawlSummary, DownloadedAsset, Termination};

use config::ImageCrawlConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Builder for a keyword image crawl.
///
/// Configures a single crawl and starts it, yielding progress events over a
/// channel while images are written to disk:
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use yield_image::Images;
///
/// let mut rx = Images::new("cats").with_target_count(20).generate().await?;
/// while let Some(event) = rx.recv().await {
///     println!("{:?}", event);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Images {
    config: ImageCrawlConfig,
    cancel: CancellationToken,
}

impl Images {
    /// Create a new Images builder for the given search keyword
    pub fn new(keyword: &str) -> Self {
        Self {
            config: ImageCrawlConfig::new(keyword),
            cancel: CancellationToken::new(),
        }
    }

    /// Set how many images to download before stopping
    pub fn with_target_count(mut self, count: u32) -> Self {
        self.config.target_count = count;
        self
    }

    /// Set the root directory images are saved under
    pub fn with_save_dir(mut self, dir: &str) -> Self {
        self.config.save_dir = dir.to_string();
        self
    }

    /// Run the browser without a visible window
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Use a caller-owned cancellation token; cancelling it stops the crawl
    /// at the next state transition while keeping partial results
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replace the full configuration (the builder keyword is discarded)
    pub fn with_config(mut self, config: ImageCrawlConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        self.config = ImageCrawlConfig::from_file(path)?;
        Ok(self)
    }

    /// Start the crawl and get a receiver for progress events
    pub async fn generate(
        mut self,
    ) -> Result<mpsc::Receiver<CrawlEvent>, Box<dyn std::error::Error>> {
        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.config.webdriver_url = webdriver_url;
            }
        }

        let receiver = crawlers::images::start(&self.config, self.cancel).await?;
        Ok(receiver)
    }
}
