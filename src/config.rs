use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for one keyword image crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCrawlConfig {
    /// Keyword to search images for
    pub keyword: String,

    /// Number of images to download before stopping
    #[serde(default = "default_target_count")]
    pub target_count: u32,

    /// Root directory; images land in `{save_dir}/{keyword}/`
    #[serde(default = "default_save_dir")]
    pub save_dir: String,

    /// Whether to run the browser without a visible window
    #[serde(default)]
    pub headless: bool,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// User-Agent string applied to the browser session
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// How far the result offset advances between pages
    #[serde(default = "default_page_stride")]
    pub page_stride: u32,

    /// Consecutive pages without candidates before the crawl gives up
    #[serde(default = "default_empty_page_limit")]
    pub empty_page_limit: u32,

    /// Scroll/load-more attempts per result page
    #[serde(default = "default_scroll_attempts")]
    pub scroll_attempts: u32,

    /// Pause after each scroll or load-more activation, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Upper bound on waiting for the first image element after navigation
    #[serde(default = "default_page_ready_timeout_secs")]
    pub page_ready_timeout_secs: u64,

    /// Per-download HTTP timeout in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Pause between download attempts, in milliseconds
    #[serde(default = "default_download_delay_ms")]
    pub download_delay_ms: u64,
}

impl ImageCrawlConfig {
    /// Create a new configuration with default values
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            target_count: default_target_count(),
            save_dir: default_save_dir(),
            headless: false,
            webdriver_url: default_webdriver_url(),
            user_agent: default_user_agent(),
            page_stride: default_page_stride(),
            empty_page_limit: default_empty_page_limit(),
            scroll_attempts: default_scroll_attempts(),
            settle_ms: default_settle_ms(),
            page_ready_timeout_secs: default_page_ready_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            download_delay_ms: default_download_delay_ms(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

/// Default value for target_count
fn default_target_count() -> u32 {
    50
}

/// Default value for save_dir
fn default_save_dir() -> String {
    "downloads".to_string()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default value for user_agent
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

/// Default value for page_stride
fn default_page_stride() -> u32 {
    30
}

/// Default value for empty_page_limit
fn default_empty_page_limit() -> u32 {
    3
}

/// Default value for scroll_attempts
fn default_scroll_attempts() -> u32 {
    5
}

/// Default value for settle_ms
fn default_settle_ms() -> u64 {
    500
}

/// Default value for page_ready_timeout_secs
fn default_page_ready_timeout_secs() -> u64 {
    4
}

/// Default value for download_timeout_secs
fn default_download_timeout_secs() -> u64 {
    10
}

/// Default value for download_delay_ms
fn default_download_delay_ms() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImageCrawlConfig::new("cats");
        assert_eq!(config.keyword, "cats");
        assert_eq!(config.target_count, 50);
        assert_eq!(config.page_stride, 30);
        assert_eq!(config.empty_page_limit, 3);
        assert_eq!(config.scroll_attempts, 5);
        assert_eq!(config.download_timeout_secs, 10);
        assert!(!config.headless);
    }

    #[test]
    fn test_sparse_json_fills_defaults() {
        let config: ImageCrawlConfig =
            serde_json::from_str(r#"{"keyword": "dogs", "target_count": 10}"#).unwrap();
        assert_eq!(config.keyword, "dogs");
        assert_eq!(config.target_count, 10);
        assert_eq!(config.page_stride, 30);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
    }
}
