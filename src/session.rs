use crate::config::ImageCrawlConfig;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a browser session
#[derive(Debug, Error)]
pub enum SessionError {
    /// No WebDriver server answered on any candidate endpoint
    #[error("could not reach a WebDriver server (last tried {url})")]
    Connect { url: String },

    /// The remote session disappeared; the crawl cannot continue on it
    #[error("webdriver session lost: {0}")]
    SessionLost(String),

    /// A single command failed without invalidating the session
    #[error("webdriver command failed: {0}")]
    Command(String),
}

/// The browser capability a crawl drives.
///
/// The crawl loop only ever talks to the page through this trait, so tests
/// can substitute a scripted driver for a live WebDriver session.
pub trait PageDriver {
    /// Navigate the session to a URL
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Run a script in the page, discarding its result
    async fn execute(&self, script: &str) -> Result<(), SessionError>;

    /// Click the first element matching the selector.
    ///
    /// Returns `Ok(false)` when nothing matches; that is not an error.
    async fn click_first(&self, selector: &str) -> Result<bool, SessionError>;

    /// Wait until the selector matches at least one element.
    ///
    /// Returns `Ok(false)` if the timeout elapsed first.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, SessionError>;

    /// Current rendered DOM as an HTML string
    async fn source(&self) -> Result<String, SessionError>;
}

/// A live WebDriver session
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Connect to a WebDriver server and open a configured browser session.
    ///
    /// Tries the configured endpoint first, then a list of common
    /// alternatives, the same way a locally started driver usually ends up
    /// on one of a handful of well-known ports.
    pub async fn connect(config: &ImageCrawlConfig) -> Result<Self, SessionError> {
        let caps = build_capabilities(config);

        match connect_once(&config.webdriver_url, &caps).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    config.webdriver_url,
                    e
                );
            }
        }

        let fallback_urls = [
            "http://localhost:9515", // ChromeDriver default
            "http://localhost:4723", // Appium default
            "http://localhost:9222", // Chrome debug port default
            "http://127.0.0.1:4444", // Try with IP instead of localhost
        ];

        for url in fallback_urls.iter() {
            if *url == config.webdriver_url {
                continue; // Skip if it's the same as the one we already tried
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = connect_once(url, &caps).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(SessionError::Connect {
            url: config.webdriver_url.clone(),
        })
    }

    /// Release the browser session
    pub async fn close(self) -> Result<(), SessionError> {
        self.client.close().await.map_err(classify)
    }
}

impl PageDriver for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.client.goto(url).await.map_err(classify)
    }

    async fn execute(&self, script: &str) -> Result<(), SessionError> {
        self.client
            .execute(script, vec![])
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn click_first(&self, selector: &str) -> Result<bool, SessionError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(classify)?;

        match elements.into_iter().next() {
            Some(element) => {
                element.click().await.map_err(classify)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, SessionError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(true),
            Err(CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(classify(e)),
        }
    }

    async fn source(&self) -> Result<String, SessionError> {
        self.client.source().await.map_err(classify)
    }
}

/// Build the chrome options the session is opened with
fn build_capabilities(config: &ImageCrawlConfig) -> serde_json::Map<String, serde_json::Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        format!("user-agent={}", config.user_agent),
    ];

    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = serde_json::Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        serde_json::json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
        }),
    );
    caps
}

async fn connect_once(
    url: &str,
    caps: &serde_json::Map<String, serde_json::Value>,
) -> Result<Client, fantoccini::error::NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(caps.clone());
    builder.connect(url).await
}

/// Sort a command error into session-fatal vs per-command failure
fn classify(error: CmdError) -> SessionError {
    let message = error.to_string();
    if message.contains("Unable to find session") {
        SessionError::SessionLost(message)
    } else {
        SessionError::Command(message)
    }
}
