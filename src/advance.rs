use crate::session::PageDriver;
use std::time::Duration;

/// "Load more" triggers probed in order; the first match is activated
const LOAD_MORE_SELECTORS: [&str; 4] = ["a.api_more_btn", "button.more_btn", ".btn_more", "a.moreBtn"];

/// Script that scrolls the page to its full height
const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Reveal more results on the current page without navigating away.
///
/// Each attempt scrolls to the bottom, then probes the load-more selectors
/// and clicks the first one that matches. A short settle pause follows each
/// scroll and each activation so asynchronously loaded content can appear.
/// Driver faults here never abort the procedure; an attempt that finds no
/// trigger simply revealed whatever the scroll alone loaded.
pub async fn reveal_more<D: PageDriver>(driver: &D, attempts: u32, settle: Duration) {
    for _ in 0..attempts {
        if let Err(e) = driver.execute(SCROLL_TO_BOTTOM).await {
            ::log::debug!("Scroll failed: {}", e);
        }
        tokio::time::sleep(settle).await;

        for selector in LOAD_MORE_SELECTORS {
            match driver.click_first(selector).await {
                Ok(true) => {
                    ::log::debug!("Activated load-more trigger: {}", selector);
                    tokio::time::sleep(settle).await;
                    break;
                }
                Ok(false) => continue,
                Err(e) => {
                    ::log::debug!("Probing {} failed: {}", selector, e);
                    continue;
                }
            }
        }

        tokio::time::sleep(settle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDriver {
        scrolls: Mutex<u32>,
        probes: Mutex<Vec<String>>,
        clicks: Mutex<u32>,
        /// Selector that should report a matching element
        present: Option<&'static str>,
        /// Fail every command when set
        broken: bool,
    }

    impl PageDriver for RecordingDriver {
        async fn navigate(&self, _url: &str) -> Result<(), SessionError> {
            Ok(())
        }

        async fn execute(&self, _script: &str) -> Result<(), SessionError> {
            if self.broken {
                return Err(SessionError::Command("boom".to_string()));
            }
            *self.scrolls.lock().unwrap() += 1;
            Ok(())
        }

        async fn click_first(&self, selector: &str) -> Result<bool, SessionError> {
            if self.broken {
                return Err(SessionError::Command("boom".to_string()));
            }
            self.probes.lock().unwrap().push(selector.to_string());
            if self.present == Some(selector) {
                *self.clicks.lock().unwrap() += 1;
                return Ok(true);
            }
            Ok(false)
        }

        async fn wait_for(
            &self,
            _selector: &str,
            _timeout: Duration,
        ) -> Result<bool, SessionError> {
            Ok(true)
        }

        async fn source(&self) -> Result<String, SessionError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_scrolls_bounded_number_of_times() {
        let driver = RecordingDriver::default();
        reveal_more(&driver, 5, Duration::ZERO).await;
        assert_eq!(*driver.scrolls.lock().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_probing_stops_at_first_matching_trigger() {
        let driver = RecordingDriver {
            present: Some("button.more_btn"),
            ..Default::default()
        };
        reveal_more(&driver, 1, Duration::ZERO).await;

        let probes = driver.probes.lock().unwrap();
        assert_eq!(*probes, vec!["a.api_more_btn", "button.more_btn"]);
        assert_eq!(*driver.clicks.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_trigger_probes_every_selector() {
        let driver = RecordingDriver::default();
        reveal_more(&driver, 1, Duration::ZERO).await;
        assert_eq!(driver.probes.lock().unwrap().len(), LOAD_MORE_SELECTORS.len());
        assert_eq!(*driver.clicks.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_driver_faults_are_tolerated() {
        let driver = RecordingDriver {
            broken: true,
            ..Default::default()
        };
        // Must complete without propagating any error
        reveal_more(&driver, 3, Duration::ZERO).await;
    }
}
