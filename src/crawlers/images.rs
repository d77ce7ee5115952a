use crate::advance;
use crate::config::ImageCrawlConfig;
use crate::download::{DownloadError, Downloader, Fetcher, file_extension};
use crate::extract::UrlExtractor;
use crate::results::{CrawlEvent, CrawlSummary, DownloadedAsset, Termination};
use crate::session::{PageDriver, SessionError, WebDriverSession};
use crate::utils::sanitize_keyword;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Search endpoint the page offsets are appended to
const SEARCH_ENDPOINT: &str = "https://search.naver.com/search.naver";

/// Errors that prevent a crawl from starting.
///
/// Once the loop is past its starting state, faults no longer surface here;
/// they end the crawl with a [`CrawlSummary`] carrying the partial results.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("search keyword must not be empty")]
    EmptyKeyword,

    #[error("target image count must be greater than zero")]
    ZeroTarget,

    #[error("failed to create save directory {path}: {source}")]
    SaveDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Crawl progress state, owned exclusively by the loop.
///
/// `offset` and `downloaded` only ever advance; `empty_pages` resets on any
/// page that yields at least one candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageCursor {
    pub offset: u32,
    pub downloaded: u32,
    pub empty_pages: u32,
}

/// Build the search URL for a keyword at a result offset
pub fn search_url(keyword: &str, offset: u32) -> String {
    let start = offset.to_string();
    Url::parse_with_params(
        SEARCH_ENDPOINT,
        &[
            ("where", "image"),
            ("sm", "tab_jum"),
            ("query", keyword),
            ("start", start.as_str()),
        ],
    )
    .expect("Invalid search endpoint")
    .to_string()
}

/// Open a session and start an image crawl, returning a receiver that
/// yields progress events as the crawl runs.
///
/// The loop itself runs on a spawned task; the session is released when it
/// finishes. Cancelling the token stops the crawl at the next state
/// transition while keeping everything downloaded so far.
pub async fn start(
    config: &ImageCrawlConfig,
    cancel: CancellationToken,
) -> Result<mpsc::Receiver<CrawlEvent>, CrawlError> {
    validate(config)?;

    let session = WebDriverSession::connect(config).await?;
    let downloader = Downloader::new(Duration::from_secs(config.download_timeout_secs))?;
    let (event_tx, event_rx) = mpsc::channel::<CrawlEvent>(100);
    let config = config.clone();

    tokio::spawn(async move {
        match run(&config, &session, &downloader, &cancel, &event_tx).await {
            Ok(summary) => {
                ::log::info!(
                    "Crawl for '{}' ended with {:?} after {} downloads",
                    summary.keyword,
                    summary.termination,
                    summary.downloaded
                );
            }
            Err(e) => {
                ::log::error!("Crawl for '{}' could not start: {}", config.keyword, e);
            }
        }

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
    });

    Ok(event_rx)
}

/// Drive one crawl to a terminal state.
///
/// State transitions: fetch page at the current offset, reveal more
/// content, extract candidates, download up to the remaining quota, then
/// advance the offset by the configured stride. The loop ends when the
/// target count is met, when `empty_page_limit` consecutive pages yield no
/// candidates, when the session faults, or when `cancel` fires. Every
/// ending reports a summary with whatever was downloaded.
pub async fn run<D, F>(
    config: &ImageCrawlConfig,
    driver: &D,
    fetcher: &F,
    cancel: &CancellationToken,
    events: &mpsc::Sender<CrawlEvent>,
) -> Result<CrawlSummary, CrawlError>
where
    D: PageDriver,
    F: Fetcher,
{
    validate(config)?;
    let save_path = prepare_save_path(config)?;
    let extractor = UrlExtractor::new();
    let file_keyword = sanitize_keyword(&config.keyword);
    let settle = Duration::from_millis(config.settle_ms);

    let mut cursor = PageCursor::default();
    let mut assets: Vec<DownloadedAsset> = Vec::new();

    ::log::info!(
        "Starting image crawl for '{}' (target {}, saving to {})",
        config.keyword,
        config.target_count,
        save_path.display()
    );

    let termination = 'crawl: loop {
        if cancel.is_cancelled() {
            break Termination::Cancelled;
        }
        if cursor.downloaded >= config.target_count {
            break Termination::Completed;
        }
        if cursor.empty_pages >= config.empty_page_limit {
            ::log::info!(
                "{} consecutive pages without candidates, results exhausted",
                cursor.empty_pages
            );
            break Termination::Exhausted;
        }

        let page_url = search_url(&config.keyword, cursor.offset);
        ::log::info!("Loading result page: {}", page_url);

        if let Err(e) = driver.navigate(&page_url).await {
            ::log::error!("Failed to load {}: {}", page_url, e);
            emit(events, CrawlEvent::PageFailed { offset: cursor.offset }).await;
            break Termination::SessionFault;
        }
        emit(events, CrawlEvent::PageLoaded { offset: cursor.offset }).await;

        // Bounded readiness wait; a page that never shows an image element
        // still proceeds and is counted as empty below.
        match driver
            .wait_for("img", Duration::from_secs(config.page_ready_timeout_secs))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                ::log::debug!(
                    "No image elements within {}s",
                    config.page_ready_timeout_secs
                );
            }
            Err(e) => ::log::debug!("Readiness probe failed: {}", e),
        }

        advance::reveal_more(driver, config.scroll_attempts, settle).await;

        let html = match driver.source().await {
            Ok(html) => html,
            Err(e) => {
                ::log::error!("Failed to read page source: {}", e);
                String::new()
            }
        };

        let candidates = extractor.extract(&html);
        ::log::info!(
            "Extracted {} candidate URLs at offset {}",
            candidates.len(),
            cursor.offset
        );
        emit(
            events,
            CrawlEvent::UrlsExtracted {
                count: candidates.len(),
            },
        )
        .await;

        if candidates.is_empty() {
            cursor.empty_pages += 1;
            emit(events, CrawlEvent::PageFailed { offset: cursor.offset }).await;
            cursor.offset += config.page_stride;
            continue;
        }
        cursor.empty_pages = 0;

        for url in candidates {
            if cancel.is_cancelled() {
                break 'crawl Termination::Cancelled;
            }
            if cursor.downloaded >= config.target_count {
                break;
            }

            // A failed attempt leaves the index for the next candidate, so
            // filenames stay sequential without gaps.
            let filename = format!(
                "{}_{}{}",
                file_keyword,
                cursor.downloaded + 1,
                file_extension(&url)
            );
            let dest = save_path.join(&filename);

            match fetcher.fetch(&url, &dest).await {
                Ok(size_bytes) => {
                    cursor.downloaded += 1;
                    ::log::info!(
                        "[{}/{}] {} downloaded",
                        cursor.downloaded,
                        config.target_count,
                        filename
                    );
                    emit(
                        events,
                        CrawlEvent::Downloaded {
                            filename: filename.clone(),
                            index: cursor.downloaded,
                            total: config.target_count,
                        },
                    )
                    .await;
                    assets.push(DownloadedAsset {
                        url,
                        filename,
                        size_bytes,
                    });
                }
                Err(e) => {
                    ::log::warn!("Failed to download {}: {}", url, e);
                }
            }

            tokio::time::sleep(Duration::from_millis(config.download_delay_ms)).await;
        }

        cursor.offset += config.page_stride;
    };

    ::log::info!(
        "Crawl finished ({:?}): {} images in {}",
        termination,
        cursor.downloaded,
        save_path.display()
    );
    emit(
        events,
        CrawlEvent::Done {
            downloaded: cursor.downloaded,
            save_path: save_path.clone(),
        },
    )
    .await;

    Ok(CrawlSummary {
        keyword: config.keyword.clone(),
        downloaded: cursor.downloaded,
        save_path,
        assets,
        termination,
    })
}

/// Reject requests the loop cannot meaningfully run with
fn validate(config: &ImageCrawlConfig) -> Result<(), CrawlError> {
    if config.keyword.trim().is_empty() {
        return Err(CrawlError::EmptyKeyword);
    }
    if config.target_count == 0 {
        return Err(CrawlError::ZeroTarget);
    }
    Ok(())
}

/// Create the per-keyword destination directory; succeeds if already present
fn prepare_save_path(config: &ImageCrawlConfig) -> Result<PathBuf, CrawlError> {
    let path = PathBuf::from(&config.save_dir).join(sanitize_keyword(&config.keyword));
    std::fs::create_dir_all(&path).map_err(|source| CrawlError::SaveDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Send a progress event; a dropped receiver never stops the crawl
async fn emit(events: &mpsc::Sender<CrawlEvent>, event: CrawlEvent) {
    if events.send(event).await.is_err() {
        ::log::debug!("Progress receiver dropped, continuing without it");
    }
}
