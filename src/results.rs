use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Progress notification emitted while a crawl runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrawlEvent {
    /// A result page finished loading
    PageLoaded { offset: u32 },

    /// Candidate URLs were extracted from the current page
    UrlsExtracted { count: usize },

    /// One image was persisted to disk
    Downloaded {
        filename: String,
        index: u32,
        total: u32,
    },

    /// A page yielded no candidates or failed to load
    PageFailed { offset: u32 },

    /// The crawl reached a terminal state
    Done {
        downloaded: u32,
        save_path: PathBuf,
    },
}

/// One successfully persisted image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadedAsset {
    /// URL the image was fetched from
    pub url: String,

    /// Filename within the crawl's save directory
    pub filename: String,

    /// Size of the written file in bytes
    pub size_bytes: u64,
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The requested number of images was downloaded
    Completed,

    /// Consecutive pages yielded no candidates; results ran out
    Exhausted,

    /// The browser session failed; partial results were kept
    SessionFault,

    /// The caller cancelled the crawl
    Cancelled,
}

/// Terminal report for one crawl, produced on every termination path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// Keyword this crawl searched for
    pub keyword: String,

    /// Number of images persisted
    pub downloaded: u32,

    /// Directory the images were written to
    pub save_path: PathBuf,

    /// The persisted images in download order
    pub assets: Vec<DownloadedAsset>,

    /// Which terminal condition fired
    pub termination: Termination,
}
