//! Browser capability seam for page loading and capture.
//!
//! The pipeline consumes a headless browser through these traits; the
//! chromiumoxide implementation lives in [`chromium`]. Tests drive the
//! pipeline with a stub session instead of a live browser.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// Result of a bounded navigation attempt.
///
/// A timeout is an expected, reportable outcome rather than an `Err`, so the
/// pipeline can distinguish it from browser breakage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page loaded and settled within the bound.
    Loaded,
    /// The bound elapsed first.
    TimedOut,
}

/// Launches one isolated browser session per pipeline pass.
///
/// Session-per-pass means a stalled or crashed browser dies with its run;
/// the next tick starts clean.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Open a fresh session with a single page.
    async fn open(&self) -> Result<Box<dyn PageSession>>;
}

/// A single live page in a headless browser session.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to `url` and wait for the load to settle, bounded by
    /// `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationOutcome>;

    /// innerText of the page's plain-text content block, `None` when the
    /// page has no such block.
    async fn plain_text_block(&self) -> Result<Option<String>>;

    /// Whether `selector` matches anything on the page.
    async fn element_exists(&self, selector: &str) -> Result<bool>;

    /// PNG of one element's bounding box, `None` when the selector matches
    /// nothing.
    async fn capture_element(&self, selector: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the page content with a synthetic document.
    async fn set_content(&self, html: &str) -> Result<()>;

    /// PNG of the entire rendered page.
    async fn capture_full_page(&self) -> Result<Vec<u8>>;

    /// Close the page and its browser session.
    async fn close(self: Box<Self>) -> Result<()>;
}
