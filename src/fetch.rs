//! Snapshot fetcher — loads the bulletin page and classifies its content.

use crate::browser::{NavigationOutcome, PageSession};
use crate::error::{PipelineError, PipelineResult};
use std::time::Duration;
use tracing::debug;

/// Selectors probed for a croppable content element, most specific first.
const CONTENT_SELECTORS: &[&str] = &["pre", "main"];

/// What the fetch step found on the source page.
///
/// Discovered dynamically per run; each variant selects a render strategy.
/// Absence at any probe step is a normal branch, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// The page exposes a plain-text bulletin block.
    PlainText(String),
    /// No readable text, but an element worth cropping exists.
    Element { selector: &'static str },
    /// Neither; the whole page is all that is left to capture.
    Unavailable,
}

/// Navigate the session to `url` and classify the loaded page.
///
/// Navigation is bounded by `timeout`; exceeding it aborts the run with
/// [`PipelineError::FetchTimeout`] and the prior artifact stays published.
pub async fn fetch_page(
    session: &mut dyn PageSession,
    url: &str,
    timeout: Duration,
) -> PipelineResult<PageContent> {
    match session.navigate(url, timeout.as_millis() as u64).await {
        Ok(NavigationOutcome::Loaded) => {}
        Ok(NavigationOutcome::TimedOut) => return Err(PipelineError::FetchTimeout(timeout)),
        Err(e) => return Err(PipelineError::Fetch(format!("{e:#}"))),
    }

    match session.plain_text_block().await {
        Ok(Some(text)) if !text.trim().is_empty() => {
            debug!("plain-text block located ({} bytes)", text.len());
            return Ok(PageContent::PlainText(text));
        }
        Ok(_) => debug!("no readable text block on page"),
        Err(e) => return Err(PipelineError::Fetch(format!("{e:#}"))),
    }

    for &selector in CONTENT_SELECTORS {
        match session.element_exists(selector).await {
            Ok(true) => {
                debug!("croppable element located: {selector}");
                return Ok(PageContent::Element { selector });
            }
            Ok(false) => {}
            Err(e) => return Err(PipelineError::Fetch(format!("{e:#}"))),
        }
    }

    debug!("page exposes neither a text block nor a croppable element");
    Ok(PageContent::Unavailable)
}
