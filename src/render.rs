//! Document renderer — turns fetched content into PNG artifact bytes.
//!
//! Strategy dispatch is a pattern match over [`PageContent`]: extracted zone
//! text becomes a synthetic fixed-layout document, a croppable element
//! becomes a bounding-box capture, and anything else falls back to a
//! full-page capture of the source.

use crate::browser::PageSession;
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::extract;
use crate::fetch::PageContent;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Literal substituted into the document when the zone is absent.
pub const NOT_FOUND_PLACEHOLDER: &str = "⚠️ Requested section not found in this product.";

/// Which capture strategy produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Synthetic fixed-layout document built from extracted zone text.
    Templated,
    /// Bounding-box capture of the source page's content element.
    Cropped,
    /// Unmodified capture of the whole source page.
    FullPage,
}

/// Outcome of one render dispatch.
#[derive(Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub strategy: RenderStrategy,
    /// Whether the zone token matched a block (only meaningful for the
    /// templated strategy).
    pub zone_matched: bool,
}

/// Render fetched content into PNG bytes.
///
/// A failed templated or cropped capture falls back to one full-page
/// attempt before the run gives up.
pub async fn render(
    session: &dyn PageSession,
    config: &Config,
    content: &PageContent,
) -> PipelineResult<Rendered> {
    match content {
        PageContent::PlainText(text) => {
            let section = extract::extract_zone_section(text, &config.zone_pattern);
            let zone_matched = section.is_some();
            if !zone_matched {
                warn!(
                    "zone {} not found in this product; rendering placeholder",
                    config.zone
                );
            }
            let timestamp = current_timestamp(config);
            let html = build_document(&config.header, &timestamp, section.as_deref());
            match capture_document(session, &html).await {
                Ok(bytes) => Ok(Rendered {
                    bytes,
                    strategy: RenderStrategy::Templated,
                    zone_matched,
                }),
                Err(e) => {
                    warn!("templated capture failed ({e:#}); trying full page");
                    full_page(session, zone_matched).await
                }
            }
        }
        PageContent::Element { selector } => match session.capture_element(selector).await {
            Ok(Some(bytes)) => Ok(Rendered {
                bytes,
                strategy: RenderStrategy::Cropped,
                zone_matched: false,
            }),
            Ok(None) => {
                warn!("croppable element {selector} disappeared; trying full page");
                full_page(session, false).await
            }
            Err(e) => {
                warn!("cropped capture failed ({e:#}); trying full page");
                full_page(session, false).await
            }
        },
        PageContent::Unavailable => full_page(session, false).await,
    }
}

async fn capture_document(session: &dyn PageSession, html: &str) -> anyhow::Result<Vec<u8>> {
    session.set_content(html).await?;
    session.capture_full_page().await
}

async fn full_page(session: &dyn PageSession, zone_matched: bool) -> PipelineResult<Rendered> {
    match session.capture_full_page().await {
        Ok(bytes) => Ok(Rendered {
            bytes,
            strategy: RenderStrategy::FullPage,
            zone_matched,
        }),
        Err(e) => Err(PipelineError::Render(format!("{e:#}"))),
    }
}

/// Timestamp text for the document header, in the reference time zone.
fn current_timestamp(config: &Config) -> String {
    Utc::now()
        .with_timezone(&config.timezone)
        .format("%-m/%-d/%Y, %-I:%M:%S %p %Z")
        .to_string()
}

/// Build the fixed-layout HTML document for the templated strategy.
///
/// `None` substitutes the not-found placeholder. Every inserted string
/// passes through [`escape_html`] so bulletin text cannot inject markup.
pub fn build_document(header: &str, timestamp: &str, section: Option<&str>) -> String {
    let content = section.unwrap_or(NOT_FOUND_PLACEHOLDER);
    format!(
        r#"<!doctype html>
<html><head><meta charset="utf-8">
<style>
  html,body{{margin:0;background:#ffffff;color:#111;}}
  .wrap{{padding:24px 28px 32px 28px;font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,"Roboto Mono",monospace;line-height:1.35;}}
  h1{{margin:0 0 4px 0;font:700 20px/1.2 system-ui,-apple-system,Segoe UI,Roboto,Arial;}}
  .sub{{color:#666;margin:0 0 16px 0;font:500 13px/1.2 system-ui,-apple-system,Segoe UI,Roboto,Arial;}}
  pre{{margin:0;font-size:18px;white-space:pre-wrap;word-wrap:break-word;}}
  .hr{{height:1px;background:#e6e6e6;margin:14px 0 16px;}}
</style></head>
<body><div class="wrap">
  <h1>{header}</h1>
  <div class="sub">Updated: {timestamp} · Source: NWS/NOAA</div>
  <div class="hr"></div>
  <pre>{content}</pre>
</div></body></html>"#,
        header = escape_html(header),
        timestamp = escape_html(timestamp),
        content = escape_html(content),
    )
}

/// Escape `&`, `<`, `>` for insertion into the document.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("<pre>"), "&lt;pre&gt;");
        assert_eq!(escape_html("surf 3-5 ft"), "surf 3-5 ft");
        assert_eq!(escape_html("1 < 2 > 0 & done"), "1 &lt; 2 &gt; 0 &amp; done");
    }

    #[test]
    fn test_document_contains_escaped_section() {
        let html = build_document(
            "Beaches",
            "8/4/2026, 1:00:00 PM PDT",
            Some("SURF <5 ft & falling"),
        );
        assert!(html.contains("<h1>Beaches</h1>"));
        assert!(html.contains("SURF &lt;5 ft &amp; falling"));
        assert!(!html.contains("SURF <5"));
    }

    #[test]
    fn test_document_substitutes_placeholder_when_not_found() {
        let html = build_document("Beaches", "now", None);
        assert!(html.contains(NOT_FOUND_PLACEHOLDER));
    }

    #[test]
    fn test_document_is_deterministic_for_fixed_inputs() {
        let a = build_document("H", "T", Some("BODY"));
        let b = build_document("H", "T", Some("BODY"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_header_is_escaped_too() {
        let html = build_document("<script>alert(1)</script>", "now", None);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }
}
