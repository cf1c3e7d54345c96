//! Chromium-backed browser sessions via chromiumoxide.

use super::{BrowserEngine, NavigationOutcome, PageSession};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Capture surface: tall fixed-width canvas at 2x density, so artifacts
/// stay visually consistent across runs while growing vertically to fit.
const VIEWPORT_WIDTH: u32 = 1100;
const VIEWPORT_HEIGHT: u32 = 1600;
const DEVICE_SCALE_FACTOR: f64 = 2.0;

/// Find the Chromium binary path.
pub fn find_chromium(configured: Option<&Path>) -> Option<PathBuf> {
    // 1. Explicit configuration (SHORECAST_CHROMIUM_PATH)
    if let Some(p) = configured {
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    // 2. ~/.shorecast/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".shorecast/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".shorecast/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".shorecast/chromium/chrome-linux64/chrome"),
                home.join(".shorecast/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Engine that launches a headless Chromium per session.
pub struct ChromiumEngine {
    executable: PathBuf,
}

impl ChromiumEngine {
    /// Resolve the Chromium executable without launching anything.
    pub fn discover(configured: Option<&Path>) -> Result<Self> {
        let executable = find_chromium(configured).context(
            "Chromium not found. Install Chrome/Chromium or set SHORECAST_CHROMIUM_PATH.",
        )?;
        Ok(Self { executable })
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let config = BrowserConfig::builder()
            .chrome_executable(self.executable.clone())
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                device_scale_factor: Some(DEVICE_SCALE_FACTOR),
                ..Default::default()
            })
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open page")?;

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
        }))
    }
}

/// One headless Chromium process with a single page.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationOutcome> {
        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            self.page.goto(url).await?;
            // Settle until in-flight requests finish or the load event fires.
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(NavigationOutcome::Loaded),
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => Ok(NavigationOutcome::TimedOut),
        }
    }

    async fn plain_text_block(&self) -> Result<Option<String>> {
        let element = match self.page.find_element("pre").await {
            Ok(el) => el,
            Err(_) => return Ok(None),
        };
        element
            .inner_text()
            .await
            .context("failed to read text block")
    }

    async fn element_exists(&self, selector: &str) -> Result<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn capture_element(&self, selector: &str) -> Result<Option<Vec<u8>>> {
        let element = match self.page.find_element(selector).await {
            Ok(el) => el,
            Err(_) => return Ok(None),
        };
        let bytes = element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .context("element capture failed")?;
        Ok(Some(bytes))
    }

    async fn set_content(&self, html: &str) -> Result<()> {
        self.page
            .set_content(html)
            .await
            .context("failed to set page content")?;
        Ok(())
    }

    async fn capture_full_page(&self) -> Result<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .context("page capture failed")
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_navigate_probe_and_capture() {
        let engine = ChromiumEngine::discover(None).expect("chromium not found");
        let mut session = engine.open().await.expect("failed to open session");

        let outcome = session
            .navigate("data:text/html,<pre>CAZ340 TEST BODY</pre>", 10_000)
            .await
            .expect("navigation failed");
        assert_eq!(outcome, NavigationOutcome::Loaded);

        let text = session
            .plain_text_block()
            .await
            .expect("probe failed")
            .expect("pre block missing");
        assert!(text.contains("CAZ340 TEST BODY"));

        assert!(session.element_exists("pre").await.unwrap());
        assert!(!session.element_exists("table").await.unwrap());

        session
            .set_content("<!doctype html><html><body><pre>replaced</pre></body></html>")
            .await
            .expect("set_content failed");
        let bytes = session.capture_full_page().await.expect("capture failed");
        assert!(!bytes.is_empty());

        session.close().await.expect("close failed");
    }
}
