use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrome_browser::{ChromeBrowser, ChromeBrowserTab, ChromeLaunchOptions, NetworkRequestStream};
use tracing::{debug, trace};

use crate::error::ProbeError;

use super::driver::{PageDriver, PageSession, SessionHeaders};
use super::matcher::ManifestMatcher;

const PLAY_SCRIPT: &str = r#"(() => {
    const video = document.querySelector('video');
    if (video) {
        video.muted = true;
        const played = video.play();
        if (played && played.catch) played.catch(() => {});
    }
    return !!video;
})()"#;

/**
    Page driver backed by Chrome.

    Each session launches its own Chrome process, so every probe starts
    from an empty profile.
*/
pub struct ChromeDriver {
    headless: bool,
    proxy: Option<String>,
}

impl ChromeDriver {
    pub fn new(headless: bool, proxy: Option<String>) -> Self {
        Self { headless, proxy }
    }

    fn launch_options(&self) -> ChromeLaunchOptions {
        let mut options = ChromeLaunchOptions::default()
            .headless(self.headless)
            .devtools(false)
            .enable_gpu(self.headless);

        if let Some(ref proxy) = self.proxy {
            options = options.proxy_server(proxy);
        }

        options
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn open_session(
        &self,
        headers: &SessionHeaders,
    ) -> Result<Box<dyn PageSession>, ProbeError> {
        let browser = ChromeBrowser::new(self.launch_options())
            .await
            .map_err(|e| ProbeError::Session(e.to_string()))?;

        let Some(tab) = browser.get_tab(0).await else {
            let _ = browser.close().await;
            return Err(ProbeError::Session("no browser tab available".to_string()));
        };

        // Subscribe before the first navigation so nothing is missed
        let requests = tab.network().requests();

        Ok(Box::new(ChromeSession {
            browser: Some(browser),
            tab,
            requests,
            headers: headers.clone(),
        }))
    }
}

struct ChromeSession {
    browser: Option<ChromeBrowser>,
    tab: ChromeBrowserTab,
    requests: NetworkRequestStream,
    headers: SessionHeaders,
}

impl ChromeSession {
    /**
        Navigate, presenting the session's referrer when it has one.

        The entry page is loaded first and the target is opened from inside
        it, so Chrome sends that page as `Referer` and its origin as
        `Origin`. Arrival is detected by the flag on the entry document
        disappearing, which also holds when the target redirects elsewhere.
    */
    async fn load(&self, url: &str) -> Result<()> {
        let Some(entry) = entry_page(&self.headers) else {
            self.tab.navigate(url).await?;
            return Ok(());
        };

        debug!(entry, origin = ?self.headers.origin, "loading entry page");
        self.tab.navigate(entry).await?;
        self.tab.eval_json(handoff_script(url), false).await?;
        self.tab.wait_for_function(&arrival_check()).await?;
        Ok(())
    }
}

/// Set on the entry document; any newly loaded document lacks it.
const HANDOFF_FLAG: &str = "__streamscoutHandoff";

/**
    Page the target is opened from.

    Chrome derives `Origin` from the document that starts the navigation,
    so a configured origin only matters here: it is the entry page when no
    referer is set.
*/
fn entry_page(headers: &SessionHeaders) -> Option<&str> {
    headers
        .referer
        .as_deref()
        .or(headers.origin.as_deref())
        .filter(|page| !page.trim().is_empty())
}

fn handoff_script(url: &str) -> String {
    format!(
        "(() => {{ window.{HANDOFF_FLAG} = true; window.location.href = {url:?}; return true; }})()"
    )
}

fn arrival_check() -> String {
    format!("!window.{HANDOFF_FLAG} && document.readyState === 'complete'")
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ProbeError> {
        match tokio::time::timeout(timeout, self.load(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ProbeError::Timeout {
                what: format!("navigation to {}", url),
                timeout,
            }),
        }
    }

    async fn attempt_playback(&mut self, wait: Duration) {
        let found = tokio::time::timeout(wait, self.tab.wait_for_selector("video")).await;

        let result = match found {
            Ok(Ok(_)) => self
                .tab
                .eval_json(PLAY_SCRIPT, false)
                .await
                .map(|_| ())
                .map_err(|e| anyhow!("play script failed: {}", e)),
            Ok(Err(e)) => Err(anyhow!("video lookup failed: {}", e)),
            Err(_) => Err(anyhow!("no video element after {}ms", wait.as_millis())),
        };

        if let Err(e) = result {
            debug!("playback not started: {}", e);
        }
    }

    async fn observe_responses(
        &mut self,
        matcher: &ManifestMatcher,
        window: Duration,
    ) -> Option<String> {
        let deadline = tokio::time::Instant::now() + window;
        let mut observer = matcher.observer();

        loop {
            let request = match tokio::time::timeout_at(deadline, self.requests.next()).await {
                Ok(Some(request)) => request,
                Ok(None) | Err(_) => break,
            };

            let url = request.url().to_string();
            trace!(url = %url, "response observed");
            if !observer.observe(&url) {
                break;
            }
        }

        debug!(seen = observer.seen(), "observation window closed");
        observer.finish()
    }

    async fn close(&mut self) {
        let _ = self.tab.navigate("about:blank").await;
        if let Some(browser) = self.browser.take() {
            let _ = browser.close().await;
        }
    }
}
