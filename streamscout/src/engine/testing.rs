//! Scripted in-memory page driver for exercising probes without Chrome.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::channel::ChannelDescriptor;
use crate::config::Settings;
use crate::error::ProbeError;

use super::driver::{PageDriver, PageSession, SessionHeaders};
use super::matcher::ManifestMatcher;
use super::probe::ProbePlan;

pub const TEST_BASE_URL: &str = "https://pages.test/live/";

pub fn manifest_url(code: &str) -> String {
    format!("https://cdn.test/{code}/index.m3u8?md5=abc123&expires=1770526800")
}

pub fn channel(code: &str) -> ChannelDescriptor {
    ChannelDescriptor {
        code: code.to_string(),
        tvg_id: format!("{code}.tv"),
        tvg_logo: format!("https://logos.test/{code}.png"),
        name: format!("Channel {code}"),
    }
}

pub fn test_plan() -> ProbePlan {
    ProbePlan::from_settings(&Settings::default(), TEST_BASE_URL)
}

/// How the page for one channel code behaves.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    responses: Vec<String>,
    navigation_delay: Duration,
    fail_navigation: bool,
    hang: bool,
}

impl PageScript {
    pub fn responding<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Navigation never completes and ignores its timeout.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }
}

#[derive(Default)]
struct DriverState {
    active: AtomicUsize,
    peak: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    navigations: Mutex<Vec<String>>,
    headers: Mutex<Vec<SessionHeaders>>,
}

/// Page driver that replays scripted responses per channel code and
/// records how it was used.
#[derive(Default)]
pub struct ScriptedDriver {
    pages: Arc<HashMap<String, PageScript>>,
    fail_open: bool,
    state: Arc<DriverState>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, code: &str, script: PageScript) -> Self {
        Arc::make_mut(&mut self.pages).insert(code.to_string(), script);
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Highest number of sessions that were open at the same time.
    pub fn peak_sessions(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    pub fn active_sessions(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.navigations.lock().unwrap().clone()
    }

    pub fn presented_headers(&self) -> Vec<SessionHeaders> {
        self.state.headers.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn open_session(
        &self,
        headers: &SessionHeaders,
    ) -> Result<Box<dyn PageSession>, ProbeError> {
        if self.fail_open {
            return Err(ProbeError::Session("scripted launch failure".to_string()));
        }

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        let active = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak.fetch_max(active, Ordering::SeqCst);
        self.state.headers.lock().unwrap().push(headers.clone());

        Ok(Box::new(ScriptedSession {
            pages: Arc::clone(&self.pages),
            state: Arc::clone(&self.state),
            current: None,
            closed: false,
        }))
    }
}

struct ScriptedSession {
    pages: Arc<HashMap<String, PageScript>>,
    state: Arc<DriverState>,
    current: Option<PageScript>,
    closed: bool,
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ProbeError> {
        self.state.navigations.lock().unwrap().push(url.to_string());

        let code = url
            .rsplit('/')
            .next()
            .and_then(|file| file.strip_suffix(".php"))
            .unwrap_or_default();
        let script = self.pages.get(code).cloned().unwrap_or_default();

        if script.hang {
            std::future::pending::<()>().await;
        }

        if script.navigation_delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(ProbeError::Timeout {
                what: format!("navigation to {}", url),
                timeout,
            });
        }
        tokio::time::sleep(script.navigation_delay).await;

        if script.fail_navigation {
            return Err(ProbeError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }

        self.current = Some(script);
        Ok(())
    }

    async fn attempt_playback(&mut self, _wait: Duration) {}

    async fn observe_responses(
        &mut self,
        matcher: &ManifestMatcher,
        window: Duration,
    ) -> Option<String> {
        let deadline = tokio::time::Instant::now() + window;
        let mut observer = matcher.observer();

        if let Some(script) = &self.current {
            for url in &script.responses {
                if !observer.observe(url) {
                    return observer.finish();
                }
            }
        }

        tokio::time::sleep_until(deadline).await;
        observer.finish()
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.state.active.fetch_sub(1, Ordering::SeqCst);
            self.state.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
