use std::time::Duration;

use async_trait::async_trait;

use crate::config::RefererPair;
use crate::error::ProbeError;

use super::matcher::ManifestMatcher;

/// Request headers a session presents to the pages it loads.
///
/// Drivers that cannot set headers directly may present them by opening
/// the target from a page at `referer` (or `origin` when there is no
/// referer), as the Chrome driver does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHeaders {
    pub referer: Option<String>,
    pub origin: Option<String>,
}

impl SessionHeaders {
    pub fn from_pair(pair: &RefererPair) -> Self {
        Self {
            referer: Some(pair.referer.clone()),
            origin: Some(pair.origin.clone()),
        }
    }
}

/**
    A browser automation engine able to open isolated sessions.

    Every call to `open_session` must return a session that shares no
    cookies, cache or headers with any other session.
*/
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn open_session(
        &self,
        headers: &SessionHeaders,
    ) -> Result<Box<dyn PageSession>, ProbeError>;
}

/**
    One live browsing session.

    Network observation starts when the session is opened, so responses
    issued while navigating are visible to `observe_responses`.
*/
#[async_trait]
pub trait PageSession: Send {
    /// Load `url`, failing if it has not finished loading within `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ProbeError>;

    /// Try to start the page's media element. Never fails.
    async fn attempt_playback(&mut self, wait: Duration);

    /// Feed observed response URLs to `matcher` until it is satisfied or
    /// `window` elapses.
    async fn observe_responses(
        &mut self,
        matcher: &ManifestMatcher,
        window: Duration,
    ) -> Option<String>;

    /// Release the session. Safe to call after any failure.
    async fn close(&mut self);
}
