use serde::{Deserialize, Serialize};

/// Which qualifying response wins when several appear in one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Stop observing at the first qualifying URL.
    First,
    /// Keep observing until the window closes; the most recent URL wins.
    #[default]
    Last,
}

/// Decides whether an observed response URL is the stream manifest.
#[derive(Debug, Clone)]
pub struct ManifestMatcher {
    markers: Vec<String>,
    policy: MatchPolicy,
}

impl ManifestMatcher {
    pub fn new(markers: Vec<String>, policy: MatchPolicy) -> Self {
        Self { markers, policy }
    }

    /// A URL matches when it contains every marker.
    pub fn matches(&self, url: &str) -> bool {
        self.markers.iter().all(|marker| url.contains(marker.as_str()))
    }

    pub fn observer(&self) -> ResponseObserver<'_> {
        ResponseObserver {
            matcher: self,
            matched: None,
            seen: 0,
        }
    }
}

/// Folds a stream of response URLs into "matched URL or none".
///
/// Drivers feed every observed URL to [`ResponseObserver::observe`] until it
/// returns `false` or their window closes, then call
/// [`ResponseObserver::finish`].
pub struct ResponseObserver<'a> {
    matcher: &'a ManifestMatcher,
    matched: Option<String>,
    seen: usize,
}

impl ResponseObserver<'_> {
    /// Inspect one response URL. Returns whether observation should continue.
    pub fn observe(&mut self, url: &str) -> bool {
        self.seen += 1;

        if !self.matcher.matches(url) {
            return true;
        }

        match self.matcher.policy {
            MatchPolicy::First => {
                if self.matched.is_none() {
                    self.matched = Some(url.to_string());
                }
                false
            }
            MatchPolicy::Last => {
                self.matched = Some(url.to_string());
                true
            }
        }
    }

    /// Number of responses inspected so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn finish(self) -> Option<String> {
        self.matched
    }
}
