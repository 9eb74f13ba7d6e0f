use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use crate::channel::{ChannelDescriptor, ProbeOutcome};
use crate::config::{RefererPair, Settings};
use crate::error::ProbeError;

use super::driver::{PageDriver, PageSession, SessionHeaders};
use super::matcher::ManifestMatcher;

/// Extra time a probe may take beyond its configured phases.
const PROBE_GRACE: Duration = Duration::from_secs(5);

/// Upper bound on releasing a session.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only inputs shared by every probe in a run.
#[derive(Debug, Clone)]
pub struct ProbePlan {
    pub base_url: String,
    pub referrers: Vec<RefererPair>,
    pub matcher: ManifestMatcher,
    pub navigation_timeout: Duration,
    pub playback_wait: Duration,
    pub observe_window: Duration,
}

impl ProbePlan {
    pub fn from_settings(settings: &Settings, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            referrers: settings.referrers.clone(),
            matcher: settings.matcher(),
            navigation_timeout: settings.probe.navigation_timeout(),
            playback_wait: settings.probe.playback_wait(),
            observe_window: settings.probe.observe_window(),
        }
    }

    /// Longest a single probe may run before it is abandoned.
    pub fn ceiling(&self) -> Duration {
        self.navigation_timeout + self.playback_wait + self.observe_window + PROBE_GRACE
    }

    /// Pick the headers for one probe at random from the allow-list.
    pub fn pick_headers(&self) -> SessionHeaders {
        self.referrers
            .choose(&mut rand::rng())
            .map(SessionHeaders::from_pair)
            .unwrap_or_default()
    }
}

/**
    Resolves one channel's manifest URL through a fresh browser session.

    A probe never fails: every error is logged and reported as an outcome
    without a URL.
*/
pub struct PageProbe {
    driver: Arc<dyn PageDriver>,
    plan: Arc<ProbePlan>,
}

impl PageProbe {
    pub fn new(driver: Arc<dyn PageDriver>, plan: ProbePlan) -> Self {
        Self {
            driver,
            plan: Arc::new(plan),
        }
    }

    pub fn plan(&self) -> &ProbePlan {
        &self.plan
    }

    pub async fn run(&self, channel: &ChannelDescriptor) -> ProbeOutcome {
        let url = channel.target_url(&self.plan.base_url);
        let headers = self.plan.pick_headers();

        debug!(code = %channel.code, url = %url, referer = ?headers.referer, "opening session");

        let opened = tokio::time::timeout(
            self.plan.navigation_timeout,
            self.driver.open_session(&headers),
        )
        .await;

        let mut session = match opened {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                warn!(code = %channel.code, "probe skipped: {}", e);
                return ProbeOutcome::unresolved(channel);
            }
            Err(_) => {
                warn!(code = %channel.code, "probe skipped: session did not open in time");
                return ProbeOutcome::unresolved(channel);
            }
        };

        let ceiling = self.plan.ceiling();
        let found = match tokio::time::timeout(ceiling, self.drive(&mut session, &url)).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!(code = %channel.code, "probe failed: {}", e);
                None
            }
            Err(_) => {
                let e = ProbeError::Timeout {
                    what: format!("probe of {}", url),
                    timeout: ceiling,
                };
                warn!(code = %channel.code, "probe abandoned: {}", e);
                None
            }
        };

        if tokio::time::timeout(CLOSE_TIMEOUT, session.close())
            .await
            .is_err()
        {
            warn!(
                code = %channel.code,
                "session did not close within {}s",
                CLOSE_TIMEOUT.as_secs()
            );
        }

        match found {
            Some(manifest) => {
                info!(code = %channel.code, "resolved '{}'", channel.label());
                ProbeOutcome::resolved(channel, manifest)
            }
            None => {
                info!(code = %channel.code, "no manifest for '{}'", channel.label());
                ProbeOutcome::unresolved(channel)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut Box<dyn PageSession>,
        url: &str,
    ) -> Result<Option<String>, ProbeError> {
        session.navigate(url, self.plan.navigation_timeout).await?;
        session.attempt_playback(self.plan.playback_wait).await;
        Ok(session
            .observe_responses(&self.plan.matcher, self.plan.observe_window)
            .await)
    }
}
