use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::engine::{ManifestMatcher, MatchPolicy};

/// Target prefix used when neither `--base-url` nor `STREAM_URL` is set.
pub const FALLBACK_BASE_URL: &str = "https://example.invalid/stream/";

/// Run settings loaded from an optional YAML file.
///
/// Every field has a default, so a file only needs the keys it overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub playlist: PlaylistInfo,
    pub referrers: Vec<RefererPair>,
    pub probe: ProbeSettings,
    pub markers: Markers,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playlist: PlaylistInfo::default(),
            referrers: default_referrers(),
            probe: ProbeSettings::default(),
            markers: Markers::default(),
        }
    }
}

fn default_referrers() -> Vec<RefererPair> {
    [
        "https://www.google.com",
        "https://www.bing.com",
        "https://duckduckgo.com",
    ]
    .into_iter()
    .map(|origin| RefererPair {
        referer: format!("{}/", origin),
        origin: origin.to_string(),
    })
    .collect()
}

/// Descriptive metadata written into both outputs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaylistInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub developer: String,
    pub country: String,
    /// IANA zone for the local timestamp, system zone when unset.
    pub timezone: Option<String>,
}

impl Default for PlaylistInfo {
    fn default() -> Self {
        Self {
            name: "StreamScout Playlist".to_string(),
            description: "Live channel playlist resolved from channel pages".to_string(),
            version: "1.0.0".to_string(),
            developer: "streamscout".to_string(),
            country: "INT".to_string(),
            timezone: None,
        }
    }
}

/// A `Referer` / `Origin` pair presented by a probe session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefererPair {
    pub referer: String,
    pub origin: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub concurrency: usize,
    pub navigation_timeout_ms: u64,
    pub playback_wait_ms: u64,
    pub observe_window_ms: u64,
    pub match_policy: MatchPolicy,
    pub headless: bool,
    pub proxy: Option<String>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            navigation_timeout_ms: 60_000,
            playback_wait_ms: 5_000,
            observe_window_ms: 5_000,
            match_policy: MatchPolicy::Last,
            headless: true,
            proxy: None,
        }
    }
}

impl ProbeSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn playback_wait(&self) -> Duration {
        Duration::from_millis(self.playback_wait_ms)
    }

    pub fn observe_window(&self) -> Duration {
        Duration::from_millis(self.observe_window_ms)
    }
}

/// Substrings a response URL must all contain to count as the manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Markers(pub Vec<String>);

impl Default for Markers {
    fn default() -> Self {
        Self(vec![
            ".m3u8".to_string(),
            "md5=".to_string(),
            "expires=".to_string(),
        ])
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config '{}'", path.display()))?;
                serde_yaml::from_str::<Settings>(&content)
                    .with_context(|| format!("Failed to parse config '{}'", path.display()))?
            }
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if let Some(tz) = &self.playlist.timezone {
            tz.parse::<chrono_tz::Tz>()
                .map_err(|e| anyhow!("Invalid timezone '{}': {}", tz, e))?;
        }
        if self.markers.0.is_empty() {
            return Err(anyhow!("At least one manifest marker is required"));
        }
        if self.markers.0.iter().any(|m| m.is_empty()) {
            return Err(anyhow!("Manifest markers must not be empty strings"));
        }
        Ok(())
    }

    pub fn matcher(&self) -> ManifestMatcher {
        ManifestMatcher::new(self.markers.0.clone(), self.probe.match_policy)
    }
}
