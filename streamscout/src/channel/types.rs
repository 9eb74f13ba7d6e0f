use serde::{Deserialize, Serialize};

/// One catalog entry.
///
/// `code` builds the probe target; the remaining fields are passed through
/// to the outputs untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelDescriptor {
    pub code: String,
    #[serde(rename = "tvg-id", default)]
    pub tvg_id: String,
    #[serde(rename = "tvg-logo", default)]
    pub tvg_logo: String,
    #[serde(default)]
    pub name: String,
}

impl ChannelDescriptor {
    /// Build the page URL this channel is probed at.
    pub fn target_url(&self, base_url: &str) -> String {
        format!("{}{}.php", base_url, self.code)
    }

    /// Label used in log lines.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.code
        } else {
            &self.name
        }
    }
}

/// Result of probing one channel. `url` is `None` when nothing matched,
/// the page failed to load, or the probe timed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    #[serde(rename = "tvg-id")]
    pub tvg_id: String,
    #[serde(rename = "tvg-logo")]
    pub tvg_logo: String,
    pub name: String,
    pub url: Option<String>,
}

impl ProbeOutcome {
    pub fn resolved(channel: &ChannelDescriptor, url: String) -> Self {
        Self::new(channel, Some(url))
    }

    pub fn unresolved(channel: &ChannelDescriptor) -> Self {
        Self::new(channel, None)
    }

    fn new(channel: &ChannelDescriptor, url: Option<String>) -> Self {
        Self {
            tvg_id: channel.tvg_id.clone(),
            tvg_logo: channel.tvg_logo.clone(),
            name: channel.name.clone(),
            url,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.url.is_some()
    }
}
