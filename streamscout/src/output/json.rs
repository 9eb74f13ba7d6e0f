use serde::Serialize;

use crate::channel::ProbeOutcome;
use crate::config::PlaylistInfo;
use crate::error::OutputError;
use crate::util::time;

use super::aggregate::AggregatedPlaylist;

#[derive(Serialize)]
struct Document<'a> {
    metadata: Metadata<'a>,
    channels: &'a [ProbeOutcome],
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
    description: &'a str,
    version: &'a str,
    developer: &'a str,
    country: &'a str,
    last_update_utc: String,
    last_update_local: &'a str,
    total_channels: usize,
}

/// Render the structured dataset.
///
/// Every outcome is listed, unresolved ones with `"url": null`.
pub fn render_json(
    playlist: &AggregatedPlaylist,
    info: &PlaylistInfo,
) -> Result<String, OutputError> {
    let document = Document {
        metadata: Metadata {
            name: &info.name,
            description: &info.description,
            version: &info.version,
            developer: &info.developer,
            country: &info.country,
            last_update_utc: time::format_utc(playlist.generated_at),
            last_update_local: &playlist.generated_local,
            total_channels: playlist.total_resolved,
        },
        channels: &playlist.outcomes,
    };

    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');
    Ok(rendered)
}
