use std::fmt::Write;

use crate::config::PlaylistInfo;
use crate::util::time;

use super::aggregate::AggregatedPlaylist;

/// Render the M3U playlist. Unresolved channels are left out.
pub fn render_m3u(playlist: &AggregatedPlaylist, info: &PlaylistInfo) -> String {
    let mut out = String::from("#EXTM3U\n");

    let header = [
        ("Name", info.name.as_str()),
        ("Description", info.description.as_str()),
        ("Version", info.version.as_str()),
        ("Developer", info.developer.as_str()),
        ("Country", info.country.as_str()),
    ];
    for (label, value) in header {
        let _ = writeln!(out, "# {}: {}", label, single_line(value));
    }
    let _ = writeln!(
        out,
        "# Last Update (UTC): {}",
        time::format_utc(playlist.generated_at)
    );
    let _ = writeln!(out, "# Last Update (Local): {}", playlist.generated_local);
    let _ = writeln!(out, "# Total Channels: {}", playlist.total_resolved);
    out.push('\n');

    for outcome in playlist.resolved() {
        let url = outcome.url.as_deref().unwrap_or_default();
        let _ = writeln!(
            out,
            "#EXTINF:-1 tvg-id=\"{}\" tvg-logo=\"{}\", {}",
            escape_attr(&outcome.tvg_id),
            escape_attr(&outcome.tvg_logo),
            single_line(&outcome.name),
        );
        let _ = writeln!(out, "{}", url);
    }

    out
}

/// Keep a value from closing its quoted attribute or breaking the line.
fn escape_attr(value: &str) -> String {
    single_line(value).replace('"', "'")
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
