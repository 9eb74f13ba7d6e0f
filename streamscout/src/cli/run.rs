use std::path::PathBuf;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::channel::{ChannelDescriptor, load_catalog};
use crate::config::Settings;
use crate::engine::{PageProbe, ProbePool};
use crate::output::{OutputPaths, WriteReport, aggregate, write_outputs};

use super::ProbeOptions;

#[derive(clap::Args, Debug)]
pub struct RunCommand {
    /// Channel catalog (JSON array of {code, tvg-id, tvg-logo, name})
    #[arg(long, default_value = "channels.json")]
    pub channels: PathBuf,

    /// Structured output file
    #[arg(long, default_value = "playlist.json")]
    pub json_out: PathBuf,

    /// M3U playlist output file
    #[arg(long, default_value = "playlist.m3u")]
    pub m3u_out: PathBuf,

    #[command(flatten)]
    pub options: ProbeOptions,
}

impl RunCommand {
    pub async fn run(self) -> Result<()> {
        let settings = self.options.settings()?;
        let channels = load_catalog(&self.channels)?;
        info!(
            "Loaded {} channel(s) from {}",
            channels.len(),
            self.channels.display()
        );

        let probe = self.options.chrome_probe(&settings);
        let paths = OutputPaths {
            json: self.json_out,
            m3u: self.m3u_out,
        };

        let summary = execute(probe, &settings, &channels, &paths).await?;

        println!();
        println!("=== Summary ===");
        println!("  Probed:   {}", summary.probed);
        println!("  Resolved: {}", summary.resolved);
        println!("  JSON:     {}", status(&summary.report.json, &paths.json));
        println!("  M3U:      {}", status(&summary.report.m3u, &paths.m3u));

        Ok(())
    }
}

fn status<E>(result: &Result<(), E>, path: &std::path::Path) -> String {
    match result {
        Ok(()) => path.display().to_string(),
        Err(_) => format!("{} (FAILED)", path.display()),
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub probed: usize,
    pub resolved: usize,
    pub report: WriteReport,
}

/// Probe every channel, aggregate the outcomes and write both outputs.
///
/// Fails only when neither output could be written.
pub async fn execute(
    probe: PageProbe,
    settings: &Settings,
    channels: &[ChannelDescriptor],
    paths: &OutputPaths,
) -> Result<RunSummary> {
    let pool = ProbePool::new(probe, settings.probe.concurrency);
    info!(
        "Probing {} channel(s), {} at a time",
        channels.len(),
        pool.concurrency()
    );
    let outcomes = pool.run(channels).await;

    let playlist = aggregate(outcomes, settings.playlist.timezone.as_deref());
    info!(
        "{} of {} channel(s) resolved",
        playlist.total_resolved, playlist.total_probed
    );

    let report = write_outputs(&playlist, &settings.playlist, paths);
    if report.all_failed() {
        bail!(
            "Failed to write '{}' and '{}'",
            paths.json.display(),
            paths.m3u.display()
        );
    }
    if report.any_failed() {
        warn!("Only one of the two outputs was written");
    }

    Ok(RunSummary {
        probed: playlist.total_probed,
        resolved: playlist.total_resolved,
        report,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use super::*;
    use crate::engine::ProbePlan;
    use crate::engine::testing::{PageScript, ScriptedDriver, TEST_BASE_URL, channel, manifest_url};

    fn scripted_probe(driver: Arc<ScriptedDriver>, settings: &Settings) -> PageProbe {
        PageProbe::new(driver, ProbePlan::from_settings(settings, TEST_BASE_URL))
    }

    fn paths_in(dir: &tempfile::TempDir) -> OutputPaths {
        OutputPaths {
            json: dir.path().join("playlist.json"),
            m3u: dir.path().join("playlist.m3u"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_resolved_channel() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(&dir);
        let settings = Settings::default();
        let driver = Arc::new(
            ScriptedDriver::new().page("one", PageScript::responding([manifest_url("one")])),
        );

        let summary = execute(
            scripted_probe(driver, &settings),
            &settings,
            &[channel("one")],
            &paths,
        )
        .await
        .unwrap();

        assert_eq!(summary.probed, 1);
        assert_eq!(summary.resolved, 1);

        let m3u = std::fs::read_to_string(&paths.m3u).unwrap();
        assert_eq!(m3u.matches("#EXTINF").count(), 1);
        assert!(m3u.contains(&format!(
            "#EXTINF:-1 tvg-id=\"one.tv\" tvg-logo=\"https://logos.test/one.png\", \
             Channel one\n{}\n",
            manifest_url("one")
        )));
        assert!(m3u.contains("# Total Channels: 1\n"));

        let json: Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["metadata"]["total_channels"], 1);
        assert_eq!(json["channels"][0]["url"], manifest_url("one"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_unmatched_channel() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(&dir);
        let settings = Settings::default();
        let driver = Arc::new(ScriptedDriver::new().page(
            "one",
            PageScript::responding(["https://cdn.test/one/index.m3u8?expires=1770526800"]),
        ));

        let summary = execute(
            scripted_probe(driver, &settings),
            &settings,
            &[channel("one")],
            &paths,
        )
        .await
        .unwrap();

        assert_eq!(summary.resolved, 0);

        let m3u = std::fs::read_to_string(&paths.m3u).unwrap();
        assert!(!m3u.contains("#EXTINF"));
        assert!(!m3u.contains("one.tv"));

        let json: Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["metadata"]["total_channels"], 0);
        assert_eq!(json["channels"].as_array().unwrap().len(), 1);
        assert!(json["channels"][0]["url"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_catalog_keeps_every_entry_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(&dir);
        let settings = Settings::default();
        let driver = Arc::new(
            ScriptedDriver::new()
                .page(
                    "a",
                    PageScript::responding([manifest_url("a")])
                        .delayed(std::time::Duration::from_secs(3)),
                )
                .page("b", PageScript::default().failing_navigation())
                .page("c", PageScript::responding([manifest_url("c")])),
        );
        let channels = [channel("a"), channel("b"), channel("c")];

        let summary = execute(scripted_probe(driver, &settings), &settings, &channels, &paths)
            .await
            .unwrap();

        assert_eq!(summary.probed, 3);
        assert_eq!(summary.resolved, 2);

        let json: Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        let ids: Vec<_> = json["channels"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["tvg-id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a.tv", "b.tv", "c.tv"]);

        let m3u = std::fs::read_to_string(&paths.m3u).unwrap();
        let a = m3u.find("a.tv").unwrap();
        let c = m3u.find("c.tv").unwrap();
        assert!(a < c);
        assert!(!m3u.contains("b.tv"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_outputs_failing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let paths = OutputPaths {
            json: blocker.join("playlist.json"),
            m3u: blocker.join("playlist.m3u"),
        };
        let settings = Settings::default();
        let driver = Arc::new(ScriptedDriver::new());

        let result = execute(
            scripted_probe(driver, &settings),
            &settings,
            &[channel("one")],
            &paths,
        )
        .await;

        assert!(result.is_err());
    }
}
