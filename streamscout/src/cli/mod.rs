use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::{FALLBACK_BASE_URL, Settings};
use crate::engine::{ChromeDriver, MatchPolicy, PageDriver, PageProbe, ProbePlan};

mod probe;
mod run;

pub use probe::ProbeCommand;
pub use run::RunCommand;

#[derive(Parser, Debug)]
#[command(name = "streamscout")]
#[command(about = "Resolve live stream manifest URLs for a channel list into playlists")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunCommand,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe every channel in the catalog and write both playlists (default)
    Run(RunCommand),
    /// Probe a single channel code and print what was found
    Probe(ProbeCommand),
}

impl Args {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Run(cmd)) => cmd.run().await,
            Some(Command::Probe(cmd)) => cmd.run().await,
            None => self.run.run().await,
        }
    }
}

/// Options shared by every command that drives a browser.
#[derive(clap::Args, Debug, Clone)]
pub struct ProbeOptions {
    /// Prefix of every channel page; the channel code and ".php" are appended
    #[arg(long, env = "STREAM_URL")]
    pub base_url: Option<String>,

    /// YAML settings file
    #[arg(short, long, env = "STREAMSCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of probes running at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Navigation timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub nav_timeout: Option<u64>,

    /// How long to watch network responses after navigation, in milliseconds
    #[arg(long, value_name = "MS")]
    pub observe_window: Option<u64>,

    /// Stop at the first matching response instead of keeping the last one
    #[arg(long)]
    pub first_match: bool,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Proxy server for the browser (e.g. socks5://127.0.0.1:1080)
    #[arg(long)]
    pub proxy: Option<String>,
}

impl ProbeOptions {
    /// Settings file merged with command-line overrides.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        let probe = &mut settings.probe;

        if let Some(concurrency) = self.concurrency {
            probe.concurrency = concurrency;
        }
        if let Some(ms) = self.nav_timeout {
            probe.navigation_timeout_ms = ms;
        }
        if let Some(ms) = self.observe_window {
            probe.observe_window_ms = ms;
        }
        if self.first_match {
            probe.match_policy = MatchPolicy::First;
        }
        if self.headful {
            probe.headless = false;
        }
        if self.proxy.is_some() {
            probe.proxy = self.proxy.clone();
        }

        Ok(settings)
    }

    pub fn base_url(&self) -> String {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                warn!(
                    "STREAM_URL is not set, using placeholder {}",
                    FALLBACK_BASE_URL
                );
                FALLBACK_BASE_URL.to_string()
            }
        }
    }

    /// Build a probe that drives Chrome.
    pub fn chrome_probe(&self, settings: &Settings) -> PageProbe {
        let driver: Arc<dyn PageDriver> = Arc::new(ChromeDriver::new(
            settings.probe.headless,
            settings.probe.proxy.clone(),
        ));
        PageProbe::new(driver, ProbePlan::from_settings(settings, self.base_url()))
    }
}
