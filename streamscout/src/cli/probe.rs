use anyhow::Result;

use crate::channel::ChannelDescriptor;

use super::ProbeOptions;

#[derive(clap::Args, Debug)]
pub struct ProbeCommand {
    /// Channel code, as it appears in the catalog
    pub code: String,

    #[command(flatten)]
    pub options: ProbeOptions,
}

impl ProbeCommand {
    pub async fn run(self) -> Result<()> {
        let settings = self.options.settings()?;
        let probe = self.options.chrome_probe(&settings);

        let channel = ChannelDescriptor {
            code: self.code.clone(),
            tvg_id: String::new(),
            tvg_logo: String::new(),
            name: self.code,
        };

        println!("Probing: {}", channel.target_url(&probe.plan().base_url));
        println!(
            "  window: {}ms, match: {:?}",
            settings.probe.observe_window_ms, settings.probe.match_policy
        );

        let outcome = probe.run(&channel).await;

        match outcome.url {
            Some(url) => println!("  OK    {}", url),
            None => println!("  NONE  no matching manifest observed"),
        }

        Ok(())
    }
}
