use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::channel::{ChannelDescriptor, ProbeOutcome};

use super::probe::PageProbe;

/**
    Runs one probe per catalog entry with at most `concurrency` active at once.

    Outcomes come back in catalog order regardless of completion order.
    A failing, hanging or panicking probe only affects its own entry.
*/
pub struct ProbePool {
    probe: Arc<PageProbe>,
    concurrency: usize,
}

impl ProbePool {
    pub fn new(probe: PageProbe, concurrency: usize) -> Self {
        Self {
            probe: Arc::new(probe),
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run(&self, channels: &[ChannelDescriptor]) -> Vec<ProbeOutcome> {
        let total = channels.len();
        let gate = Arc::new(Semaphore::new(self.concurrency));
        let finished = Arc::new(AtomicUsize::new(0));

        let handles = channels.iter().cloned().map(|channel| {
            let gate = Arc::clone(&gate);
            let probe = Arc::clone(&self.probe);
            let finished = Arc::clone(&finished);
            tokio::spawn(async move {
                // The gate is never closed, so acquisition only waits
                let Ok(_permit) = gate.acquire_owned().await else {
                    return ProbeOutcome::unresolved(&channel);
                };
                let outcome = probe.run(&channel).await;
                let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
                info!(code = %channel.code, "[{}/{}] probe finished", done, total);
                outcome
            })
        });

        let results = join_all(handles).await;

        results
            .into_iter()
            .zip(channels)
            .map(|(result, channel)| match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(code = %channel.code, "probe task aborted: {}", e);
                    ProbeOutcome::unresolved(channel)
                }
            })
            .collect()
    }
}
