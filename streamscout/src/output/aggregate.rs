use chrono::{DateTime, Utc};

use crate::channel::ProbeOutcome;
use crate::util::time;

/// Every probe outcome of one run plus the summary written alongside it.
///
/// Both renderers work from this value alone; timestamps are fixed here,
/// not at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedPlaylist {
    pub generated_at: DateTime<Utc>,
    pub generated_local: String,
    pub total_probed: usize,
    pub total_resolved: usize,
    pub outcomes: Vec<ProbeOutcome>,
}

impl AggregatedPlaylist {
    pub fn resolved(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| o.is_resolved())
    }
}

/// Aggregate outcomes, stamped with the current time.
pub fn aggregate(outcomes: Vec<ProbeOutcome>, timezone: Option<&str>) -> AggregatedPlaylist {
    aggregate_at(outcomes, time::now(), timezone)
}

pub fn aggregate_at(
    outcomes: Vec<ProbeOutcome>,
    at: DateTime<Utc>,
    timezone: Option<&str>,
) -> AggregatedPlaylist {
    let total_resolved = outcomes.iter().filter(|o| o.is_resolved()).count();

    AggregatedPlaylist {
        generated_at: at,
        generated_local: time::format_local(at, timezone),
        total_probed: outcomes.len(),
        total_resolved,
        outcomes,
    }
}
