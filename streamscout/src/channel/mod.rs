pub mod catalog;
pub mod types;

pub use catalog::load_catalog;
pub use types::{ChannelDescriptor, ProbeOutcome};
