pub mod aggregate;
pub mod json;
pub mod m3u;
pub mod writer;

pub use aggregate::{AggregatedPlaylist, aggregate};
pub use writer::{OutputPaths, WriteReport, write_outputs};
