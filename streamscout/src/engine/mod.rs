pub mod browser;
pub mod driver;
pub mod matcher;
pub mod pool;
pub mod probe;

#[cfg(test)]
pub mod testing;

pub use browser::ChromeDriver;
pub use driver::PageDriver;
pub use matcher::{ManifestMatcher, MatchPolicy};
pub use pool::ProbePool;
pub use probe::{PageProbe, ProbePlan};
