use std::path::Path;

use tracing::warn;

use crate::error::CatalogError;

use super::types::ChannelDescriptor;

/// Load the ordered channel list from a JSON array on disk.
///
/// Entries with a blank `code` are kept and probed like any other; they
/// only produce a warning.
pub fn load_catalog(path: &Path) -> Result<Vec<ChannelDescriptor>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let channels: Vec<ChannelDescriptor> =
        serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    for (index, channel) in channels.iter().enumerate() {
        if channel.code.trim().is_empty() {
            warn!("Catalog entry #{} ('{}') has a blank code", index, channel.name);
        }
    }

    Ok(channels)
}
