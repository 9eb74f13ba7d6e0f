use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::PlaylistInfo;
use crate::error::OutputError;

use super::aggregate::AggregatedPlaylist;
use super::json::render_json;
use super::m3u::render_m3u;

/// Where the two outputs go.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub m3u: PathBuf,
}

/// Per-file result of [`write_outputs`].
#[derive(Debug)]
pub struct WriteReport {
    pub json: Result<(), OutputError>,
    pub m3u: Result<(), OutputError>,
}

impl WriteReport {
    pub fn all_failed(&self) -> bool {
        self.json.is_err() && self.m3u.is_err()
    }

    pub fn any_failed(&self) -> bool {
        self.json.is_err() || self.m3u.is_err()
    }
}

/// Render and write both outputs. A failure on one does not stop the other.
pub fn write_outputs(
    playlist: &AggregatedPlaylist,
    info: &PlaylistInfo,
    paths: &OutputPaths,
) -> WriteReport {
    let json = render_json(playlist, info)
        .and_then(|rendered| write_atomic(&paths.json, rendered.as_bytes()));
    log_result(&paths.json, &json);

    let m3u = write_atomic(&paths.m3u, render_m3u(playlist, info).as_bytes());
    log_result(&paths.m3u, &m3u);

    WriteReport { json, m3u }
}

fn log_result(path: &Path, result: &Result<(), OutputError>) {
    match result {
        Ok(()) => info!("Wrote {}", path.display()),
        Err(e) => error!("{}", e),
    }
}

/**
    Replace `path` with `contents` in one step.

    The data goes to a temporary file in the same directory which is then
    renamed over the destination, so readers see either the old file or
    the complete new one.
*/
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let wrap = |source: std::io::Error| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(wrap)?;

    let mut file = tempfile::Builder::new()
        .prefix(".streamscout-")
        .tempfile_in(dir)
        .map_err(wrap)?;
    file.write_all(contents).map_err(wrap)?;
    file.as_file().sync_all().map_err(wrap)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(wrap)?;
    }

    file.persist(path).map_err(|e| wrap(e.error))?;
    Ok(())
}
