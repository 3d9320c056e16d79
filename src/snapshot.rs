use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fpl_fetch::FplFetcher;
use crate::http_client::Transport;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed writing snapshot to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed serialising snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fetch the bootstrap resource and persist it, pretty-printed, at `path`.
/// Parent directories are created; the file is swapped in via a temp file.
pub fn save_snapshot<T: Transport>(
    fetcher: &FplFetcher<T>,
    path: &Path,
) -> Result<Value, SnapshotError> {
    let data = fetcher.fetch_bootstrap()?;
    write_snapshot(&data, path)?;
    info!(path = %path.display(), "snapshot saved");
    Ok(data)
}

pub fn write_snapshot(data: &Value, path: &Path) -> Result<(), SnapshotError> {
    let io_err = |source: std::io::Error| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    let swapped = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = swapped {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            debug!(path = %tmp.display(), error = %cleanup, "temp snapshot not removed");
        }
        return Err(io_err(source));
    }
    Ok(())
}
