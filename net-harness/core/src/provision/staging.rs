//! Staging-root directories for node config and data files.

use std::{
    io::{Error, ErrorKind},
    path::PathBuf,
};

use net_harness_env as nh_env;
use tempfile::TempDir;

/// Create the staging root under which per-node `cfg`/`data` directories
/// are placed. With a custom dir the tempdir is created next to it, keeping
/// the caller-visible prefix; otherwise it goes under the current
/// directory so CI jobs can collect the artifacts with a wildcard.
pub fn create_staging_root(custom_dir: Option<PathBuf>) -> std::io::Result<TempDir> {
    let mut staging = if let Some(dir) = custom_dir {
        let prefix = dir
            .file_name()
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "invalid final directory"))?
            .to_string_lossy()
            .into_owned()
            + "_";
        let parent = dir
            .parent()
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "invalid parent directory"))?;
        TempDir::with_prefix_in(prefix, parent)?
    } else {
        TempDir::new_in(std::env::current_dir()?)?
    };

    if should_persist_staging() {
        staging.disable_cleanup(true);
    }
    Ok(staging)
}

pub(crate) fn should_persist_staging() -> bool {
    std::thread::panicking() || nh_env::keep_staging()
}
