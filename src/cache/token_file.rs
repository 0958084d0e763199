use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use crate::observability::deferred_log::DeferredLog;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::TOKEN_FILE_NAME;

#[derive(Debug, Error)]
#[error("failed to write wavefront token to {path}: {source}")]
pub struct CacheWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Api token remembered across runs as the only content of one plain text file.
///
/// No locking and no atomic replace: a torn write only costs a new provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTokenCache {
    path: Option<PathBuf>,
}

impl LocalTokenCache {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// `<home>/.wavefront_token`; unavailable when no home directory is known.
    pub fn in_home_dir() -> Self {
        Self { path: home_dir().map(|home| home.join(TOKEN_FILE_NAME)) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn describe(&self) -> String {
        self.path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| format!("~/{}", TOKEN_FILE_NAME))
    }

    /// File content verbatim, invalid UTF-8 replaced. Missing, empty and unreadable
    /// files all read as no token; read errors are recorded in `log`.
    pub async fn read(&self, log: &mut DeferredLog) -> Option<String> {
        let path = self.path.as_ref()?;
        match fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                get_metrics().await.cache_read_failures.inc();
                log.error(format!("Failed to read wavefront token from {}: {}", path.display(), err));
                None
            }
        }
    }

    /// Overwrite the file with the raw token bytes.
    ///
    /// Skipped when the location is not a plain file path, e.g. a directory.
    pub async fn write(&self, token: &str, log: &mut DeferredLog) -> Result<(), CacheWriteError> {
        let Some(path) = self.path.as_ref() else {
            log.debug("No home directory found, wavefront token not saved");
            return Ok(());
        };
        if let Ok(metadata) = fs::metadata(path).await {
            if !metadata.is_file() {
                log.debug(format!("{} is not a file, wavefront token not saved", path.display()));
                return Ok(());
            }
        }
        match fs::write(path, token.as_bytes()).await {
            Ok(()) => {
                log.debug(format!("Wavefront api token saved to {}", path.display()));
                Ok(())
            }
            Err(source) => {
                get_metrics().await.cache_write_failures.inc();
                Err(CacheWriteError { path: path.to_owned(), source })
            }
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
