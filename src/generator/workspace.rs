//! Per-request temporary directory.
//!
//! The directory is created with a `reports` prefix, owned by exactly one
//! generation and removed by a detached task once the response is built.

use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use super::GeneratorError;

const DIR_PREFIX: &str = "reports";

/// Upper bound for the background removal of a discarded workspace.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(3);
const CLEANUP_RETRY_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create a unique directory under `base_dir`, or under the platform
    /// temporary directory when `base_dir` is unset or empty.
    pub fn create(base_dir: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(DIR_PREFIX);

        let dir = match base_dir.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(base) => builder.tempdir_in(base)?,
            None => builder.tempdir()?,
        };

        // removal is handled by destroy/discard, not by TempDir's drop
        let path = dir.keep();
        debug!("Workspace created at '{}'", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the workspace, the file may not exist yet.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, GeneratorError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.path.join(name)),
            _ => Err(GeneratorError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid workspace file name '{}'", name),
            ))),
        }
    }

    /// Decode `encoded` and write it to a new file named `name`.
    ///
    /// Fails if the file already exists.
    pub fn write_base64(&self, name: &str, encoded: &str) -> Result<PathBuf, GeneratorError> {
        let bytes = general_purpose::STANDARD.decode(encoded.trim()).map_err(|e| {
            GeneratorError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("File '{}' is not valid base64: {}", name, e),
            ))
        })?;
        self.write_bytes(name, &bytes)
    }

    /// Write `bytes` to a new file named `name`. Fails if the file exists.
    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, GeneratorError> {
        let path = self.file_path(name)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(bytes)?;
        debug!("File '{}' created in workspace", path.display());
        Ok(path)
    }

    /// Best-effort removal: regular files first, then the directory itself.
    /// Failures are logged and otherwise ignored.
    pub fn destroy(&self) {
        destroy_dir(&self.path);
    }

    /// Hand the directory over to a detached task that keeps trying to
    /// remove it for at most `CLEANUP_TIMEOUT`.
    pub fn discard(self) {
        let path = self.path;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(remove_with_retry(path));
            }
            Err(_) => {
                let spawned = std::thread::Builder::new()
                    .name("workspace-cleanup".to_string())
                    .spawn(move || {
                        match tokio::runtime::Builder::new_current_thread()
                            .enable_time()
                            .build()
                        {
                            Ok(runtime) => runtime.block_on(remove_with_retry(path)),
                            Err(e) => {
                                warn!("Cleanup runtime unavailable: {}", e);
                                destroy_dir(&path);
                            }
                        }
                    });
                if let Err(e) = spawned {
                    warn!("Failed to spawn workspace cleanup: {}", e);
                }
            }
        }
    }
}

/// Repeat `destroy` until the directory is gone or the timeout expires.
pub async fn remove_with_retry(path: PathBuf) {
    let attempt = async {
        loop {
            destroy_dir(&path);
            if !path.exists() {
                break;
            }
            tokio::time::sleep(CLEANUP_RETRY_INTERVAL).await;
        }
    };

    match tokio::time::timeout(CLEANUP_TIMEOUT, attempt).await {
        Ok(()) => debug!("Workspace '{}' removed", path.display()),
        Err(_) => warn!(
            "Workspace '{}' not removed after {:?}, abandoned",
            path.display(),
            CLEANUP_TIMEOUT
        ),
    }
}

fn destroy_dir(path: &Path) {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list workspace '{}': {}", path.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let file = entry.path();
        if file.is_file() {
            if let Err(e) = fs::remove_file(&file) {
                debug!("Cannot delete '{}': {}", file.display(), e);
            }
        }
    }

    if let Err(e) = fs::remove_dir(path) {
        debug!("Cannot delete workspace '{}': {}", path.display(), e);
    }
}
