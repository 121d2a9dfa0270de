//! Single-instance guard.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lock file name under the system temporary directory.
pub const LOCK_FILE_NAME: &str = ".gnome-gamma-tool.lock";

/// Opens to try before giving up on a lock file that keeps being replaced.
const ACQUIRE_ATTEMPTS: usize = 3;

/// Exclusive advisory lock held for the lifetime of the value.
///
/// The lock file is removed when the guard is dropped.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// `<temp dir>/.gnome-gamma-tool.lock`
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(LOCK_FILE_NAME)
    }

    /// Takes the lock without waiting.
    ///
    /// Returns `Ok(None)` if another process holds it.
    pub fn try_acquire(path: &Path) -> io::Result<Option<Self>> {
        for _ in 0..ACQUIRE_ATTEMPTS {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(path)?;

            match file.try_lock() {
                Ok(()) => {}
                Err(TryLockError::WouldBlock) => return Ok(None),
                Err(TryLockError::Error(e)) => return Err(e),
            }

            // The previous holder unlinks the file before unlocking it, so the
            // lock just taken may be on a file that no longer has this path.
            if is_current(&file, path)? {
                debug!(path = %path.display(), "acquired instance lock");
                return Ok(Some(Self {
                    file,
                    path: path.to_path_buf(),
                }));
            }
            debug!(path = %path.display(), "lock file was replaced, retrying");
        }
        Ok(None)
    }
}

/// Returns true if `path` still names the file behind `file`.
#[cfg(unix)]
fn is_current(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(named) => Ok(held.dev() == named.dev() && held.ino() == named.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Open files cannot be unlinked here, so the path always names the lock.
#[cfg(not(unix))]
fn is_current(_file: &File, _path: &Path) -> io::Result<bool> {
    Ok(true)
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "could not remove lock file");
        }
        if let Err(e) = self.file.unlock() {
            debug!(error = %e, "could not release instance lock");
        }
    }
}
