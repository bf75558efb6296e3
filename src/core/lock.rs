//! Destination lock
//!
//! Serializes runs that package into the same destination directory.

use super::error::{RecipeError, Result};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Lock file name inside the destination.
pub const LOCK_FILE_NAME: &str = ".recipe.lock";

/// Attempts before giving up when the lock file keeps being replaced.
const MAX_LOCK_ATTEMPTS: usize = 8;

/// Take an exclusive lock on `destination`, creating the directory if needed.
/// The returned guard releases the lock and deletes the lock file on drop.
///
/// A holder unlinks the lock file while still holding it, so a handle opened
/// before that unlink can lock an orphaned inode. The lock only counts once
/// the locked handle is still the file at the lock path.
pub fn lock_destination(destination: &Path) -> Result<DestinationLock> {
    std::fs::create_dir_all(destination).map_err(|e| {
        RecipeError::io(format!("cannot create destination {}", destination.display()), e)
    })?;

    let lock_path = destination.join(LOCK_FILE_NAME);

    for _ in 0..MAX_LOCK_ATTEMPTS {
        let lock_file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                RecipeError::io(format!("cannot create lock file {}", lock_path.display()), e)
            })?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(RecipeError::Locked { path: lock_path });
        }

        if is_current_lock(&lock_file, &lock_path) {
            return Ok(DestinationLock {
                _file: lock_file,
                path: lock_path,
            });
        }
    }

    Err(RecipeError::Locked { path: lock_path })
}

/// Whether `file` is still the file linked at `lock_path`.
#[cfg(unix)]
fn is_current_lock(file: &File, lock_path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (file.metadata(), std::fs::metadata(lock_path)) {
        (Ok(held), Ok(current)) => held.dev() == current.dev() && held.ino() == current.ino(),
        _ => false,
    }
}

// Windows refuses to delete a file with an open handle, so the path cannot
// be swapped out from under a holder.
#[cfg(not(unix))]
fn is_current_lock(_file: &File, lock_path: &Path) -> bool {
    lock_path.exists()
}

/// RAII guard for the destination lock.
#[derive(Debug)]
pub struct DestinationLock {
    _file: File,
    path: PathBuf,
}

impl DestinationLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_creates_destination() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("pkg");

        let lock = lock_destination(&dest).unwrap();
        assert!(dest.is_dir());
        assert!(lock.path().exists());
    }

    #[test]
    fn test_second_lock_fails_while_held() {
        let dir = TempDir::new().unwrap();

        let _first = lock_destination(dir.path()).unwrap();
        let second = lock_destination(dir.path());
        assert!(matches!(second, Err(RecipeError::Locked { .. })));
    }

    #[test]
    fn test_lock_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join(LOCK_FILE_NAME);

        {
            let _lock = lock_destination(dir.path()).unwrap();
            assert!(lock_path.exists());
        }
        assert!(!lock_path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_handle_opened_before_release_does_not_share_lock() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join(LOCK_FILE_NAME);

        let first = lock_destination(dir.path()).unwrap();
        let early = File::options().write(true).open(&lock_path).unwrap();
        drop(first);

        // The early handle locks the unlinked inode and must see that
        early.try_lock_exclusive().unwrap();
        assert!(!is_current_lock(&early, &lock_path));

        let second = lock_destination(dir.path()).unwrap();
        assert!(!is_current_lock(&early, &lock_path));
        assert!(matches!(
            lock_destination(dir.path()),
            Err(RecipeError::Locked { .. })
        ));
        drop(second);
    }

    #[test]
    fn test_old_lock_file_still_blocks_while_held() {
        let dir = TempDir::new().unwrap();
        let lock_path = dir.path().join(LOCK_FILE_NAME);

        let _held = lock_destination(dir.path()).unwrap();
        let three_hours_ago =
            std::time::SystemTime::now() - std::time::Duration::from_secs(3 * 60 * 60);
        File::options()
            .write(true)
            .open(&lock_path)
            .unwrap()
            .set_modified(three_hours_ago)
            .unwrap();

        assert!(matches!(
            lock_destination(dir.path()),
            Err(RecipeError::Locked { .. })
        ));
        assert!(lock_path.exists());
    }

    #[test]
    fn test_can_relock_after_release() {
        let dir = TempDir::new().unwrap();
        drop(lock_destination(dir.path()).unwrap());
        assert!(lock_destination(dir.path()).is_ok());
    }
}
