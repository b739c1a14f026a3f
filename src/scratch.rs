//! Per-test scratch directories with best-effort cleanup
//!
//! Each test case gets a uniquely named, writable directory under the run
//! root, disambiguated by the process-wide counter rather than the clock so
//! same-millisecond allocations never collide. Teardown clears read-only
//! flags and deletes the tree; cleanup failures are logged at trace level and
//! suppressed, never surfaced as a test failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::Result;
use crate::ident;

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).map(PathBuf::from)
}

/// Run-level root all scratch directories are created under
/// (default: `<system-temp>/testrig`).
#[must_use]
pub fn run_root() -> PathBuf {
    env_path("TESTRIG_SCRATCH_ROOT").unwrap_or_else(|| std::env::temp_dir().join("testrig"))
}

/// A private filesystem area owned by one test case.
///
/// Guaranteed to exist after [`ScratchDir::allocate`] and absent
/// (best-effort) after [`ScratchDir::cleanup`], which also runs on drop.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Allocate a fresh `_temp_<N>` directory under the run root.
    pub fn allocate() -> Result<Self> {
        let path = run_root().join(format!("_temp_{}", ident::next_unique()));
        trace!("creating scratch dir: {}", path.display());
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a (not yet created) entry inside the scratch dir.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// A randomized, collision-unlikely file path inside the scratch dir.
    #[must_use]
    pub fn random_file_path(&self) -> PathBuf {
        self.path.join(format!("{:016x}.tmp", ident::next_random()))
    }

    /// Write a file inside the scratch dir, creating parent directories.
    pub fn create_file(&self, name: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Virtual application-data directory, created on first request.
    ///
    /// Used when a test needs to simulate an application's persistent storage
    /// location without touching the real one.
    pub fn app_data_dir(&self) -> Result<PathBuf> {
        let path = self.path.join("virtual_app");
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Delete the scratch tree, clearing read-only flags first.
    ///
    /// Best-effort and non-fatal: a locked file or permission problem is
    /// logged at trace level and otherwise ignored, so one test's cleanup
    /// trouble cannot cascade into failures for unrelated tests. Idempotent
    /// when the directory is already gone.
    pub fn cleanup(&self) {
        if !self.path.exists() {
            return;
        }

        if let Err(err) = clear_readonly(&self.path) {
            trace!(
                "failed to clear read-only flags under {}: {err}",
                self.path.display()
            );
        }

        if let Err(err) = fs::remove_dir_all(&self.path) {
            trace!("failed to delete scratch dir {}: {err}", self.path.display());
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Recursively drop the read-only flag from everything under `dir`.
///
/// A read-only entry would otherwise block deletion on Windows; on Unix a
/// read-only directory blocks removing its children. The scratch tree is
/// private to the test run, so loosening permissions here is safe.
#[allow(clippy::permissions_set_readonly_false)]
fn clear_readonly(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let mut perms = entry.metadata()?.permissions();
        if perms.readonly() {
            perms.set_readonly(false);
            fs::set_permissions(&path, perms)?;
        }
        if entry.file_type()?.is_dir() {
            clear_readonly(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_creates_the_directory() {
        let scratch = ScratchDir::allocate().unwrap();
        assert!(scratch.path().is_dir());
        assert!(
            scratch
                .path()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("_temp_")
        );
    }

    #[test]
    fn allocations_never_collide() {
        let a = ScratchDir::allocate().unwrap();
        let b = ScratchDir::allocate().unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn cleanup_removes_the_tree() {
        let scratch = ScratchDir::allocate().unwrap();
        scratch.create_file("nested/dir/file.txt", "contents").unwrap();
        let path = scratch.path().to_path_buf();

        scratch.cleanup();
        assert!(!path.exists());

        // Idempotent on an already-deleted tree.
        scratch.cleanup();
    }

    #[test]
    fn cleanup_handles_read_only_files() {
        let scratch = ScratchDir::allocate().unwrap();
        let file = scratch.create_file("locked.txt", "keep out").unwrap();
        let mut perms = fs::metadata(&file).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&file, perms).unwrap();
        let path = scratch.path().to_path_buf();

        scratch.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn drop_cleans_up_after_the_test() {
        let path = {
            let scratch = ScratchDir::allocate().unwrap();
            scratch.create_file("file.txt", "x").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn app_data_dir_is_created_on_first_request() {
        let scratch = ScratchDir::allocate().unwrap();
        let app = scratch.app_data_dir().unwrap();
        assert!(app.is_dir());
        assert!(app.starts_with(scratch.path()));
    }

    #[test]
    fn random_file_paths_stay_inside_the_scratch_dir() {
        let scratch = ScratchDir::allocate().unwrap();
        let a = scratch.random_file_path();
        let b = scratch.random_file_path();
        assert!(a.starts_with(scratch.path()));
        assert_ne!(a, b);
    }
}
