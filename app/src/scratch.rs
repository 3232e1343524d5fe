//! Staging files for exports.
//!
//! Each export writes into a uniquely named `.<name>.XXXXXX.partial` file next
//! to its destination and only renames it into place once the image is fully
//! encoded. Whatever happens in between, the staging file is released exactly
//! once: persisted on success, removed on drop otherwise.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tempfile::{Builder, NamedTempFile};

#[derive(Debug, Default)]
struct Counters {
    live: AtomicUsize,
    acquired: AtomicU64,
    released: AtomicU64,
}

/// Hands out [`ScratchFile`]s and tracks how many are still alive.
#[derive(Debug, Clone, Default)]
pub struct ScratchRegistry {
    counters: Arc<Counters>,
}

impl ScratchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a staging file for `final_name` inside `dir`.
    pub fn create(&self, dir: &Path, final_name: &str) -> io::Result<ScratchFile> {
        let temp = Builder::new()
            .prefix(&format!(".{final_name}."))
            .suffix(".partial")
            .tempfile_in(dir)?;

        self.counters.live.fetch_add(1, Ordering::SeqCst);
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = %temp.path().display(), "Scratch file acquired");

        Ok(ScratchFile {
            path: temp.path().to_path_buf(),
            temp: Some(temp),
            registry: self.clone(),
            released: false,
        })
    }

    /// Handles acquired and not yet released.
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> u64 {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u64 {
        self.counters.released.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// A staging file owned by one export.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    temp: Option<NamedTempFile>,
    registry: ScratchRegistry,
    released: bool,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writable handle. `None` only after the file has been persisted.
    pub fn file(&mut self) -> Option<&mut File> {
        self.temp.as_mut().map(NamedTempFile::as_file_mut)
    }

    /// Flush to disk and move the staging file onto `dest`.
    ///
    /// On error the staging file is removed before returning.
    pub fn persist(mut self, dest: &Path) -> io::Result<PathBuf> {
        let Some(temp) = self.temp.take() else {
            return Err(io::Error::other("scratch file already persisted"));
        };
        temp.as_file().sync_all()?;
        // a failed persist hands the temp file back; dropping it unlinks the staging path
        temp.persist(dest).map_err(|e| e.error)?;
        self.release();
        tracing::debug!(dest = %dest.display(), "Scratch file persisted");
        Ok(dest.to_path_buf())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.release();
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            match temp.close() {
                Ok(()) => tracing::debug!(path = %self.path.display(), "Scratch file removed"),
                Err(e) => tracing::warn!(path = %self.path.display(), "Failed to remove scratch file: {e}"),
            }
        }
        self.release();
    }
}
