use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use importer_logging::{importer_debug, importer_info};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;

/// Lock files a live browser keeps inside its profile. Copying them would make
/// the saved profile look "in use" to the next run.
pub const PROFILE_LOCK_FILES: &[&str] = &[
    "parent.lock",
    "lock",
    ".parentlock",
    "SingletonLock",
    "SingletonSocket",
    "SingletonCookie",
];

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("profile source {0} is not a directory")]
    ProfileSource(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace existing file if present; a re-run overwrites the same cover.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// The durable, authenticated browser profile.
///
/// One running instance owns the directory. Two instances sharing a profile
/// path is not supported: the saved copy is replaced wholesale on every save.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replaces the stored profile with a copy of `live`, leaving out lock files.
    /// Returns the number of files copied.
    pub fn save_from(&self, live: &Path) -> Result<usize, PersistError> {
        if !live.is_dir() {
            return Err(PersistError::ProfileSource(live.to_path_buf()));
        }
        if live == self.dir {
            importer_debug!("Profile {:?} is already the stored profile", live);
            return Ok(0);
        }

        let staging = self.dir.with_extension("saving");
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        let copied = copy_profile(live, &staging)?;

        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        fs::rename(&staging, &self.dir)?;
        importer_info!("Saved {} profile files from {:?} to {:?}", copied, live, self.dir);
        Ok(copied)
    }

    /// Seeds a browser working directory from the stored profile.
    /// A missing store is a first run and copies nothing.
    pub fn restore_into(&self, working: &Path) -> Result<usize, PersistError> {
        if !self.dir.is_dir() {
            importer_info!("No saved profile at {:?}, starting logged out", self.dir);
            fs::create_dir_all(working)?;
            return Ok(0);
        }
        let copied = copy_profile(&self.dir, working)?;
        importer_debug!("Restored {} profile files into {:?}", copied, working);
        Ok(copied)
    }
}

fn copy_profile(from: &Path, to: &Path) -> Result<usize, PersistError> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    let walker = WalkDir::new(from)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_lock_file(entry.file_name().to_str()));
    for entry in walker {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = to.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
        // Symlinks only appear as browser singletons; skip any that are left.
    }
    Ok(copied)
}

fn is_lock_file(name: Option<&str>) -> bool {
    name.is_some_and(|name| PROFILE_LOCK_FILES.contains(&name))
}
