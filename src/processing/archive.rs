//! Moves images of matched found items out of the unmatched area.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("image {0} does not exist")]
    MissingSource(PathBuf),
    #[error("image path {0} has no file name")]
    NoFileName(PathBuf),
    #[error("archive destination {0} already exists")]
    DestinationExists(PathBuf),
    #[error("failed to move image: {0}")]
    Io(#[from] io::Error),
}

/// Relocates images into the matched directory, keeping their file names.
#[derive(Debug, Clone)]
pub struct Archiver {
    matched_dir: PathBuf,
}

impl Archiver {
    pub fn new(matched_dir: impl Into<PathBuf>) -> Self {
        Self {
            matched_dir: matched_dir.into(),
        }
    }

    /// Moves `source` into the matched directory and returns the new path.
    ///
    /// The directory is created on demand. The file is moved, never copied
    /// and left behind.
    pub fn archive(&self, source: &Path) -> Result<PathBuf, ArchiveError> {
        if !source.is_file() {
            return Err(ArchiveError::MissingSource(source.to_path_buf()));
        }
        let file_name = source
            .file_name()
            .ok_or_else(|| ArchiveError::NoFileName(source.to_path_buf()))?;

        fs::create_dir_all(&self.matched_dir)?;

        let destination = self.matched_dir.join(file_name);
        if destination.exists() {
            return Err(ArchiveError::DestinationExists(destination));
        }

        move_file(source, &destination)?;
        log::info!(
            "Archived image {} to {}",
            source.display(),
            destination.display()
        );

        Ok(destination)
    }
}

fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        // rename cannot cross filesystems
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        Err(error) => Err(error),
    }
}
