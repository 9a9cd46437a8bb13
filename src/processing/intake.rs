//! Stores uploaded photos of found items in the unmatched area.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;

const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("upload {0} has no file name")]
    NoFileName(PathBuf),
    #[error("upload {0} is not a jpg, jpeg or png image")]
    UnsupportedFormat(PathBuf),
    #[error("an image named like {0} is already stored")]
    AlreadyStored(PathBuf),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to store image: {0}")]
    Io(#[from] io::Error),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

#[derive(Debug, Clone)]
pub struct ImageStore {
    unmatched_dir: PathBuf,
}

impl ImageStore {
    pub fn new(unmatched_dir: impl Into<PathBuf>) -> Self {
        Self {
            unmatched_dir: unmatched_dir.into(),
        }
    }

    /// Decodes `upload`, converts it to RGB and saves it in the unmatched
    /// directory under the same file name.
    ///
    /// Returns the stored path together with the decoded pixels for captioning.
    pub fn store_upload(&self, upload: &Path) -> IntakeResult<(PathBuf, RgbImage)> {
        let file_name = upload
            .file_name()
            .ok_or_else(|| IntakeError::NoFileName(upload.to_path_buf()))?;

        let supported = upload
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            return Err(IntakeError::UnsupportedFormat(upload.to_path_buf()));
        }

        let image = image::open(upload)?.to_rgb8();

        fs::create_dir_all(&self.unmatched_dir)?;
        let destination = self.unmatched_dir.join(file_name);
        if destination.exists() && !is_same_file(upload, &destination)? {
            return Err(IntakeError::AlreadyStored(destination));
        }

        image.save(&destination)?;
        log::debug!(
            "Stored upload {} as {}",
            upload.display(),
            destination.display()
        );

        Ok((destination, image))
    }

    /// Removes an image saved by [`store_upload`](Self::store_upload) for a
    /// submission that was abandoned. An upload that already lived at
    /// `stored` is left in place.
    pub fn discard(&self, upload: &Path, stored: &Path) {
        if is_same_file(upload, stored).unwrap_or(false) {
            return;
        }
        match fs::remove_file(stored) {
            Ok(()) => log::debug!("Discarded stored image {}", stored.display()),
            Err(error) => log::warn!(
                "Failed to discard stored image {}: {error}",
                stored.display()
            ),
        }
    }
}

fn is_same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::{ImageStore, IntakeError};

    fn write_png(path: &std::path::Path) {
        RgbaImage::from_pixel(3, 2, Rgba([200, 10, 10, 128]))
            .save(path)
            .expect("write png");
    }

    #[test]
    fn store_upload_converts_and_saves_image() {
        let dir = tempfile::tempdir().expect("temp dir");
        let upload = dir.path().join("Bag.PNG");
        write_png(&upload);

        let store = ImageStore::new(dir.path().join("unmatched"));
        let (stored, image) = store.store_upload(&upload).expect("store upload");

        assert_eq!(stored, dir.path().join("unmatched").join("Bag.PNG"));
        assert!(stored.is_file());
        assert_eq!(image.dimensions(), (3, 2));
    }

    #[test]
    fn store_upload_rejects_other_formats() {
        let dir = tempfile::tempdir().expect("temp dir");
        let upload = dir.path().join("notes.txt");
        std::fs::write(&upload, b"hello").expect("write upload");

        let result = ImageStore::new(dir.path()).store_upload(&upload);

        assert!(matches!(result, Err(IntakeError::UnsupportedFormat(_))));
    }

    #[test]
    fn store_upload_keeps_existing_images() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ImageStore::new(dir.path().join("unmatched"));
        let first = dir.path().join("a").join("bag.png");
        let second = dir.path().join("b").join("bag.png");
        for path in [&first, &second] {
            std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            write_png(path);
        }

        store.store_upload(&first).expect("first upload");
        let result = store.store_upload(&second);

        assert!(matches!(result, Err(IntakeError::AlreadyStored(_))));
    }

    #[test]
    fn store_upload_accepts_file_already_in_place() {
        let dir = tempfile::tempdir().expect("temp dir");
        let upload = dir.path().join("bag.png");
        write_png(&upload);

        let (stored, _) = ImageStore::new(dir.path())
            .store_upload(&upload)
            .expect("in-place upload");

        assert_eq!(stored, upload);
    }

    #[test]
    fn discard_removes_stored_copy_only() {
        let dir = tempfile::tempdir().expect("temp dir");
        let upload = dir.path().join("bag.png");
        write_png(&upload);
        let store = ImageStore::new(dir.path().join("unmatched"));
        let (stored, _) = store.store_upload(&upload).expect("store upload");

        store.discard(&upload, &stored);

        assert!(!stored.exists());
        assert!(upload.is_file());
        store.store_upload(&upload).expect("upload again");
    }

    #[test]
    fn discard_keeps_upload_already_in_place() {
        let dir = tempfile::tempdir().expect("temp dir");
        let upload = dir.path().join("bag.png");
        write_png(&upload);
        let store = ImageStore::new(dir.path());
        let (stored, _) = store.store_upload(&upload).expect("in-place upload");

        store.discard(&upload, &stored);

        assert!(upload.is_file());
    }
}
