//! Image Acquirer — holds at most one selected selfie until submission.
//!
//! Selection reads the file eagerly so the preview can show real size and
//! type; nothing is sent anywhere until the user submits. The original UI
//! advertised "JPG, PNG (Макс. 5МБ)" without enforcing it; here both limits
//! are real and violations never reach the gateway.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::ImageFile;

/// Hard cap on the selected image, matching the advertised 5 MB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported image format '{extension}' (expected jpg, jpeg, png or webp)")]
    UnsupportedFormat { extension: String },

    #[error("Image is {actual} bytes, over the {limit}-byte limit")]
    TooLarge { actual: usize, limit: usize },
}

/// Preview descriptor for the currently selected file. Local only — no
/// upload happens at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub mime_type: String,
    pub byte_len: usize,
}

/// The acquirer itself: empty, or holding exactly one image.
#[derive(Debug, Default)]
pub struct PhotoUpload {
    selected: Option<ImageFile>,
}

impl PhotoUpload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the file at `path`, replacing any prior selection. The prior
    /// file is discarded even if the new selection fails validation.
    pub fn select(&mut self, path: &Path) -> Result<&ImageFile, PhotoError> {
        self.selected = None;

        let mime_type = mime_type_for(path)?;
        let bytes = fs::read(path)?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(PhotoError::TooLarge {
                actual: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.selected = Some(ImageFile {
            file_name,
            mime_type,
            bytes,
        });
        Ok(self.selected.as_ref().expect("just selected"))
    }

    pub fn preview(&self) -> Option<Preview> {
        self.selected.as_ref().map(|img| Preview {
            file_name: img.file_name.clone(),
            mime_type: img.mime_type.clone(),
            byte_len: img.bytes.len(),
        })
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    /// Discards the current file and preview.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Hands the raw file to the caller. Returns `None` when nothing is
    /// selected — submission is only enabled when a file is present.
    pub fn submit(&mut self) -> Option<ImageFile> {
        self.selected.take()
    }
}

/// Derives the declared MIME type from the file extension. The extension is
/// a hint, not a content check.
fn mime_type_for(path: &Path) -> Result<String, PhotoError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mime = match extension.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG.to_string(),
        "png" => mime::IMAGE_PNG.to_string(),
        "webp" => "image/webp".to_string(),
        _ => return Err(PhotoError::UnsupportedFormat { extension }),
    };
    Ok(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_image(dir: &tempfile::TempDir, name: &str, len: usize) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&vec![0xAB; len]).unwrap();
        path
    }

    #[test]
    fn test_select_reads_bytes_and_derives_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "selfie.jpg", 128);

        let mut upload = PhotoUpload::new();
        let image = upload.select(&path).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes.len(), 128);
        assert_eq!(image.file_name, "selfie.jpg");

        let preview = upload.preview().unwrap();
        assert_eq!(preview.byte_len, 128);
        assert_eq!(preview.mime_type, "image/jpeg");
    }

    #[test]
    fn test_select_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "notes.txt", 16);

        let mut upload = PhotoUpload::new();
        let err = upload.select(&path).unwrap_err();
        assert!(matches!(err, PhotoError::UnsupportedFormat { .. }));
        assert!(!upload.has_selection());
    }

    #[test]
    fn test_select_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "huge.png", MAX_IMAGE_BYTES + 1);

        let mut upload = PhotoUpload::new();
        let err = upload.select(&path).unwrap_err();
        assert!(matches!(err, PhotoError::TooLarge { .. }));
        assert!(!upload.has_selection());
    }

    #[test]
    fn test_new_selection_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_temp_image(&dir, "first.png", 10);
        let second = write_temp_image(&dir, "second.jpeg", 20);

        let mut upload = PhotoUpload::new();
        upload.select(&first).unwrap();
        upload.select(&second).unwrap();

        let preview = upload.preview().unwrap();
        assert_eq!(preview.file_name, "second.jpeg");
        assert_eq!(preview.byte_len, 20);
    }

    #[test]
    fn test_clear_discards_file_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "selfie.webp", 32);

        let mut upload = PhotoUpload::new();
        upload.select(&path).unwrap();
        upload.clear();
        assert!(!upload.has_selection());
        assert!(upload.preview().is_none());
        assert!(upload.submit().is_none());
    }

    #[test]
    fn test_submit_hands_over_file_and_empties_acquirer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "selfie.jpg", 64);

        let mut upload = PhotoUpload::new();
        upload.select(&path).unwrap();

        let image = upload.submit().unwrap();
        assert_eq!(image.bytes.len(), 64);
        assert!(!upload.has_selection());
    }

    #[test]
    fn test_submit_without_selection_is_disabled() {
        let mut upload = PhotoUpload::new();
        assert!(upload.submit().is_none());
    }
}
