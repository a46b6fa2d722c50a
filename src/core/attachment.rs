//! Turning a user-picked file into an [`Attachment`].
//!
//! Only images, PDFs and plain text are accepted. The media type comes from
//! the file extension since a terminal has no browser-declared MIME type.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::message::Attachment;

pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Only images, PDF files or plain text can be attached ({name} is {media_type})")]
    UnsupportedType { name: String, media_type: String },

    #[error("{name} is {size} bytes; the limit is {limit} bytes")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("Could not read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Best-effort media type for a path, based on its extension.
pub fn media_type_for_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

pub fn is_accepted_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/") || media_type == "application/pdf" || media_type == "text/plain"
}

#[derive(Debug, Clone, Copy)]
pub struct AttachmentEncoder {
    max_bytes: u64,
}

impl Default for AttachmentEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTACHMENT_BYTES)
    }
}

impl AttachmentEncoder {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Validate and encode the file at `path`.
    ///
    /// The type check runs before the file is opened, so a rejected file
    /// never touches the disk beyond its metadata.
    pub fn encode_path(&self, path: &Path) -> Result<Attachment, AttachmentError> {
        let name = display_name(path);
        let media_type = media_type_for_path(path);
        if !is_accepted_media_type(&media_type) {
            return Err(AttachmentError::UnsupportedType { name, media_type });
        }

        let metadata = fs::metadata(path).map_err(|source| AttachmentError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() > self.max_bytes {
            return Err(AttachmentError::TooLarge {
                name,
                size: metadata.len(),
                limit: self.max_bytes,
            });
        }

        let bytes = fs::read(path).map_err(|source| AttachmentError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(name = %name, media_type = %media_type, size = bytes.len(), "encoded attachment");
        Ok(Attachment::from_bytes(&bytes, media_type, name))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn accepted_files_round_trip() {
        let dir = TempDir::new().unwrap();
        let encoder = AttachmentEncoder::default();
        let cases: [(&str, &[u8], &str); 4] = [
            ("photo.PNG", &[0x89, b'P', b'N', b'G', 0, 1, 2], "image/png"),
            ("scan.jpeg", &[0xff, 0xd8, 0xff, 0xe0], "image/jpeg"),
            ("report.pdf", b"%PDF-1.7\n...", "application/pdf"),
            ("notes.txt", "مرحبا\nhello".as_bytes(), "text/plain"),
        ];

        for (name, bytes, media_type) in cases {
            let path = write_file(&dir, name, bytes);
            let attachment = encoder.encode_path(&path).unwrap();
            assert_eq!(attachment.media_type, media_type);
            assert_eq!(attachment.name, name);
            assert_eq!(attachment.decode().unwrap(), bytes);
        }
    }

    #[test]
    fn unsupported_types_are_rejected() {
        let dir = TempDir::new().unwrap();
        let encoder = AttachmentEncoder::default();
        for name in ["archive.zip", "data.json", "page.html", "no_extension"] {
            let path = write_file(&dir, name, b"content");
            let err = encoder.encode_path(&path).unwrap_err();
            assert!(matches!(err, AttachmentError::UnsupportedType { .. }), "{name}");
        }
    }

    #[test]
    fn media_type_follows_the_extension() {
        assert_eq!(media_type_for_path(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("scan.pdf")), "application/pdf");
        assert_eq!(media_type_for_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            media_type_for_path(Path::new("no_extension")),
            "application/octet-stream"
        );
        assert!(!is_accepted_media_type(&media_type_for_path(Path::new("a.zip"))));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let err = AttachmentEncoder::default()
            .encode_path(&dir.path().join("gone.png"))
            .unwrap_err();
        assert!(matches!(err, AttachmentError::Unreadable { .. }));
    }

    #[test]
    fn oversized_files_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "big.txt", &[b'a'; 64]);
        let err = AttachmentEncoder::new(16).encode_path(&path).unwrap_err();
        match err {
            AttachmentError::TooLarge { size, limit, .. } => {
                assert_eq!(size, 64);
                assert_eq!(limit, 16);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }
}
