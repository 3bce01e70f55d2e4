//! Uploaded image files
//!
//! Images live under `<root>/images/`. Posts store the relative reference
//! (`images/<file>`); only references of exactly that shape are ever resolved
//! back to disk.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

pub const IMAGE_DIR: &str = "images";

const ACCEPTED_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

/// An image file received with a request, not yet written to disk.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Whether an upload with this content type is stored at all.
pub fn is_accepted_type(content_type: &mime::Mime) -> bool {
    ACCEPTED_TYPES.contains(&content_type.essence_str())
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn image_dir(&self) -> PathBuf {
        self.root.join(IMAGE_DIR)
    }

    /// Write an upload and return its reference.
    pub async fn save(&self, upload: &ImageUpload) -> Result<String> {
        let dir = self.image_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!(
            "{}-{}",
            Uuid::new_v4().simple(),
            sanitize_file_name(&upload.file_name)
        );
        tokio::fs::write(dir.join(&file_name), &upload.bytes).await?;

        let reference = format!("{}/{}", IMAGE_DIR, file_name);
        tracing::debug!(%reference, bytes = upload.bytes.len(), "stored image");
        Ok(reference)
    }

    /// Path on disk for a reference.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let path = Path::new(reference);
        let mut components = path.components();

        match components.next() {
            Some(Component::Normal(dir)) if dir == IMAGE_DIR => {}
            _ => return None,
        }
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(path)),
            _ => None,
        }
    }

    /// Remove an image. Best-effort: failures are logged, never returned.
    pub async fn clear(&self, reference: &str) {
        let Some(path) = self.resolve(reference) else {
            tracing::warn!(%reference, "refusing to clear image outside image directory");
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(%reference, "cleared image"),
            Err(err) => tracing::warn!(%reference, error = %err, "failed to clear image"),
        }
    }
}

/// Keep only the final path segment, restricted to a portable character set.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn accepts_only_png_and_jpeg() {
        assert!(is_accepted_type(&mime::IMAGE_PNG));
        assert!(is_accepted_type(&mime::IMAGE_JPEG));
        assert!(is_accepted_type(&"image/jpg".parse().unwrap()));
        assert!(!is_accepted_type(&mime::IMAGE_GIF));
        assert!(!is_accepted_type(&mime::TEXT_PLAIN));
    }

    #[test]
    fn resolves_only_direct_children_of_image_dir() {
        let store = ImageStore::new("/srv/feed", 1024);
        assert_eq!(
            store.resolve("images/a.png"),
            Some(PathBuf::from("/srv/feed/images/a.png"))
        );
        assert!(store.resolve("images").is_none());
        assert!(store.resolve("images/../secrets.txt").is_none());
        assert!(store.resolve("images/nested/a.png").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("other/a.png").is_none());
        assert!(store.resolve("").is_none());
    }

    #[test]
    fn sanitizes_client_file_names() {
        assert_eq!(sanitize_file_name("cat photo.png"), "cat_photo.png");
        assert_eq!(sanitize_file_name("../../evil.png"), "evil.png");
        assert_eq!(sanitize_file_name(".."), "image");
        assert_eq!(sanitize_file_name(""), "image");
    }

    #[tokio::test]
    async fn save_then_clear_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ImageStore::new(dir.path(), 1024);

        let reference = store.save(&upload("cat.png")).await.expect("save");
        assert!(reference.starts_with("images/"));
        assert!(reference.ends_with("-cat.png"));

        let path = store.resolve(&reference).expect("managed reference");
        assert_eq!(tokio::fs::read(&path).await.expect("read"), upload("cat.png").bytes);

        store.clear(&reference).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn clearing_a_missing_file_is_silent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ImageStore::new(dir.path(), 1024);
        store.clear("images/never-written.png").await;
        store.clear("../outside.png").await;
    }
}
