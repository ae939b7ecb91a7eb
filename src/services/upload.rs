use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Writes and deletes uploaded image files under a fixed directory.
///
/// Filenames arrive from clients; [`sanitize_file_name`] strips any path
/// components before the name ever touches the filesystem.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Writes the bytes under the sanitized filename, overwriting any
    /// existing file of the same name. Returns the name actually used.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let clean = sanitize_file_name(file_name)
            .ok_or_else(|| anyhow::anyhow!("Invalid filename: {file_name:?}"))?;

        if !self.root.exists() {
            fs::create_dir_all(&self.root).await?;
        }

        let file_path = self.root.join(&clean);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write upload to {}", file_path.display()))?;

        info!(path = %file_path.display(), "Stored upload");

        Ok(clean)
    }

    /// Deletes the named file. A file that is already gone is not an error.
    pub async fn delete(&self, file_name: &str) -> Result<()> {
        let clean = sanitize_file_name(file_name)
            .ok_or_else(|| anyhow::anyhow!("Invalid filename: {file_name:?}"))?;

        let file_path = self.root.join(&clean);

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to delete {}", file_path.display()))
            }
        }
    }
}

/// Reduces a client-supplied filename to its final path component.
///
/// Returns `None` for names that are empty or resolve to no usable
/// component (`.`, `..`, a bare directory). This is the only defense
/// between the upload form and the filesystem.
#[must_use]
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let candidate = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();

    if candidate.is_empty() || candidate == "." || candidate == ".." {
        return None;
    }

    // Path::file_name rejects anything that still smells like traversal.
    Path::new(candidate)
        .file_name()
        .and_then(|n| n.to_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_names() {
        assert_eq!(sanitize_file_name("photo.jpg"), Some("photo.jpg".to_string()));
        assert_eq!(
            sanitize_file_name("my recipe (1).png"),
            Some("my recipe (1).png".to_string())
        );
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(
            sanitize_file_name("/etc/passwd"),
            Some("passwd".to_string())
        );
        assert_eq!(
            sanitize_file_name("..\\..\\windows\\system32\\cmd.exe"),
            Some("cmd.exe".to_string())
        );
        assert_eq!(
            sanitize_file_name("a/b/c/photo.jpg"),
            Some("photo.jpg".to_string())
        );
    }

    #[test]
    fn test_sanitize_rejects_traversal_and_empty() {
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name("   "), None);
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("."), None);
        assert_eq!(sanitize_file_name("a/b/"), None);
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let stored = store.save("../sneaky.jpg", b"bytes").await.unwrap();
        assert_eq!(stored, "sneaky.jpg");
        assert!(dir.path().join("sneaky.jpg").exists());

        store.delete(&stored).await.unwrap();
        assert!(!dir.path().join("sneaky.jpg").exists());

        // deleting again is fine
        store.delete(&stored).await.unwrap();
    }
}
