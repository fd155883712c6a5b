//! On-disk storage for achievement attachments.
//!
//! Files live under `<upload root>/<document id>/` and are served read-only by
//! the `/uploads` route.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Largest single attachment accepted.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub path: PathBuf,
    /// Public URL, `/uploads/<document id>/<stored name>`.
    pub url: String,
}

/// Reduces a client-supplied file name to its last path component and
/// replaces anything outside `[A-Za-z0-9._-]` with `_`.
///
/// Returns `None` for names that are empty or only dots after cleaning.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

/// Writes one attachment. An existing file with the same name is kept and the
/// new one gets a short random prefix.
pub async fn save_attachment(
    root: &Path,
    document_id: &str,
    file_name: &str,
    bytes: &[u8],
) -> std::io::Result<StoredFile> {
    let dir = root.join(document_id);
    fs::create_dir_all(&dir).await?;

    let mut stored_name = file_name.to_string();
    if fs::try_exists(dir.join(&stored_name)).await? {
        let prefix = Uuid::new_v4().simple().to_string();
        stored_name = format!("{}_{}", &prefix[..8], file_name);
    }

    let path = dir.join(&stored_name);
    let mut file = fs::File::create(&path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;

    Ok(StoredFile {
        url: format!("/uploads/{document_id}/{stored_name}"),
        path,
    })
}

/// Best-effort cleanup of files written for a request that failed afterwards.
pub async fn discard(files: &[StoredFile]) {
    for file in files {
        if let Err(err) = fs::remove_file(&file.path).await {
            tracing::warn!(path = %file.path.display(), error = %err, "Failed to remove orphaned upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn path_components_are_stripped() {
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("C:\\Users\\me\\cert.pdf").as_deref(), Some("cert.pdf"));
        assert_eq!(sanitize_file_name("my award (final).png").as_deref(), Some("my_award__final_.png"));
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("dir/"), None);
    }

    #[tokio::test]
    async fn duplicate_names_do_not_overwrite() {
        let root = tempdir().unwrap();
        let first = save_attachment(root.path(), "doc1", "a.txt", b"one").await.unwrap();
        let second = save_attachment(root.path(), "doc1", "a.txt", b"two").await.unwrap();

        assert_eq!(first.url, "/uploads/doc1/a.txt");
        assert_ne!(first.path, second.path);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"two");

        discard(&[first.clone(), second]).await;
        assert!(!first.path.exists());
    }
}
