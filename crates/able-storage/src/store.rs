//! Local-disk upload store.
//!
//! Resumes and certificates live under separate subdirectories of one
//! configured root. Stored names are timestamp-prefixed to avoid
//! collisions; lookups refuse anything that is not a bare filename.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

/// Upload size cap: 5 MB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Which subtree a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Certificate,
}

impl UploadKind {
    pub fn subdir(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Certificate => "certificates",
        }
    }
}

/// Store for applicant file uploads.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `UPLOAD_DIR`, defaulting to `./uploads`.
    pub fn from_env() -> Self {
        let root = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        Self::new(root)
    }

    /// Create the subtree directories.
    pub async fn init(&self) -> StorageResult<()> {
        for kind in [UploadKind::Resume, UploadKind::Certificate] {
            tokio::fs::create_dir_all(self.root.join(kind.subdir())).await?;
        }
        Ok(())
    }

    /// Validate and persist an upload. Returns the stored filename.
    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> StorageResult<String> {
        let safe = sanitize_filename(original_name)?;
        check_extension(&safe)?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(StorageError::TooLarge {
                actual: bytes.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let stored_name = format!("{}_{}", Utc::now().timestamp_millis(), safe);
        let path = self.root.join(kind.subdir()).join(&stored_name);

        tokio::fs::create_dir_all(self.root.join(kind.subdir())).await?;
        tokio::fs::write(&path, bytes).await?;

        debug!(kind = kind.subdir(), name = %stored_name, size = bytes.len(), "stored upload");
        Ok(stored_name)
    }

    /// Read a stored file back.
    pub async fn read(&self, kind: UploadKind, filename: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(kind, filename)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(filename))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored file. Failures are logged, not surfaced; used for
    /// superseded resumes where the new upload already committed.
    pub async fn remove_best_effort(&self, kind: UploadKind, filename: &str) {
        let Ok(path) = self.resolve(kind, filename) else {
            warn!(kind = kind.subdir(), name = %filename, "refusing to remove invalid filename");
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(kind = kind.subdir(), name = %filename, "failed to remove upload: {}", e);
            }
        }
    }

    /// Map a stored filename to its on-disk path, rejecting traversal.
    pub fn resolve(&self, kind: UploadKind, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(StorageError::invalid_filename(filename));
        }
        Ok(self.root.join(kind.subdir()).join(filename))
    }
}

/// Reduce an upload's client-supplied name to a safe bare filename.
fn sanitize_filename(name: &str) -> StorageResult<String> {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StorageError::invalid_filename(name))?;

    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.trim_matches(|c| c == '.' || c == '_').is_empty() {
        return Err(StorageError::invalid_filename(name));
    }
    Ok(safe)
}

fn check_extension(filename: &str) -> StorageResult<()> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(StorageError::UnsupportedType(filename.to_string()))
    }
}

/// Content type by extension. Unknown extensions download as octet-stream.
pub fn mime_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.init().await.unwrap();

        let name = store
            .save(UploadKind::Resume, "resume.pdf", b"%PDF-1.4 test")
            .await
            .unwrap();
        assert!(name.ends_with("_resume.pdf"));

        let bytes = store.read(UploadKind::Resume, &name).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn oversized_uploads_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.init().await.unwrap();

        let big = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let err = store
            .save(UploadKind::Resume, "resume.pdf", &big)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
        assert!(err.is_client_fault());
    }

    #[tokio::test]
    async fn disallowed_extensions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.init().await.unwrap();

        for name in ["malware.exe", "resume.pdf.sh", "noextension"] {
            let err = store
                .save(UploadKind::Resume, name, b"x")
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::UnsupportedType(_)), "{}", name);
        }
    }

    #[tokio::test]
    async fn traversal_is_rejected_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.init().await.unwrap();

        for name in ["../secret.pdf", "a/../../b.pdf", "dir/file.pdf", ""] {
            let err = store.read(UploadKind::Resume, name).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidFilename(_)), "{}", name);
        }
    }

    #[tokio::test]
    async fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(
            sanitize_filename("/tmp/evil/c v?.pdf").unwrap(),
            "c_v_.pdf"
        );
        assert!(sanitize_filename("...").is_err());
    }

    #[tokio::test]
    async fn remove_best_effort_is_silent_for_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.init().await.unwrap();
        store
            .remove_best_effort(UploadKind::Resume, "does-not-exist.pdf")
            .await;
    }

    #[test]
    fn mime_mapping() {
        assert_eq!(mime_for("a.pdf"), "application/pdf");
        assert_eq!(mime_for("a.doc"), "application/msword");
        assert_eq!(mime_for("weird.bin"), "application/octet-stream");
    }
}
