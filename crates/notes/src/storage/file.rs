//! File-system note store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::NoteStore;
use crate::errors::{SyncError, SyncResult};

/// Writes notes under one configured folder, creating it on first use.
pub struct FileNoteStore {
    folder: PathBuf,
}

impl FileNoteStore {
    #[must_use]
    pub fn new(folder: impl AsRef<Path>) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
        }
    }

    /// Make sure the folder exists and actually is one. A plain file sitting
    /// at the configured path is a fatal conflict, not something to overwrite.
    async fn ensure_folder(&self) -> SyncResult<()> {
        match fs::metadata(&self.folder).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(SyncError::NotAFolder {
                path: self.folder.display().to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.folder)
                    .await
                    .map_err(|e| SyncError::CreateFolder {
                        path: self.folder.display().to_string(),
                        reason: e.to_string(),
                    })
            }
            Err(e) => Err(SyncError::CreateFolder {
                path: self.folder.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl NoteStore for FileNoteStore {
    async fn write_note(&self, name: &str, content: &str) -> SyncResult<()> {
        self.ensure_folder().await?;

        let path = self.folder.join(name);
        fs::write(&path, content)
            .await
            .map_err(|e| SyncError::WriteNote {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), bytes = content.len(), "note written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_folder_and_note() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileNoteStore::new(temp_dir.path().join("notes"));

        store.write_note("daily.md", "- [ ] Water the plants").await.unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("notes/daily.md")).unwrap();
        assert_eq!(content, "- [ ] Water the plants");
    }

    #[tokio::test]
    async fn overwrites_existing_note_completely() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileNoteStore::new(temp_dir.path());

        store.write_note("todo.md", "old content, edited by hand").await.unwrap();
        store.write_note("todo.md", "new").await.unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("todo.md")).unwrap();
        assert_eq!(content, "new");
    }

    #[tokio::test]
    async fn conflicting_file_at_folder_path_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let occupied = temp_dir.path().join("notes");
        std::fs::write(&occupied, "not a folder").unwrap();

        let store = FileNoteStore::new(&occupied);
        let err = store.write_note("daily.md", "content").await.unwrap_err();

        assert!(matches!(err, SyncError::NotAFolder { .. }));
    }
}
