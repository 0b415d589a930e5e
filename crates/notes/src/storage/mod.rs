//! Note artifact storage.

mod file;

pub use file::FileNoteStore;

use async_trait::async_trait;

use crate::errors::SyncResult;

/// Storage interface for note artifacts. Writes are whole-file overwrites;
/// there is no merging with existing content.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Replace the named note's contents, creating it if absent.
    async fn write_note(&self, name: &str, content: &str) -> SyncResult<()>;
}
