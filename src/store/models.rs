use serde::{Deserialize, Serialize};

/// Position and sizes of an entry as reported by a library seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Modification time in unix seconds.
    pub mod_time: i64,
    /// Bytes of comment at the start of the payload.
    pub comment_len: usize,
    /// Bytes of payload, comment included.
    pub data_len: usize,
}

impl EntryInfo {
    /// Bytes of payload after the comment.
    pub fn content_len(&self) -> usize {
        self.data_len.saturating_sub(self.comment_len)
    }
}
