use thiserror::Error;

use crate::buffer::BufferError;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Missing or invalid library: {0}")]
    Open(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Entry could not be created: {0}")]
    EntryCreate(String),

    #[error("Read entry failed: {entry}")]
    Read {
        entry: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Entry could not be written: {entry}")]
    Write {
        entry: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Entry could not be deleted: {entry}")]
    Delete {
        entry: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Comment too long: {0} units (max 32767)")]
    CommentTooLong(usize),

    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),
}

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Open,
    EntryNotFound,
    EntryCreate,
    Read,
    Write,
    Delete,
    Validation,
    Range,
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Open(_) => ErrorKind::Open,
            CodecError::EntryNotFound(_) => ErrorKind::EntryNotFound,
            CodecError::EntryCreate(_) => ErrorKind::EntryCreate,
            CodecError::Read { .. } => ErrorKind::Read,
            CodecError::Write { .. } => ErrorKind::Write,
            CodecError::Delete { .. } => ErrorKind::Delete,
            CodecError::CommentTooLong(_) => ErrorKind::Validation,
            CodecError::Buffer(BufferError::OutOfRange { .. }) => ErrorKind::Range,
            CodecError::Buffer(BufferError::EncodingMismatch { .. }) => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_open_error() {
        let err = CodecError::Open("app.pbl".to_string());
        assert_eq!(err.to_string(), "Missing or invalid library: app.pbl");
        assert_eq!(err.kind(), ErrorKind::Open);
    }

    #[test]
    fn test_entry_not_found_error() {
        let err = CodecError::EntryNotFound("w_main.srw".to_string());
        assert_eq!(err.to_string(), "Entry not found: w_main.srw");
        assert_eq!(err.kind(), ErrorKind::EntryNotFound);
    }

    #[test]
    fn test_entry_create_error() {
        let err = CodecError::EntryCreate("w_main.srw".to_string());
        assert_eq!(err.to_string(), "Entry could not be created: w_main.srw");
        assert_eq!(err.kind(), ErrorKind::EntryCreate);
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = CodecError::Read {
            entry: "w_main.srw".to_string(),
            source: anyhow::anyhow!("disk on fire"),
        };
        assert_eq!(err.to_string(), "Read entry failed: w_main.srw");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk on fire"));
        assert_eq!(err.kind(), ErrorKind::Read);
    }

    #[test]
    fn test_write_and_delete_kinds() {
        let write = CodecError::Write { entry: "a".to_string(), source: anyhow::anyhow!("x") };
        let delete = CodecError::Delete { entry: "a".to_string(), source: anyhow::anyhow!("x") };
        assert_eq!(write.to_string(), "Entry could not be written: a");
        assert_eq!(delete.to_string(), "Entry could not be deleted: a");
        assert_eq!(write.kind(), ErrorKind::Write);
        assert_eq!(delete.kind(), ErrorKind::Delete);
    }

    #[test]
    fn test_comment_too_long_error() {
        let err = CodecError::CommentTooLong(32768);
        assert_eq!(err.to_string(), "Comment too long: 32768 units (max 32767)");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_buffer_error_is_range() {
        let err: CodecError = BufferError::OutOfRange { offset: 0, count: 9, size: 4 }.into();
        assert_eq!(err.kind(), ErrorKind::Range);
    }
}
