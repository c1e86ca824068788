use thiserror::Error;

use super::Encoding;

pub type BufferResult<T> = Result<T, BufferError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Range out of bounds: offset {offset} + count {count} exceeds size {size}")]
    OutOfRange { offset: usize, count: usize, size: usize },

    #[error("Encoding mismatch: cannot copy {source_encoding} units into {target} buffer")]
    EncodingMismatch { source_encoding: Encoding, target: Encoding },
}
