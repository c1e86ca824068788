//! Multi-encoding copy-on-write buffers.
//!
//! This module provides the unit of data interchange between the entry codec
//! and the library store:
//! - `CowBuffer`, a shared byte block that is copied on first mutation
//! - `Encoding`, the Binary / Ansi / Ansi16 / Utf16 tag of a buffer
//! - range and encoding errors raised by in-place edits

mod cow;
mod encoding;
mod error;

pub use cow::CowBuffer;
pub use encoding::{Encoding, TERMINATOR_LEN};
pub use error::{BufferError, BufferResult};
