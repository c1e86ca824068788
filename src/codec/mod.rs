//! Entry marshaling module.
//!
//! Splits and joins the comment and content regions of library entries and
//! transcodes them between the stored bytes and host-visible text:
//! - export, import, delete and list through [`EntryCodec`]
//! - source entry detection from the entry name
//! - error kinds surfaced to callers

mod classify;
mod entry;
mod error;
mod marshal;

pub use classify::{is_source_entry, is_source_entry_wide};
pub use entry::{DirEntry, Entry};
pub use error::{CodecError, CodecResult, ErrorKind};
pub use marshal::EntryCodec;

/// Longest comment accepted on import, in code units.
pub const MAX_COMMENT_UNITS: usize = 32767;
