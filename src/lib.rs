//! Typed access to the entries of library containers.
//!
//! Entries are exchanged as [`buffer::CowBuffer`]s, copy-on-write byte buffers
//! tagged as Binary, Ansi or UTF-16 content. [`codec::EntryCodec`] marshals
//! entries between those buffers and a [`store::LibraryStore`].

pub mod buffer;
pub mod codec;
pub mod config;
pub mod store;

pub use buffer::{CowBuffer, Encoding};
pub use codec::{DirEntry, Entry, EntryCodec};
