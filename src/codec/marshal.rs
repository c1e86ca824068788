//! Entry marshaling between a library store and [`CowBuffer`]s.
//!
//! On disk an entry payload is the comment bytes followed by the content bytes.
//! Export splits them apart and decodes both to the library's text encoding;
//! import does the reverse.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::buffer::{BufferError, CowBuffer, Encoding};
use crate::store::{LibraryHandle, LibraryStore};

use super::MAX_COMMENT_UNITS;
use super::classify::is_source_entry;
use super::entry::{DirEntry, Entry, from_unix, to_unix};
use super::error::{CodecError, CodecResult};

/// Reads, writes, deletes and lists entries of the libraries in a store.
pub struct EntryCodec {
    store: Arc<dyn LibraryStore>,
}

impl EntryCodec {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    fn open(&self, library: &str, read_write: bool) -> CodecResult<Box<dyn LibraryHandle>> {
        self.store.open(library, read_write).ok_or_else(|| {
            tracing::debug!(library, read_write, "Failed to open library");
            CodecError::Open(library.to_string())
        })
    }

    /// Read `entry` from `library` and decode it.
    ///
    /// The comment is always decoded to the library's text encoding; the data
    /// only when the entry is a source entry.
    pub fn export_entry(&self, library: &str, entry: &str) -> CodecResult<Entry> {
        tracing::trace!(library, entry, "Exporting entry");
        let mut handle = self.open(library, false)?;
        let info = handle.seek_entry(entry, false).ok_or_else(|| {
            tracing::debug!(library, entry, "Entry not found");
            CodecError::EntryNotFound(entry.to_string())
        })?;
        tracing::trace!(
            entry,
            comment_len = info.comment_len,
            content_len = info.content_len(),
            "Found entry"
        );

        let is_unicode = handle.is_unicode();
        let mut comment = CowBuffer::with_size(Encoding::Binary, info.comment_len);
        let mut data = CowBuffer::with_size(Encoding::Binary, info.data_len);
        handle.read_entry_data(&info, data.bytes_mut()).map_err(|source| {
            tracing::debug!(library, entry, error = %source, "Failed to read entry data");
            CodecError::Read { entry: entry.to_string(), source }
        })?;

        if info.comment_len > 0 {
            let prefix = data.bytes().get(..info.comment_len).ok_or(BufferError::OutOfRange {
                offset: 0,
                count: info.comment_len,
                size: data.size(),
            })?;
            comment.bytes_mut().copy_from_slice(prefix);
            data.erase(0, info.comment_len)?;
        }

        let text = Encoding::text(is_unicode);
        comment.convert(text);
        if is_source_entry(entry) {
            data.convert(text);
        }

        Ok(Entry { mod_time: from_unix(info.mod_time), is_unicode, comment, data })
    }

    /// Encode `data` and `comment` and write them as `entry` of `library`.
    ///
    /// A buffer without storage stands for an absent value. The caller's
    /// buffers are never modified.
    pub fn import_entry(
        &self,
        library: &str,
        entry: &str,
        mut data: CowBuffer,
        mut comment: CowBuffer,
        mod_time: Option<DateTime<Utc>>,
    ) -> CodecResult<()> {
        tracing::trace!(library, entry, "Importing entry");
        let mut handle = self.open(library, true)?;
        let mut info = handle.seek_entry(entry, true).ok_or_else(|| {
            tracing::debug!(library, entry, "Failed to create entry");
            CodecError::EntryCreate(entry.to_string())
        })?;

        let text = Encoding::text(handle.is_unicode());
        if !comment.is_allocated() {
            comment.allocate(Encoding::Binary, 0);
        } else {
            if comment.size() > MAX_COMMENT_UNITS {
                return Err(CodecError::CommentTooLong(comment.size()));
            }
            comment.convert(text);
            comment.convert(Encoding::Binary);
        }

        if !data.is_allocated() {
            data.allocate(Encoding::Binary, 0);
        } else if is_source_entry(entry) {
            data.convert(text);
            data.convert(Encoding::Binary);
        } else {
            data.convert(Encoding::Binary);
        }

        data.insert(0, &comment, 0, comment.size())?;
        let comment_len = comment.size();
        let content_len = data.size() - comment_len;
        info.mod_time = to_unix(mod_time);

        handle.update_entry_data(&info, data.bytes(), content_len, comment_len).map_err(
            |source| {
                tracing::debug!(library, entry, error = %source, "Failed to write entry data");
                CodecError::Write { entry: entry.to_string(), source }
            },
        )?;
        tracing::debug!(library, entry, comment_len, content_len, "Imported entry");
        Ok(())
    }

    pub fn delete_entry(&self, library: &str, entry: &str) -> CodecResult<()> {
        tracing::trace!(library, entry, "Deleting entry");
        let mut handle = self.open(library, true)?;
        let info = handle.seek_entry(entry, false).ok_or_else(|| {
            tracing::debug!(library, entry, "Entry not found");
            CodecError::EntryNotFound(entry.to_string())
        })?;
        handle.delete_entry(&info).map_err(|source| {
            tracing::debug!(library, entry, error = %source, "Failed to delete entry");
            CodecError::Delete { entry: entry.to_string(), source }
        })
    }

    /// Walk the entries of `library` in store order until `visitor` returns false.
    pub fn list_entries<F>(&self, library: &str, mut visitor: F) -> CodecResult<()>
    where
        F: FnMut(DirEntry) -> bool,
    {
        tracing::trace!(library, "Listing entries");
        let mut handle = self.open(library, false)?;
        let encoding = Encoding::text(handle.is_unicode());
        handle.enumerate(&mut |name: &[u8], mod_time: i64| {
            visitor(DirEntry {
                name: CowBuffer::from_terminated(encoding, name),
                mod_time: from_unix(mod_time),
            })
        });
        Ok(())
    }

    /// Every entry of `library`.
    pub fn entries(&self, library: &str) -> CodecResult<Vec<DirEntry>> {
        let mut entries = Vec::new();
        self.list_entries(library, |entry| {
            entries.push(entry);
            true
        })?;
        Ok(entries)
    }
}
