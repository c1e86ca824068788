use anyhow::Result;
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use super::models::EntryInfo;

/// Entry point into a library storage engine.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait LibraryStore: Send + Sync {
    /// Open `library`, or `None` when it is missing or invalid.
    ///
    /// The library is closed when the returned handle is dropped.
    fn open(&self, library: &str, read_write: bool) -> Option<Box<dyn LibraryHandle>>;
}

/// An open library.
pub trait LibraryHandle {
    /// Whether comments and source content are stored as 16-bit text.
    fn is_unicode(&self) -> bool;

    /// Locate `name`, creating an empty entry first when `create` is set.
    fn seek_entry(&mut self, name: &str, create: bool) -> Option<EntryInfo>;

    /// Copy the `info.data_len` payload bytes of the entry into `out`.
    fn read_entry_data(&mut self, info: &EntryInfo, out: &mut [u8]) -> Result<()>;

    /// Replace the entry payload with `data`, which holds `comment_len` comment
    /// bytes followed by `content_len` content bytes.
    fn update_entry_data(
        &mut self,
        info: &EntryInfo,
        data: &[u8],
        content_len: usize,
        comment_len: usize,
    ) -> Result<()>;

    fn delete_entry(&mut self, info: &EntryInfo) -> Result<()>;

    /// Call `visitor` with the raw name bytes and modification time of every
    /// entry until it returns false.
    fn enumerate(&mut self, visitor: &mut dyn FnMut(&[u8], i64) -> bool);
}
