pub mod memory;
pub mod models;
pub mod traits;

pub use memory::{MemoryLibrary, MemoryStore};
pub use models::EntryInfo;
#[cfg(any(test, feature = "mockall"))]
pub use traits::MockLibraryStore;
pub use traits::{LibraryHandle, LibraryStore};
