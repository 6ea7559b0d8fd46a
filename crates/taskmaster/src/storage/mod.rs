//! Storage layer for the session task list.

mod memory;
mod traits;

pub use memory::MemoryStorage;
pub use traits::Storage;
