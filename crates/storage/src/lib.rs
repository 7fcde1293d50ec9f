#![forbid(unsafe_code)]

pub mod gateway;
pub mod memory;
pub mod session;

pub use gateway::{StorageError, StorageGateway, StorageKey};
pub use memory::MemoryGateway;
pub use session::SessionStore;
