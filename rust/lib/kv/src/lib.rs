//! Durable key-value storage for client-side state.
//!
//! `RedbStore` persists to a single file on disk; `MemoryStore` keeps
//! everything in process and can enforce a byte quota, which is how
//! browser-style local storage behaves.

pub mod error;
pub mod memory;
pub mod redb;
pub mod traits;

pub use error::KVError;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use traits::KVStore;
