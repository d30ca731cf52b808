//! Persistent store: the host's key-value store and the SDK state kept in it.

pub mod error;
pub mod memory;
pub mod state;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use state::PersistedState;
pub use traits::KeyValueStore;
