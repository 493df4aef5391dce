//! Reload-Durable Store
//!
//! A small string key-value port that outlives a single run of the client,
//! playing the part browser local storage plays for a web front end.
//!
//! - **memory**: In-process map, used by tests and ephemeral sessions
//! - **file**: JSON file on disk, the CLI default
//! - **timer_store**: Timer persistence (`timeIn`, `isTracking`, `elapsedTime`,
//!   `pendingEntry`) layered over any [`KeyValueStore`]
//!
//! Writes are last-write-wins. Nothing coordinates two processes sharing the
//! same file.

pub mod error;
pub mod file;
pub mod memory;
pub mod timer_store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use timer_store::TimerStore;

/// Key holding the bearer token used for backend calls
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// String key-value persistence port
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;
}
