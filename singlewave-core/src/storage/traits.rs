//! Platform interface for durable local state.

use super::error::StoreResult;

/// Durable string key-value store provided by the host platform.
///
/// On iOS this is expected to be backed by `UserDefaults.standard`, on
/// Android by `SharedPreferences`. Values are opaque strings to the store;
/// structured values are JSON-encoded by the SDK before they get here.
///
/// Writes are last-write-wins. The SDK never needs transactions across keys.
#[uniffi::export(with_foreign)]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails. A missing key is `Ok(None)`.
    fn get(&self, key: String) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, key: String, value: String) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for actual backend failures.
    fn remove(&self, key: String) -> StoreResult<()>;
}
