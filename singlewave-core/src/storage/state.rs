//! Registration state persisted between launches.
//!
//! Two independent slots, each written whenever the matching session field
//! changes and read once at startup. There is no schema version and no merge.

use std::collections::BTreeMap;

use super::{KeyValueStore, StoreError, StoreResult};

/// Store key holding the custom-data mapping as a JSON object.
pub const USER_DATA_KEY: &str = "__swSDKUserData";

/// Store key holding the hex-encoded device token.
pub const DEVICE_TOKEN_KEY: &str = "__swSDKDeviceToken";

/// Snapshot of everything restored from the store at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    /// Last device token seen, if any.
    pub device_token: Option<String>,
    /// Last custom data set by the host.
    pub custom_data: BTreeMap<String, String>,
}

impl PersistedState {
    /// Loads both slots. A slot that cannot be read or decoded falls back to
    /// its default, so a damaged store never prevents startup.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let device_token = load_device_token(store).unwrap_or_else(|e| {
            log::warn!("could not restore device token, starting without one: {e}");
            None
        });
        let custom_data = load_custom_data(store).unwrap_or_else(|e| {
            log::warn!("could not restore custom data, starting empty: {e}");
            BTreeMap::new()
        });
        Self {
            device_token,
            custom_data,
        }
    }
}

/// Reads the persisted device token.
///
/// # Errors
///
/// Returns an error if the store read fails.
pub fn load_device_token(store: &dyn KeyValueStore) -> StoreResult<Option<String>> {
    store.get(DEVICE_TOKEN_KEY.to_string())
}

/// Persists the device token.
///
/// # Errors
///
/// Returns an error if the store write fails.
pub fn save_device_token(store: &dyn KeyValueStore, token: &str) -> StoreResult<()> {
    store.set(DEVICE_TOKEN_KEY.to_string(), token.to_string())
}

/// Reads the persisted custom data.
///
/// # Errors
///
/// Returns an error if the store read fails or the value is not a JSON
/// object of strings.
pub fn load_custom_data(store: &dyn KeyValueStore) -> StoreResult<BTreeMap<String, String>> {
    match store.get(USER_DATA_KEY.to_string())? {
        Some(raw) => serde_json::from_str(&raw).map_err(StoreError::from),
        None => Ok(BTreeMap::new()),
    }
}

/// Persists the custom data, replacing whatever was stored before.
///
/// # Errors
///
/// Returns an error if encoding or the store write fails.
pub fn save_custom_data(
    store: &dyn KeyValueStore,
    custom_data: &BTreeMap<String, String>,
) -> StoreResult<()> {
    let raw = serde_json::to_string(custom_data)?;
    store.set(USER_DATA_KEY.to_string(), raw)
}
