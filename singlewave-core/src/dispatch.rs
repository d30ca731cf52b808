//! Delivery of backend calls, with the optional durable outbox.
//!
//! Without the outbox every call is a single fire-and-forget attempt and a
//! failure is only logged. With it, calls that fail transiently are appended
//! to the store and re-sent before the next call or on an explicit flush.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::backend::{BackendClient, RegistrationRequest};
use crate::error::SingleWaveError;
use crate::logger::sdk_log;
use crate::storage::{KeyValueStore, StoreError, StoreResult};
use crate::tracker::NotificationEventRef;

/// Store key holding the outbox as a JSON array.
pub const PENDING_REQUESTS_KEY: &str = "__swSDKPendingRequests";

/// Maximum number of open-tracking calls kept in the outbox.
pub const MAX_PENDING_OPENS: usize = 100;

/// A backend call that can be queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingCall {
    /// `POST /v1/subscribers/register`
    Register(RegistrationRequest),
    /// `POST /v1/subscribers/open`
    TrackOpen(NotificationEventRef),
}

/// Appends `call`, keeping only the newest registration and at most
/// [`MAX_PENDING_OPENS`] opens.
pub fn enqueue(queue: &mut Vec<PendingCall>, call: PendingCall) {
    if matches!(call, PendingCall::Register(_)) {
        queue.retain(|pending| !matches!(pending, PendingCall::Register(_)));
    }
    queue.push(call);

    let opens = queue
        .iter()
        .filter(|pending| matches!(pending, PendingCall::TrackOpen(_)))
        .count();
    let mut excess = opens.saturating_sub(MAX_PENDING_OPENS);
    queue.retain(|pending| {
        if excess > 0 && matches!(pending, PendingCall::TrackOpen(_)) {
            excess -= 1;
            return false;
        }
        true
    });
}

/// Reads the outbox. A missing key is an empty outbox.
///
/// # Errors
///
/// Returns an error if the read fails or the stored value does not decode.
pub fn load_pending(store: &dyn KeyValueStore) -> StoreResult<Vec<PendingCall>> {
    match store.get(PENDING_REQUESTS_KEY.to_string())? {
        Some(raw) => serde_json::from_str(&raw).map_err(StoreError::from),
        None => Ok(Vec::new()),
    }
}

/// Replaces the outbox. An empty queue removes the key.
///
/// # Errors
///
/// Returns an error if encoding or the store write fails.
pub fn save_pending(store: &dyn KeyValueStore, queue: &[PendingCall]) -> StoreResult<()> {
    if queue.is_empty() {
        return store.remove(PENDING_REQUESTS_KEY.to_string());
    }
    let raw = serde_json::to_string(queue)?;
    store.set(PENDING_REQUESTS_KEY.to_string(), raw)
}

/// Sends backend calls and owns the outbox.
pub struct Dispatcher {
    backend: BackendClient,
    store: Arc<dyn KeyValueStore>,
    durable: bool,
    debug: bool,
    /// Serializes every read-modify-write of the outbox.
    outbox: Mutex<()>,
}

impl Dispatcher {
    pub(crate) fn new(
        backend: BackendClient,
        store: Arc<dyn KeyValueStore>,
        durable: bool,
        debug: bool,
    ) -> Self {
        Self {
            backend,
            store,
            durable,
            debug,
            outbox: Mutex::new(()),
        }
    }

    /// Sends `call`. Never fails: errors are logged and, with the outbox on,
    /// transient failures are queued.
    ///
    /// With the outbox on, the whole send (flush, attempt, queue update) runs
    /// under the outbox lock, and a delivered registration drops every queued
    /// one so an older registration is never re-sent after it.
    pub async fn send(&self, call: PendingCall) {
        if !self.durable {
            if let Err(error) = self.attempt(&call).await {
                sdk_log!(self.debug, "backend call failed: {error}");
            }
            return;
        }

        let _guard = self.outbox.lock().await;
        let mut queue = self.flush_locked().await;

        match self.attempt(&call).await {
            Ok(()) => {
                if matches!(call, PendingCall::Register(_)) {
                    queue.retain(|pending| !matches!(pending, PendingCall::Register(_)));
                }
            }
            Err(error) => {
                sdk_log!(self.debug, "backend call failed: {error}");
                if error.is_transient() {
                    enqueue(&mut queue, call);
                }
            }
        }
        self.persist(&queue);
    }

    /// Re-sends queued calls in order and returns how many remain.
    ///
    /// Stops at the first transient failure so ordering is preserved. Calls
    /// rejected permanently (4xx) are dropped.
    pub async fn flush(&self) -> u64 {
        let _guard = self.outbox.lock().await;
        let kept = self.flush_locked().await;
        self.persist(&kept);
        kept.len() as u64
    }

    /// Caller holds the outbox lock. Returns the calls still pending, which
    /// the caller persists.
    async fn flush_locked(&self) -> Vec<PendingCall> {
        let queue = match load_pending(self.store.as_ref()) {
            Ok(queue) => queue,
            Err(e) => {
                log::warn!("discarding unreadable outbox: {e}");
                return Vec::new();
            }
        };
        if queue.is_empty() {
            return queue;
        }
        sdk_log!(self.debug, "flushing {} pending backend call(s)", queue.len());

        let mut remaining = queue.into_iter();
        let mut kept = Vec::new();
        for call in remaining.by_ref() {
            match self.attempt(&call).await {
                Ok(()) => {}
                Err(error) if error.is_transient() => {
                    sdk_log!(self.debug, "outbox flush interrupted: {error}");
                    kept.push(call);
                    break;
                }
                Err(error) => {
                    log::warn!("dropping pending backend call rejected by server: {error}");
                }
            }
        }
        kept.extend(remaining);
        kept
    }

    fn persist(&self, queue: &[PendingCall]) {
        if let Err(e) = save_pending(self.store.as_ref(), queue) {
            log::warn!("could not update outbox: {e}");
        }
    }

    /// Number of queued calls, or zero when the outbox cannot be read.
    #[must_use]
    pub fn pending_count(&self) -> u64 {
        load_pending(self.store.as_ref()).map_or(0, |queue| queue.len() as u64)
    }

    async fn attempt(&self, call: &PendingCall) -> Result<(), SingleWaveError> {
        let response = match call {
            PendingCall::Register(request) => {
                sdk_log!(self.debug, "sending registration to SingleWave backend");
                self.backend.register(request).await?
            }
            PendingCall::TrackOpen(event) => {
                sdk_log!(self.debug, "sending track open to SingleWave backend");
                self.backend.track_open(event).await?
            }
        };
        if let Some(json) = response {
            sdk_log!(self.debug, "backend response: {json}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn register(token: &str) -> PendingCall {
        PendingCall::Register(RegistrationRequest {
            language: "en".to_string(),
            project_hash: "proj".to_string(),
            platform: "mobile-ios".to_string(),
            token: token.to_string(),
            data: "{}".to_string(),
        })
    }

    fn open(n: usize) -> PendingCall {
        PendingCall::TrackOpen(NotificationEventRef {
            notification_hash: format!("n{n}"),
            open_hash: format!("o{n}"),
            control_hash: format!("c{n}"),
        })
    }

    #[test]
    fn test_newer_registration_supersedes() {
        let mut queue = Vec::new();
        enqueue(&mut queue, register("aa"));
        enqueue(&mut queue, open(1));
        enqueue(&mut queue, register("bb"));

        assert_eq!(queue, vec![open(1), register("bb")]);
    }

    #[test]
    fn test_opens_are_capped_oldest_first() {
        let mut queue = vec![register("aa")];
        for n in 0..=MAX_PENDING_OPENS {
            enqueue(&mut queue, open(n));
        }

        assert_eq!(queue.len(), MAX_PENDING_OPENS + 1);
        assert_eq!(queue[0], register("aa"));
        assert_eq!(queue[1], open(1));
        assert_eq!(queue.last(), Some(&open(MAX_PENDING_OPENS)));
    }

    #[test]
    fn test_outbox_persistence() {
        let store = MemoryStore::new();
        assert!(load_pending(&store).unwrap().is_empty());

        let queue = vec![register("aa"), open(1)];
        save_pending(&store, &queue).unwrap();
        assert_eq!(load_pending(&store).unwrap(), queue);

        save_pending(&store, &[]).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_pending_call_wire_format() {
        let json = serde_json::to_value(open(3)).unwrap();
        assert_eq!(json["kind"], "track_open");
        assert_eq!(json["notification_hash"], "n3");
    }
}
