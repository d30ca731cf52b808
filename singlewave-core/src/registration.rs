//! Subscriber registration state and flow.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::RegistrationRequest;
use crate::config::{CustomDataEncoding, ReregistrationPolicy};
use crate::dispatch::{Dispatcher, PendingCall};
use crate::logger::sdk_log;
use crate::storage::{state, KeyValueStore, PersistedState};

/// Mutable registration state of one SDK handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Tenant identifier, fixed for the life of the handle.
    pub project_id: String,
    /// Hex device token; empty until known.
    pub device_token: String,
    /// Host-supplied subscriber attributes.
    pub custom_data: BTreeMap<String, String>,
    /// Whether SDK diagnostics are logged.
    pub debug: bool,
}

impl Session {
    /// Seeds a session from restored state.
    #[must_use]
    pub fn restore(project_id: &str, debug: bool, persisted: PersistedState) -> Self {
        Self {
            project_id: project_id.to_string(),
            device_token: persisted.device_token.unwrap_or_default(),
            custom_data: persisted.custom_data,
            debug,
        }
    }
}

/// Owns the [`Session`] and keeps the store and the backend in step with it.
///
/// Every mutation (update field, persist, snapshot request) happens under one
/// lock, so a token update racing a custom-data update cannot produce a
/// request mixing half of each. The network call happens after the lock is
/// released.
pub struct RegistrationManager {
    session: Mutex<Session>,
    store: Arc<dyn KeyValueStore>,
    dispatcher: Arc<Dispatcher>,
    language: Option<String>,
    policy: ReregistrationPolicy,
    encoding: CustomDataEncoding,
}

impl RegistrationManager {
    pub(crate) fn new(
        session: Session,
        store: Arc<dyn KeyValueStore>,
        dispatcher: Arc<Dispatcher>,
        language: Option<String>,
        policy: ReregistrationPolicy,
        encoding: CustomDataEncoding,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            store,
            dispatcher,
            language,
            policy,
            encoding,
        }
    }

    /// A copy of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.lock().clone()
    }

    /// Stores a new device token and registers it.
    pub async fn received_new_device_token(&self, token: String) {
        let request = {
            let mut session = self.lock();
            sdk_log!(session.debug, "received new token, uploading to SingleWave: {token}");
            let changed = session.device_token != token;
            session.device_token = token;
            if let Err(e) = state::save_device_token(self.store.as_ref(), &session.device_token) {
                log::warn!("could not persist device token: {e}");
            }
            self.request_if_needed(&session, changed)
        };

        if let Some(request) = request {
            self.dispatcher.send(PendingCall::Register(request)).await;
        }
    }

    /// Replaces the custom data wholesale and registers it.
    pub async fn set_custom_data(&self, custom_data: BTreeMap<String, String>) {
        let request = {
            let mut session = self.lock();
            let changed = session.custom_data != custom_data;
            session.custom_data = custom_data;
            if let Err(e) = state::save_custom_data(self.store.as_ref(), &session.custom_data) {
                log::warn!("could not persist custom data: {e}");
            }
            self.request_if_needed(&session, changed)
        };

        if let Some(request) = request {
            self.dispatcher.send(PendingCall::Register(request)).await;
        }
    }

    /// Sends the current session to the backend.
    pub async fn register_on_backend(&self) {
        let request = self.build_request(&self.lock());
        self.dispatcher.send(PendingCall::Register(request)).await;
    }

    fn request_if_needed(&self, session: &Session, changed: bool) -> Option<RegistrationRequest> {
        if !changed && self.policy == ReregistrationPolicy::OnChange {
            sdk_log!(session.debug, "registration unchanged, skipping backend update");
            return None;
        }
        Some(self.build_request(session))
    }

    fn build_request(&self, session: &Session) -> RegistrationRequest {
        RegistrationRequest::new(
            self.language.as_deref(),
            &session.project_id,
            &session.device_token,
            &session.custom_data,
            self.encoding,
        )
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
