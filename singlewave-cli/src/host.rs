//! Simulated platform for the CLI.
//!
//! Answers permission queries with a fixed status chosen on the command line,
//! the way a device with that setting would.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use singlewave_core::{
    AuthorizationOptions, AuthorizationStatus, NotificationEventSource,
    NotificationPermissionProvider, PushTokenProvider, SingleWave,
};

pub struct SimulatedHost {
    status: AuthorizationStatus,
    client: OnceLock<Weak<SingleWave>>,
    token_requested: AtomicBool,
    badge_clears: AtomicUsize,
}

impl SimulatedHost {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            status,
            client: OnceLock::new(),
            token_requested: AtomicBool::new(false),
            badge_clears: AtomicUsize::new(0),
        }
    }

    /// Whether the SDK asked the platform for a device token.
    pub fn token_requested(&self) -> bool {
        self.token_requested.load(Ordering::SeqCst)
    }

    pub fn badge_clears(&self) -> usize {
        self.badge_clears.load(Ordering::SeqCst)
    }

    fn client(&self) -> Option<Arc<SingleWave>> {
        self.client.get().and_then(Weak::upgrade)
    }
}

impl NotificationPermissionProvider for SimulatedHost {
    fn query_authorization_status(&self) {
        tracing::debug!(status = %self.status, "platform answered authorization status");
        if let Some(client) = self.client() {
            client.on_authorization_status(self.status);
        }
    }

    fn request_authorization(&self, options: AuthorizationOptions) {
        let granted = matches!(
            self.status,
            AuthorizationStatus::Authorized
                | AuthorizationStatus::Provisional
                | AuthorizationStatus::Ephemeral
        );
        tracing::debug!(?options, granted, "platform answered permission prompt");
        if let Some(client) = self.client() {
            let error = (!granted).then(|| format!("authorization is {}", self.status));
            client.on_authorization_response(granted, error);
        }
    }
}

impl PushTokenProvider for SimulatedHost {
    fn register_for_remote_notifications(&self) {
        tracing::debug!("platform asked for a device token");
        self.token_requested.store(true, Ordering::SeqCst);
    }
}

impl NotificationEventSource for SimulatedHost {
    fn attach(&self, client: Arc<SingleWave>) {
        if self.client.set(Arc::downgrade(&client)).is_err() {
            tracing::warn!("simulated host is already attached to a client");
        }
    }

    fn clear_badge(&self) {
        self.badge_clears.fetch_add(1, Ordering::SeqCst);
    }
}
