//! Common test utilities shared across integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use singlewave_core::storage::MemoryStore;
use singlewave_core::{
    AuthorizationOptions, LaunchContext, NotificationEventSource, NotificationPermissionProvider,
    PushTokenProvider, SdkConfig, SingleWave,
};

/// Host double recording every call the SDK makes into the platform.
#[derive(Default)]
pub struct RecordingHost {
    pub status_queries: AtomicUsize,
    pub authorization_requests: Mutex<Vec<AuthorizationOptions>>,
    pub token_requests: AtomicUsize,
    pub badge_clears: AtomicUsize,
    pub attached: Mutex<Vec<Weak<SingleWave>>>,
}

impl RecordingHost {
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn badge_clears(&self) -> usize {
        self.badge_clears.load(Ordering::SeqCst)
    }
}

impl NotificationPermissionProvider for RecordingHost {
    fn query_authorization_status(&self) {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
    }

    fn request_authorization(&self, options: AuthorizationOptions) {
        self.authorization_requests.lock().unwrap().push(options);
    }
}

impl PushTokenProvider for RecordingHost {
    fn register_for_remote_notifications(&self) {
        self.token_requests.fetch_add(1, Ordering::SeqCst);
    }
}

impl NotificationEventSource for RecordingHost {
    fn attach(&self, client: Arc<SingleWave>) {
        self.attached.lock().unwrap().push(Arc::downgrade(&client));
    }

    fn clear_badge(&self) {
        self.badge_clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Initializes a handle against `config` with a fresh recording host.
pub fn start(config: SdkConfig, store: &Arc<MemoryStore>) -> (Arc<SingleWave>, Arc<RecordingHost>) {
    let host = Arc::new(RecordingHost::default());
    let launch = LaunchContext {
        language: Some("en".to_string()),
        build: Some("42".to_string()),
        launch_options: None,
    };
    let client = SingleWave::initialize(
        config,
        launch,
        store.clone(),
        host.clone(),
        host.clone(),
        host.clone(),
    );
    (client, host)
}

/// Debug configuration pointed at a mock server.
pub fn config(project_id: &str, server_url: &str) -> SdkConfig {
    SdkConfig::new(project_id, true).with_backend_url(server_url)
}
