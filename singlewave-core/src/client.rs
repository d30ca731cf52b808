//! The SDK handle exposed to host applications.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::{LaunchContext, SdkConfig};
use crate::dispatch::Dispatcher;
use crate::logger::{sdk_log, set_verbose};
use crate::permissions::PermissionCoordinator;
use crate::platform::{
    AuthorizationStatus, NotificationEventSource, NotificationPermissionProvider,
    PushTokenProvider,
};
use crate::registration::{RegistrationManager, Session};
use crate::storage::{KeyValueStore, PersistedState};
use crate::tracker::EventTracker;

/// Converts a raw platform device token to the lowercase hex form used
/// everywhere in the SDK.
#[must_use]
pub fn device_token_hex(token: &[u8]) -> String {
    hex::encode(token)
}

/// A SingleWave SDK handle.
///
/// Created by [`SingleWave::initialize`] and meant to live for the whole
/// process. There is no hidden global: the host keeps the returned handle
/// (the event source receives it through `attach`). Initializing twice
/// yields two independent handles sharing the same store; the most recent
/// one is the one the host should use, and it registers with its own
/// project id.
#[derive(uniffi::Object)]
pub struct SingleWave {
    registration: RegistrationManager,
    permissions: PermissionCoordinator,
    tracker: EventTracker,
    dispatcher: Arc<Dispatcher>,
    debug: bool,
}

#[uniffi::export]
impl SingleWave {
    /// Starts the SDK.
    ///
    /// In order: restores persisted state into a new session, attaches the
    /// handle to `event_source`, clears the badge, logs the restored state,
    /// then checks the current permission and prompts for it. Never fails;
    /// an unreadable store means no prior state.
    #[uniffi::constructor]
    pub fn initialize(
        config: SdkConfig,
        launch: LaunchContext,
        store: Arc<dyn KeyValueStore>,
        permission_provider: Arc<dyn NotificationPermissionProvider>,
        push_provider: Arc<dyn PushTokenProvider>,
        event_source: Arc<dyn NotificationEventSource>,
    ) -> Arc<Self> {
        let debug = config.debug;
        set_verbose(debug);
        match &launch.build {
            Some(build) => log::info!("initializing SingleWave... build {build}"),
            None => log::warn!("possible error: unknown build"),
        }
        sdk_log!(
            debug,
            "the project id is {}, launch options: {} and debug {debug}",
            config.project_id,
            launch.launch_options.as_deref().unwrap_or("none")
        );
        if !config.backend_url.starts_with("https://") {
            log::warn!("backend url {} is not https", config.backend_url);
        }

        let persisted = PersistedState::load(store.as_ref());
        let session = Session::restore(&config.project_id, debug, persisted);

        let dispatcher = Arc::new(Dispatcher::new(
            BackendClient::new(&config.backend_url),
            store.clone(),
            config.durable_outbox,
            debug,
        ));
        let client = Arc::new(Self {
            registration: RegistrationManager::new(
                session,
                store,
                dispatcher.clone(),
                launch.language,
                config.reregistration,
                config.custom_data_encoding,
            ),
            permissions: PermissionCoordinator::new(permission_provider, push_provider, debug),
            tracker: EventTracker::new(event_source.clone(), dispatcher.clone(), debug),
            dispatcher,
            debug,
        });

        event_source.attach(client.clone());
        event_source.clear_badge();

        let session = client.registration.session();
        sdk_log!(debug, "saved user data (prev): {:?}", session.custom_data);
        sdk_log!(debug, "saved user token (prev): {}", session.device_token);
        if config.durable_outbox {
            sdk_log!(
                debug,
                "{} backend call(s) pending from a previous run",
                client.dispatcher.pending_count()
            );
        }

        client.permissions.check_permissions();
        client.permissions.prompt_push_permissions();

        client
    }

    /// Asks the platform for the current permission status. When authorized,
    /// the device token is requested again.
    pub fn check_permissions(&self) {
        self.permissions.check_permissions();
    }

    /// Shows the notification permission prompt.
    pub fn prompt_push_permissions(&self) {
        self.permissions.prompt_push_permissions();
    }

    /// Platform answer to a status query.
    pub fn on_authorization_status(&self, status: AuthorizationStatus) {
        self.permissions.on_authorization_status(status);
    }

    /// Platform answer to a permission prompt.
    pub fn on_authorization_response(&self, granted: bool, error: Option<String>) {
        self.permissions
            .on_authorization_response(granted, error.as_deref());
    }

    /// The platform could not produce a device token. Logged, never retried.
    pub fn on_token_registration_failed(&self, error: String) {
        log::error!("failed to register for push: {error}");
    }

    /// Project id of this handle.
    #[must_use]
    pub fn project_id(&self) -> String {
        self.registration.session().project_id
    }

    /// Current hex device token; empty until known.
    #[must_use]
    pub fn device_token(&self) -> String {
        self.registration.session().device_token
    }

    /// Current custom data.
    #[must_use]
    pub fn custom_data(&self) -> HashMap<String, String> {
        self.registration.session().custom_data.into_iter().collect()
    }

    /// Number of backend calls waiting in the outbox.
    #[must_use]
    pub fn pending_request_count(&self) -> u64 {
        self.dispatcher.pending_count()
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl SingleWave {
    /// The platform produced a device token (raw bytes).
    ///
    /// The token is hex-encoded, persisted and registered, even when it equals
    /// the previous one (unless the re-registration policy says otherwise).
    pub async fn on_token_received(&self, device_token: Vec<u8>) {
        let token = device_token_hex(&device_token);
        sdk_log!(self.debug, "registered for remote notifications: {token}");
        self.registration.received_new_device_token(token).await;
    }

    /// Replaces the subscriber's custom data (no merge) and registers it.
    pub async fn set_custom_data(&self, custom_data: HashMap<String, String>) {
        let custom_data: BTreeMap<String, String> = custom_data.into_iter().collect();
        self.registration.set_custom_data(custom_data).await;
    }

    /// Sends the current registration to the backend.
    pub async fn register_on_backend(&self) {
        self.registration.register_on_backend().await;
    }

    /// The user opened a notification. `payload` is the notification's
    /// `userInfo` as JSON.
    pub async fn on_notification_opened(&self, payload: String) {
        self.tracker.on_notification_opened(&payload).await;
    }

    /// A notification arrived in the foreground. `payload` is the
    /// notification's `userInfo` as JSON.
    pub async fn on_notification_foreground(&self, payload: String) {
        self.tracker.on_notification_foreground(&payload).await;
    }

    /// Re-sends calls queued by the durable outbox. Returns how many are
    /// still pending.
    pub async fn flush_pending_requests(&self) -> u64 {
        self.dispatcher.flush().await
    }
}
