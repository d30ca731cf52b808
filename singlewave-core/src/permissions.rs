//! Notification permission lifecycle.

use std::sync::Arc;

use crate::logger::sdk_log;
use crate::platform::{
    AuthorizationOptions, AuthorizationStatus, NotificationPermissionProvider, PushTokenProvider,
};

/// Negotiates notification permission and keeps the device token fresh.
///
/// Denial never unregisters: the subscriber stays on the backend and the
/// platform simply stops delivering.
pub struct PermissionCoordinator {
    permissions: Arc<dyn NotificationPermissionProvider>,
    push: Arc<dyn PushTokenProvider>,
    debug: bool,
}

impl PermissionCoordinator {
    pub(crate) fn new(
        permissions: Arc<dyn NotificationPermissionProvider>,
        push: Arc<dyn PushTokenProvider>,
        debug: bool,
    ) -> Self {
        Self {
            permissions,
            push,
            debug,
        }
    }

    /// Asks the platform for the current status.
    pub fn check_permissions(&self) {
        self.permissions.query_authorization_status();
    }

    /// Shows the permission prompt for alert, sound and badge.
    pub fn prompt_push_permissions(&self) {
        sdk_log!(self.debug, "requesting notification permissions");
        self.permissions
            .request_authorization(AuthorizationOptions::default());
    }

    /// Handles the answer to [`check_permissions`](Self::check_permissions).
    ///
    /// When authorized, asks for a token again: the platform may have rotated
    /// it without telling the app.
    pub fn on_authorization_status(&self, status: AuthorizationStatus) {
        match status {
            AuthorizationStatus::Authorized => {
                sdk_log!(self.debug, "user granted permission for notifications");
                self.push.register_for_remote_notifications();
            }
            AuthorizationStatus::Denied => {
                sdk_log!(self.debug, "user denied notification permission");
            }
            AuthorizationStatus::NotDetermined => {
                sdk_log!(self.debug, "notification permission has not been asked yet");
            }
            AuthorizationStatus::Provisional => {
                sdk_log!(
                    self.debug,
                    "the application is authorized to post non-interruptive notifications"
                );
            }
            AuthorizationStatus::Ephemeral => {
                sdk_log!(
                    self.debug,
                    "the application is temporarily authorized to post notifications"
                );
            }
            AuthorizationStatus::Unknown => {
                sdk_log!(self.debug, "unknown notification authorization status");
            }
        }
    }

    /// Handles the answer to
    /// [`prompt_push_permissions`](Self::prompt_push_permissions).
    pub fn on_authorization_response(&self, granted: bool, error: Option<&str>) {
        sdk_log!(
            self.debug,
            "permission answered: granted {granted}, error {}",
            error.unwrap_or("none")
        );
        if granted {
            self.push.register_for_remote_notifications();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use test_case::test_case;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        queries: AtomicUsize,
        requests: Mutex<Vec<AuthorizationOptions>>,
        registrations: AtomicUsize,
    }

    impl NotificationPermissionProvider for Recorder {
        fn query_authorization_status(&self) {
            self.queries.fetch_add(1, Ordering::SeqCst);
        }

        fn request_authorization(&self, options: AuthorizationOptions) {
            self.requests.lock().unwrap().push(options);
        }
    }

    impl PushTokenProvider for Recorder {
        fn register_for_remote_notifications(&self) {
            self.registrations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn coordinator() -> (Arc<Recorder>, PermissionCoordinator) {
        let recorder = Arc::new(Recorder::default());
        let coordinator = PermissionCoordinator::new(recorder.clone(), recorder.clone(), true);
        (recorder, coordinator)
    }

    #[test_case(AuthorizationStatus::Authorized, 1 ; "authorized")]
    #[test_case(AuthorizationStatus::Denied, 0 ; "denied")]
    #[test_case(AuthorizationStatus::NotDetermined, 0 ; "not determined")]
    #[test_case(AuthorizationStatus::Provisional, 0 ; "provisional")]
    #[test_case(AuthorizationStatus::Ephemeral, 0 ; "ephemeral")]
    #[test_case(AuthorizationStatus::Unknown, 0 ; "unknown")]
    fn test_status_triggers_registration(status: AuthorizationStatus, expected: usize) {
        let (recorder, coordinator) = coordinator();
        coordinator.on_authorization_status(status);
        assert_eq!(recorder.registrations.load(Ordering::SeqCst), expected);
    }

    #[test]
    fn test_authorized_registers_every_time() {
        let (recorder, coordinator) = coordinator();
        coordinator.on_authorization_status(AuthorizationStatus::Authorized);
        coordinator.on_authorization_status(AuthorizationStatus::Authorized);
        assert_eq!(recorder.registrations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prompt_requests_alert_sound_badge() {
        let (recorder, coordinator) = coordinator();
        coordinator.check_permissions();
        coordinator.prompt_push_permissions();

        assert_eq!(recorder.queries.load(Ordering::SeqCst), 1);
        assert_eq!(
            *recorder.requests.lock().unwrap(),
            vec![AuthorizationOptions {
                alert: true,
                sound: true,
                badge: true
            }]
        );
    }

    #[test]
    fn test_response_registers_only_when_granted() {
        let (recorder, coordinator) = coordinator();
        coordinator.on_authorization_response(false, Some("user declined"));
        assert_eq!(recorder.registrations.load(Ordering::SeqCst), 0);

        coordinator.on_authorization_response(true, None);
        assert_eq!(recorder.registrations.load(Ordering::SeqCst), 1);
    }
}
