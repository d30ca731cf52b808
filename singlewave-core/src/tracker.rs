//! Notification open tracking.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, PendingCall};
use crate::logger::sdk_log;
use crate::platform::NotificationEventSource;

/// The three backend-issued hashes a notification carries for open tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEventRef {
    /// Identifies the notification that was sent.
    pub notification_hash: String,
    /// Identifies this open.
    pub open_hash: String,
    /// Control value checked by the backend.
    pub control_hash: String,
}

impl NotificationEventRef {
    /// Extracts the hash triple from a notification's `userInfo`, serialized
    /// as JSON.
    ///
    /// The triple lives in the top-level `data` object. Returns `None` if the
    /// payload is not JSON, has no `data` object, or any of the three hashes
    /// is missing or not a string.
    #[must_use]
    pub fn from_payload(payload: &str) -> Option<Self> {
        let payload: serde_json::Value = serde_json::from_str(payload).ok()?;
        let data = payload.get("data")?.as_object()?;
        let field = |name: &str| data.get(name)?.as_str().map(ToString::to_string);

        Some(Self {
            notification_hash: field("notificationHash")?,
            open_hash: field("openHash")?,
            control_hash: field("controlHash")?,
        })
    }
}

/// Receives notification callbacks and reports opens to the backend.
///
/// There is no client-side deduplication: a notification shown in the
/// foreground and then tapped is reported twice, and the backend drops the
/// repeat by hash.
pub struct EventTracker {
    event_source: Arc<dyn NotificationEventSource>,
    dispatcher: Arc<Dispatcher>,
    debug: bool,
}

impl EventTracker {
    pub(crate) fn new(
        event_source: Arc<dyn NotificationEventSource>,
        dispatcher: Arc<Dispatcher>,
        debug: bool,
    ) -> Self {
        Self {
            event_source,
            dispatcher,
            debug,
        }
    }

    /// The user tapped a notification (app in background or killed).
    pub async fn on_notification_opened(&self, payload: &str) {
        sdk_log!(self.debug, "notification opened");
        self.handle(payload).await;
    }

    /// A notification arrived while the app was in the foreground.
    pub async fn on_notification_foreground(&self, payload: &str) {
        sdk_log!(self.debug, "notification received while in foreground");
        self.handle(payload).await;
    }

    async fn handle(&self, payload: &str) {
        self.event_source.clear_badge();

        let Some(event) = NotificationEventRef::from_payload(payload) else {
            return;
        };

        sdk_log!(
            self.debug,
            "tracking open of notification {}",
            event.notification_hash
        );
        self.dispatcher.send(PendingCall::TrackOpen(event)).await;
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_full_payload() {
        let payload = r#"{
            "aps": {"alert": "hello", "badge": 1},
            "data": {"notificationHash": "n1", "openHash": "o1", "controlHash": "c1"}
        }"#;
        assert_eq!(
            NotificationEventRef::from_payload(payload),
            Some(NotificationEventRef {
                notification_hash: "n1".to_string(),
                open_hash: "o1".to_string(),
                control_hash: "c1".to_string(),
            })
        );
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let payload = r#"{"data": {"notificationHash": "n1", "openHash": "o1", "controlHash": "c1", "deeplink": "app://x", "count": 3}}"#;
        assert!(NotificationEventRef::from_payload(payload).is_some());
    }

    #[test_case(r#"{"data": {"notificationHash": "n1", "openHash": "o1"}}"# ; "missing control hash")]
    #[test_case(r#"{"data": {"openHash": "o1", "controlHash": "c1"}}"# ; "missing notification hash")]
    #[test_case(r#"{"data": {"notificationHash": "n1", "openHash": 7, "controlHash": "c1"}}"# ; "non string hash")]
    #[test_case(r#"{"data": "notificationHash=n1"}"# ; "data is not an object")]
    #[test_case(r#"{"notificationHash": "n1", "openHash": "o1", "controlHash": "c1"}"# ; "hashes outside data")]
    #[test_case("{}" ; "empty object")]
    #[test_case("not json" ; "not json")]
    fn test_incomplete_payload_is_dropped(payload: &str) {
        assert_eq!(NotificationEventRef::from_payload(payload), None);
    }
}
