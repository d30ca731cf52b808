//! Capabilities the host platform provides to the SDK.
//!
//! The core never talks to `UNUserNotificationCenter` or `UIApplication`
//! itself. The host wires small adapters implementing these traits, and
//! delivers the platform's answers back through the callback methods on
//! [`SingleWave`](crate::SingleWave):
//!
//! | Request (core → host)                               | Answer (host → core)            |
//! |-----------------------------------------------------|---------------------------------|
//! | [`NotificationPermissionProvider::query_authorization_status`] | `on_authorization_status`   |
//! | [`NotificationPermissionProvider::request_authorization`]      | `on_authorization_response` |
//! | [`PushTokenProvider::register_for_remote_notifications`]       | `on_token_received` / `on_token_registration_failed` |
//!
//! Notification callbacks (`on_notification_opened`,
//! `on_notification_foreground`) are routed by the [`NotificationEventSource`]
//! once the handle is attached to it.

use std::sync::Arc;

use strum::{Display, EnumString};

use crate::SingleWave;

/// Notification authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AuthorizationStatus {
    /// The user allowed notifications.
    Authorized,
    /// The user refused notifications.
    Denied,
    /// The user has not been asked yet.
    NotDetermined,
    /// Quiet, non-interruptive delivery is allowed.
    Provisional,
    /// Temporary authorization (App Clips).
    Ephemeral,
    /// A status this SDK version does not know about.
    Unknown,
}

/// Kinds of notification interaction to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct AuthorizationOptions {
    /// Show alerts.
    pub alert: bool,
    /// Play sounds.
    pub sound: bool,
    /// Update the app badge.
    pub badge: bool,
}

impl Default for AuthorizationOptions {
    fn default() -> Self {
        Self {
            alert: true,
            sound: true,
            badge: true,
        }
    }
}

/// Access to the platform's notification permission API.
///
/// Both calls return immediately; the answer is delivered later through the
/// matching callback on the SDK handle.
#[uniffi::export(with_foreign)]
pub trait NotificationPermissionProvider: Send + Sync {
    /// Asks for the current authorization status. Answer with
    /// `on_authorization_status`.
    fn query_authorization_status(&self);

    /// Shows the system permission prompt if needed. Answer with
    /// `on_authorization_response`.
    fn request_authorization(&self, options: AuthorizationOptions);
}

/// Access to the platform's remote notification registration.
#[uniffi::export(with_foreign)]
pub trait PushTokenProvider: Send + Sync {
    /// Asks the platform for a device token
    /// (`UIApplication.registerForRemoteNotifications`). Implementations must
    /// dispatch to the main thread themselves.
    fn register_for_remote_notifications(&self);
}

/// The source of notification and token delegate callbacks.
#[uniffi::export(with_foreign)]
pub trait NotificationEventSource: Send + Sync {
    /// Makes `client` the receiver of token and notification callbacks.
    ///
    /// The handle owns this source, so implementations keep `client` as a weak
    /// reference (`Weak` in Rust, `weak var` in Swift). A strong reference is
    /// a cycle that keeps every initialized handle alive.
    fn attach(&self, client: Arc<SingleWave>);

    /// Resets the application badge counter to zero.
    fn clear_badge(&self);
}
