//! SDK configuration supplied by the host at initialization.

use strum::{Display, EnumString};

/// Production backend.
pub const DEFAULT_BACKEND_URL: &str = "https://backend.singlewave.io";

/// Platform identifier sent with every backend call.
pub const PLATFORM: &str = "mobile-ios";

/// When the SDK re-registers the subscriber after a token or custom-data update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Enum, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ReregistrationPolicy {
    /// Register on every update, even when nothing changed. The backend
    /// deduplicates.
    #[default]
    Always,
    /// Skip the backend call when the new value equals the current one.
    /// The value is still persisted.
    OnChange,
}

/// How custom data is rendered into the `data` registration parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Enum, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CustomDataEncoding {
    /// A proper JSON object with escaped keys and values, keys sorted.
    #[default]
    Json,
    /// The byte-exact format of the 1.x iOS SDK: `"key":"value"` pairs
    /// concatenated with no separator and no escaping. Only valid JSON for
    /// zero or one entry.
    Legacy,
}

/// Configuration for a SingleWave handle.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SdkConfig {
    /// Tenant identifier issued by the backend; sent as `hash`.
    pub project_id: String,
    /// Emit SDK diagnostics through the logger.
    pub debug: bool,
    /// Base URL of the backend, without trailing slash.
    pub backend_url: String,
    /// See [`ReregistrationPolicy`].
    pub reregistration: ReregistrationPolicy,
    /// See [`CustomDataEncoding`].
    pub custom_data_encoding: CustomDataEncoding,
    /// Persist failed backend calls and re-send them later.
    pub durable_outbox: bool,
}

impl SdkConfig {
    /// Production configuration with default behavior for `project_id`.
    #[must_use]
    pub fn new(project_id: impl Into<String>, debug: bool) -> Self {
        Self {
            project_id: project_id.into(),
            debug,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            reregistration: ReregistrationPolicy::default(),
            custom_data_encoding: CustomDataEncoding::default(),
            durable_outbox: false,
        }
    }

    /// Overrides the backend base URL (staging, local testing).
    #[must_use]
    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the re-registration policy.
    #[must_use]
    pub const fn with_reregistration(mut self, policy: ReregistrationPolicy) -> Self {
        self.reregistration = policy;
        self
    }

    /// Sets the custom-data encoding.
    #[must_use]
    pub const fn with_custom_data_encoding(mut self, encoding: CustomDataEncoding) -> Self {
        self.custom_data_encoding = encoding;
        self
    }

    /// Enables or disables the durable outbox.
    #[must_use]
    pub const fn with_durable_outbox(mut self, enabled: bool) -> Self {
        self.durable_outbox = enabled;
        self
    }
}

/// Creates a production configuration. Exported for foreign hosts, which
/// cannot call [`SdkConfig::new`].
#[uniffi::export]
#[must_use]
pub fn default_sdk_config(project_id: String, debug: bool) -> SdkConfig {
    SdkConfig::new(project_id, debug)
}

/// Facts about the host process at launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct LaunchContext {
    /// Device locale language code (`NSLocale.current.languageCode`).
    pub language: Option<String>,
    /// Host bundle build number (`CFBundleVersion`).
    pub build: Option<String>,
    /// Description of the launch options, logged in debug mode.
    pub launch_options: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = SdkConfig::new("proj", false);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.reregistration, ReregistrationPolicy::Always);
        assert_eq!(config.custom_data_encoding, CustomDataEncoding::Json);
        assert!(!config.durable_outbox);
    }

    #[test]
    fn test_backend_url_trailing_slash_is_trimmed() {
        let config = SdkConfig::new("proj", false).with_backend_url("http://127.0.0.1:1234/");
        assert_eq!(config.backend_url, "http://127.0.0.1:1234");
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(
            ReregistrationPolicy::from_str("on-change").unwrap(),
            ReregistrationPolicy::OnChange
        );
        assert_eq!(
            CustomDataEncoding::from_str("legacy").unwrap(),
            CustomDataEncoding::Legacy
        );
        assert!(CustomDataEncoding::from_str("xml").is_err());
    }
}
