//! SingleWave backend API client.
//!
//! Two endpoints, both `POST` with an `application/x-www-form-urlencoded`
//! body and a JSON response that is only ever logged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{CustomDataEncoding, PLATFORM};
use crate::error::SingleWaveError;
use crate::http_request::Request;
use crate::tracker::NotificationEventRef;

/// Everything the backend needs to create or update a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Device locale language code; empty when unknown.
    pub language: String,
    /// The project id.
    pub project_hash: String,
    /// Always [`PLATFORM`].
    pub platform: String,
    /// Hex device token; empty until the platform hands one out.
    pub token: String,
    /// Custom data rendered with the configured [`CustomDataEncoding`].
    pub data: String,
}

impl RegistrationRequest {
    /// Builds a request from the session's current values.
    #[must_use]
    pub fn new(
        language: Option<&str>,
        project_id: &str,
        token: &str,
        custom_data: &BTreeMap<String, String>,
        encoding: CustomDataEncoding,
    ) -> Self {
        Self {
            language: language.unwrap_or_default().to_string(),
            project_hash: project_id.to_string(),
            platform: PLATFORM.to_string(),
            token: token.to_string(),
            data: encode_custom_data(custom_data, encoding),
        }
    }

    /// Form parameters in wire order.
    #[must_use]
    pub fn params(&self) -> [(&'static str, &str); 5] {
        [
            ("language", self.language.as_str()),
            ("hash", self.project_hash.as_str()),
            ("platform", self.platform.as_str()),
            ("token", self.token.as_str()),
            ("data", self.data.as_str()),
        ]
    }
}

/// Renders custom data into the `data` registration parameter.
#[must_use]
pub fn encode_custom_data(
    custom_data: &BTreeMap<String, String>,
    encoding: CustomDataEncoding,
) -> String {
    match encoding {
        CustomDataEncoding::Json => serde_json::to_string(custom_data)
            // A map of strings always serializes.
            .unwrap_or_else(|_| "{}".to_string()),
        CustomDataEncoding::Legacy => {
            let mut out = String::from("{");
            for (key, value) in custom_data {
                out.push('"');
                out.push_str(key);
                out.push_str("\":\"");
                out.push_str(value);
                out.push('"');
            }
            out.push('}');
            out
        }
    }
}

/// Client for the subscriber endpoints.
pub struct BackendClient {
    base_url: String,
    request: Request,
}

impl BackendClient {
    /// Creates a client for `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request: Request::new(),
        }
    }

    /// URL of the registration endpoint.
    #[must_use]
    pub fn register_url(&self) -> String {
        format!("{}/v1/subscribers/register", self.base_url)
    }

    /// URL of the open-tracking endpoint.
    #[must_use]
    pub fn open_url(&self) -> String {
        format!("{}/v1/subscribers/open", self.base_url)
    }

    /// Creates or updates the subscriber.
    ///
    /// Returns the decoded JSON response, or `None` when the body was not JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SingleWaveError::NetworkError`] on transport failure or an
    /// error status.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<Option<serde_json::Value>, SingleWaveError> {
        self.post_form(&self.register_url(), &request.params()).await
    }

    /// Reports that a notification was opened.
    ///
    /// # Errors
    ///
    /// Returns [`SingleWaveError::NetworkError`] on transport failure or an
    /// error status.
    pub async fn track_open(
        &self,
        event: &NotificationEventRef,
    ) -> Result<Option<serde_json::Value>, SingleWaveError> {
        let params = [
            ("platform", PLATFORM),
            ("notificationHash", event.notification_hash.as_str()),
            ("openHash", event.open_hash.as_str()),
            ("controlHash", event.control_hash.as_str()),
        ];
        self.post_form(&self.open_url(), &params).await
    }

    async fn post_form(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<serde_json::Value>, SingleWaveError> {
        let builder = self.request.post(url).form(params);
        let response = self.request.handle(builder).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| SingleWaveError::NetworkError {
                url: url.to_string(),
                status: None,
                error: format!("failed to read response body: {e}"),
            })?;

        match serde_json::from_slice(&body) {
            Ok(json) => Ok(Some(json)),
            Err(e) => {
                log::debug!("response from {url} is not JSON: {e}");
                Ok(None)
            }
        }
    }
}
