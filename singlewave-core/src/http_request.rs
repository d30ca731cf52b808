use reqwest::{Method, RequestBuilder, Response};

use crate::error::SingleWaveError;

/// A simple wrapper on an HTTP client for making requests. Sets the SDK
/// user-agent and maps transport and status failures into [`SingleWaveError`].
///
/// Every call is a single attempt: there is no timeout override and no retry.
pub struct Request {
    client: reqwest::Client,
}

impl Request {
    /// Initializes a new `Request` instance.
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Creates a request builder with defaults applied.
    pub(crate) fn req(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).header(
            "User-Agent",
            format!("singlewave-core/{}", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Creates a POST request builder with defaults applied.
    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.req(Method::POST, url)
    }

    /// Sends a request built by `req`/`post`.
    ///
    /// Responses with a status of 400 or above are turned into
    /// [`SingleWaveError::NetworkError`] carrying the status code.
    pub(crate) async fn handle(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, SingleWaveError> {
        let (client, request) = request_builder.build_split();
        let request = request.map_err(|err| SingleWaveError::NetworkError {
            url: err
                .url()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            status: None,
            error: format!("request build failed: {err}"),
        })?;
        let url = request.url().to_string();

        let response = client
            .execute(request)
            .await
            .map_err(|err| SingleWaveError::NetworkError {
                url: url.clone(),
                status: None,
                error: format!("request failed: {err}"),
            })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(SingleWaveError::NetworkError {
                url,
                status: Some(status.as_u16()),
                error: format!("request error with bad status code {status}"),
            });
        }
        Ok(response)
    }
}
