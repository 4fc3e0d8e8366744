use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tfplug::Context;
use url::Url;

use super::error::{ApiError, PostmarkErrorResponse};

pub const DEFAULT_ENDPOINT: &str = "https://api.postmarkapp.com";
pub const ACCOUNT_TOKEN_HEADER: &str = "X-Postmark-Account-Token";
const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Postmark account API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    account_token: String,
    timeout: Duration,
}

impl Client {
    /// Create a new API client with the default timeout
    pub fn new(endpoint: &str, account_token: &str) -> Result<Self, ApiError> {
        Self::with_config(
            account_token,
            ClientConfig {
                endpoint: endpoint.to_string(),
                ..Default::default()
            },
        )
    }

    pub fn with_config(account_token: &str, config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = parse_endpoint(&config.endpoint)?;
        let timeout = Duration::from_secs(config.timeout_seconds);

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                account_token: account_token.to_string(),
                timeout,
            }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.base_url
    }

    /// Server API operations
    pub fn servers(&self) -> crate::api::servers::ServersApi<'_> {
        crate::api::servers::ServersApi::new(self)
    }

    /// Execute a POST request carrying a JSON body.
    /// Stops early when `ctx` is cancelled; nothing is retried.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let body = serde_json::to_vec(body).map_err(|e| ApiError::SerializeError(e.to_string()))?;

        tracing::debug!("POST request to: {}", url);

        let request = self
            .inner
            .http_client
            .post(url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCOUNT_TOKEN_HEADER, &self.inner.account_token)
            .body(body);

        self.execute(ctx, request).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", path, e)))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        // A context deadline shortens the client timeout, never extends it
        let timeout = ctx
            .remaining()
            .map_or(self.inner.timeout, |remaining| remaining.min(self.inner.timeout));

        if ctx.is_cancelled() {
            return Err(stopped_by_context(ctx, timeout));
        }

        let request = request.timeout(timeout);

        tokio::select! {
            _ = ctx.cancelled() => {
                let err = stopped_by_context(ctx, timeout);
                tracing::warn!("Request stopped before a response was received: {}", err);
                Err(err)
            }
            result = Self::exchange(request, timeout) => result,
        }
    }

    async fn exchange<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        Self::parse_response(status, text)
    }

    fn parse_response<T: DeserializeOwned>(status: StatusCode, text: String) -> Result<T, ApiError> {
        if !status.is_success() {
            tracing::error!("API error response ({}): {}", status, text);
            return Err(error_from_response(status, text));
        }

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(e.to_string())
        })
    }
}

/// Cancellation caused by an expired deadline is reported as a timeout
fn stopped_by_context(ctx: &Context, timeout: Duration) -> ApiError {
    match ctx.remaining() {
        Some(remaining) if remaining.is_zero() => ApiError::Timeout(timeout),
        _ => ApiError::Cancelled,
    }
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(timeout)
    } else {
        ApiError::RequestError(e)
    }
}

fn error_from_response(status: StatusCode, text: String) -> ApiError {
    let parsed = serde_json::from_str::<PostmarkErrorResponse>(&text).ok();

    match (status, parsed) {
        (StatusCode::UNAUTHORIZED, Some(body)) => ApiError::Unauthorized(body.message),
        (StatusCode::UNAUTHORIZED, None) => ApiError::Unauthorized(text),
        (StatusCode::TOO_MANY_REQUESTS, _) => ApiError::RateLimited,
        (status, Some(body)) => ApiError::ApiError {
            status: status.as_u16(),
            error_code: body.error_code,
            message: body.message,
        },
        (status, None) => ApiError::HttpStatus {
            status: status.as_u16(),
            body: text,
        },
    }
}

/// Endpoints are joined with relative paths, so the base must end in '/'
fn parse_endpoint(endpoint: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(endpoint.trim())
        .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ApiError::InvalidEndpoint(format!(
            "{}: expected an http or https URL",
            endpoint
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
