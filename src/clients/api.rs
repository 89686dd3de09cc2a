use bytes::Bytes;
use futures::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::session::Session;

/// Thin gateway over the backend REST API: base URL, bearer auth and
/// error passthrough. Endpoint wrappers live in the sibling modules.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth_base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_urls(&config.api_base_url, &config.auth_base_url, config.request_timeout())
    }

    pub fn with_base_urls(base_url: &str, auth_base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("log in first".to_string()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.build(method, format!("{}{}", self.base_url, path))
    }

    pub(crate) fn auth_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.build(method, format!("{}{}", self.auth_base_url, path))
    }

    fn build(&self, method: Method, url: String) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.session {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.dispatch(builder).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to decode response body: {}", e);
            AppError::ParseError(e.to_string())
        })
    }

    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.dispatch(builder).await?;
        Ok(())
    }

    /// Copies a successful response body into `sink` chunk by chunk.
    pub(crate) async fn send_to<W>(&self, builder: RequestBuilder, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let response = self.dispatch(builder).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk: Bytes = chunk?;
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            error!("Request failed: {}", e);
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = AppError::from_response(status, &body);
        if err.is_not_found() {
            debug!("Backend answered 404: {}", err);
        } else {
            error!("Backend answered {}: {}", status, err);
        }
        Err(err)
    }
}

/// Collects optional query parameters, skipping the absent ones.
#[derive(Debug, Default)]
pub(crate) struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(mut self, key: &'static str, value: impl ToString) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    pub(crate) fn set_opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub(crate) fn as_slice(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_optional_params_are_skipped() {
        let params = QueryParams::new()
            .set("page", 0)
            .set_opt("keyword", Some(""))
            .set_opt("sort", None)
            .set_opt("search", Some("acme"));
        assert_eq!(
            params.as_slice(),
            &[("page", "0".to_string()), ("search", "acme".to_string())]
        );
    }

    #[test]
    fn require_session_without_login_is_unauthorized() {
        let client = ApiClient::with_base_urls("http://x/api/", "http://x/api", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://x/api");
        assert!(matches!(client.require_session(), Err(AppError::Unauthorized(_))));
    }
}
