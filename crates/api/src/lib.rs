//! Action service API client.
//!
//! A lightweight async client for the action, runner type and execution
//! endpoints of the automation service. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating the configured base URL
//! - Attaching the caller's auth token to every request
//! - Mapping non-success responses onto [`ApiError`]
//!
//! The primary entry point is [`ActionctlClient`].
//!
//! # Example
//!
//! ```ignore
//! use actionctl_api::{ActionctlClient, AuthContext};
//!
//! async fn show() -> Result<(), actionctl_api::ApiError> {
//!     let client = ActionctlClient::new("http://127.0.0.1:9101/v1")?;
//!     let actions = client.list_actions(&AuthContext::anonymous()).await?;
//!     println!("{} actions", actions.len());
//!     Ok(())
//! }
//! ```

pub mod error;

use std::{env, fmt, time::Duration};

use actionctl_types::{Action, ActionRef, Execution, ExecutionQuery, RunnerType};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use error::ApiError;

/// Header carrying the auth token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Hostnames treated as local development targets.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

/// Everything but unreserved characters is escaped inside an id path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Opaque authentication context supplied by the caller and attached to requests.
#[derive(Clone, Default)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Thin wrapper around a configured `reqwest::Client` for the action service.
#[derive(Debug, Clone)]
pub struct ActionctlClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl ActionctlClient {
    /// Construct a client for `base_url` (e.g. `http://127.0.0.1:9101/v1`).
    ///
    /// The URL must parse, use `http` or `https`, and carry a host.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            // Blocking callers may drive each request on a fresh runtime; a
            // pooled connection would outlive the runtime that spawned it.
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("actionctl/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str, auth: &AuthContext) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, authenticated = auth.token().is_some(), "building request");

        let builder = self.http.request(method, url).header(header::USER_AGENT, &self.user_agent);
        match auth.token() {
            Some(token) => builder.header(AUTH_TOKEN_HEADER, token),
            None => builder,
        }
    }

    /// Request for a single resource; `id` is escaped as one path segment.
    fn resource_request(&self, collection: &str, id: &str, auth: &AuthContext) -> RequestBuilder {
        let segment = utf8_percent_encode(id, PATH_SEGMENT);
        self.request(Method::GET, &format!("/{collection}/{segment}"), auth)
    }

    pub async fn list_actions(&self, auth: &AuthContext) -> Result<Vec<Action>, ApiError> {
        send_json(self.request(Method::GET, "/actions", auth)).await
    }

    pub async fn get_action(&self, id: &str, auth: &AuthContext) -> Result<Action, ApiError> {
        send_json(self.resource_request("actions", id, auth)).await
    }

    /// Find the action registered under `reference`, if any.
    pub async fn find_action(&self, reference: &ActionRef, auth: &AuthContext) -> Result<Option<Action>, ApiError> {
        let builder = self
            .request(Method::GET, "/actions", auth)
            .query(&[("pack", reference.pack.as_str()), ("name", reference.name.as_str())]);
        let actions: Vec<Action> = send_json(builder).await?;
        Ok(actions
            .into_iter()
            .find(|action| action.pack == reference.pack && action.name == reference.name))
    }

    /// Find a runner type by name, if any.
    pub async fn find_runner_type(&self, name: &str, auth: &AuthContext) -> Result<Option<RunnerType>, ApiError> {
        let builder = self.request(Method::GET, "/runnertypes", auth).query(&[("name", name)]);
        let runners: Vec<RunnerType> = send_json(builder).await?;
        Ok(runners.into_iter().find(|runner| runner.name == name))
    }

    pub async fn create_execution(&self, execution: &Execution, auth: &AuthContext) -> Result<Execution, ApiError> {
        let body = serde_json::to_vec(execution)?;
        let builder = self
            .request(Method::POST, "/actionexecutions", auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
        send_json(builder).await
    }

    pub async fn get_execution(&self, id: &str, auth: &AuthContext) -> Result<Execution, ApiError> {
        send_json(self.resource_request("actionexecutions", id, auth)).await
    }

    pub async fn query_executions(&self, query: &ExecutionQuery, auth: &AuthContext) -> Result<Vec<Execution>, ApiError> {
        let builder = self
            .request(Method::GET, "/actionexecutions", auth)
            .query(&query_pairs(query));
        send_json(builder).await
    }
}

fn query_pairs(query: &ExecutionQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(action_name) = &query.action_name {
        pairs.push(("action_name", action_name.clone()));
    }
    if let Some(action_id) = &query.action_id {
        pairs.push(("action_id", action_id.clone()));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit", limit.to_string()));
    }
    pairs
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
    let response = builder.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        debug!(status = status.as_u16(), "request failed");
        return Err(ApiError::from_status(status, &text));
    }
    Ok(serde_json::from_str(&text)?)
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - the URL must parse and include a host
/// - the scheme must be `http` or `https`
/// - plain `http` to a non-local host is accepted with a warning
fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let parsed_base_url =
        Url::parse(base).map_err(|e| ApiError::transport(format!("invalid API URL '{}': {}", base, e)))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| ApiError::transport(format!("API URL '{}' must include a host", base)))?;

    match parsed_base_url.scheme() {
        "https" => Ok(()),
        "http" => {
            let is_local = LOCALHOST_DOMAINS
                .iter()
                .any(|&allowed| host_name.eq_ignore_ascii_case(allowed));
            if !is_local {
                warn!(host = %host_name, "API URL uses plain http for a non-local host; auth tokens travel unencrypted");
            }
            Ok(())
        }
        other => Err(ApiError::transport(format!(
            "API URL must use http or https; got '{}://'",
            other
        ))),
    }
}
