//! Reqwest-backed adapters for the hosted database/auth backend.
//!
//! The backend exposes a PostgREST-compatible REST API under `/rest/v1` and a
//! GoTrue-compatible auth API under `/auth/v1`. These adapters own transport
//! details only: URL construction, headers, HTTP error mapping and JSON
//! decoding.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use zeroize::Zeroizing;

mod auth;
mod query;
mod store;

pub use auth::RestAuthProvider;
pub use store::{RestDataStore, RestDataStoreFactory};

const USER_AGENT: &str = concat!("facility-ops/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the hosted backend.
#[derive(Clone)]
pub struct HostedBackendConfig {
    /// Project base URL, e.g. `https://project.example.co`.
    pub base_url: Url,
    /// Publishable (anon) API key.
    pub anon_key: String,
    /// Elevated key bypassing row-level security; diagnostics only.
    pub service_role_key: Option<String>,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

/// Shared HTTP client and keys for the hosted backend.
#[derive(Clone)]
pub struct HostedBackend {
    client: Client,
    base_url: Url,
    anon_key: Arc<Zeroizing<String>>,
    service_role_key: Option<Arc<Zeroizing<String>>>,
}

impl HostedBackend {
    /// Build the shared client.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: HostedBackendConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: normalise_base(config.base_url),
            anon_key: Arc::new(Zeroizing::new(config.anon_key)),
            service_role_key: config
                .service_role_key
                .map(|key| Arc::new(Zeroizing::new(key))),
        })
    }

    /// Factory producing request-scoped data-store handles.
    pub fn data_store_factory(&self) -> RestDataStoreFactory {
        RestDataStoreFactory::new(self.clone())
    }

    /// Auth provider adapter.
    pub fn auth_provider(&self) -> RestAuthProvider {
        RestAuthProvider::new(self.clone())
    }

    /// Base URL with a trailing slash.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

fn normalise_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url
}

/// Extract the human-readable message from a hosted error body.
///
/// PostgREST answers `{"message": ...}`; the auth API uses `msg`,
/// `error_description` or `error` depending on version.
fn hosted_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .into_iter()
        .find_map(|field| value.get(field).and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://project.example.co", "https://project.example.co/")]
    #[case("https://gateway.example.co/tenant", "https://gateway.example.co/tenant/")]
    #[case("https://project.example.co/?x=1", "https://project.example.co/")]
    fn base_url_gets_trailing_slash(#[case] raw: &str, #[case] expected: &str) {
        let url = normalise_base(Url::parse(raw).expect("url"));
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case(br#"{"code":"23505","message":"duplicate key value violates unique constraint \"facilities_code_key\""}"#.as_slice(), Some("duplicate key value violates unique constraint \"facilities_code_key\""))]
    #[case(br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#.as_slice(), Some("Invalid login credentials"))]
    #[case(br#"{"code":400,"msg":"Email not confirmed"}"#.as_slice(), Some("Email not confirmed"))]
    #[case(b"<html>bad gateway</html>".as_slice(), None)]
    #[case(br#"{"message":"  "}"#.as_slice(), None)]
    fn extracts_hosted_messages(#[case] body: &[u8], #[case] expected: Option<&str>) {
        assert_eq!(hosted_error_message(body).as_deref(), expected);
    }

    #[rstest]
    fn status_message_truncates_long_bodies() {
        let body = "x".repeat(400);
        let message = status_message(StatusCode::BAD_GATEWAY, body.as_bytes());
        assert!(message.starts_with("status 502: "));
        assert!(message.ends_with("..."));
    }
}
