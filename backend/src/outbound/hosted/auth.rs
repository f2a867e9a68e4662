//! Hosted auth-provider adapter (GoTrue-compatible API).

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{HostedBackend, hosted_error_message, status_message};
use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{AccessToken, AuthSession, AuthUserId, LoginCredentials};

/// Auth provider adapter backed by the hosted `/auth/v1` API.
#[derive(Clone)]
pub struct RestAuthProvider {
    backend: HostedBackend,
}

impl RestAuthProvider {
    /// Wrap a configured backend.
    pub fn new(backend: HostedBackend) -> Self {
        Self { backend }
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    id: Uuid,
}

fn map_transport_error(error: reqwest::Error) -> AuthProviderError {
    AuthProviderError::transport(error.to_string())
}

fn map_sign_in_status(status: StatusCode, body: &[u8]) -> AuthProviderError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            debug!(status = status.as_u16(), "password grant refused");
            AuthProviderError::invalid_credentials()
        }
        _ if status.is_server_error() => AuthProviderError::transport(status_message(status, body)),
        _ => AuthProviderError::rejected(
            hosted_error_message(body).unwrap_or_else(|| status_message(status, body)),
        ),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, AuthProviderError> {
    serde_json::from_slice(body)
        .map_err(|err| AuthProviderError::transport(format!("invalid auth response: {err}")))
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, AuthProviderError> {
        let mut url = self
            .backend
            .endpoint("auth/v1/token")
            .map_err(|err| AuthProviderError::transport(err.to_string()))?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .backend
            .client
            .post(url)
            .header("apikey", self.backend.anon_key.as_str())
            .header(ACCEPT, "application/json")
            .json(&PasswordGrant {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_sign_in_status(status, body.as_ref()));
        }
        let token: TokenResponse = decode(body.as_ref())?;
        Ok(AuthSession {
            access_token: AccessToken::new(token.access_token),
            user_id: AuthUserId::from_uuid(token.user.id),
        })
    }

    async fn user_for_token(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AuthUserId>, AuthProviderError> {
        let url = self
            .backend
            .endpoint("auth/v1/user")
            .map_err(|err| AuthProviderError::transport(err.to_string()))?;
        let response = self
            .backend
            .client
            .get(url)
            .header("apikey", self.backend.anon_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", token.expose()))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ if status.is_success() => {
                let user: UserResponse = decode(body.as_ref())?;
                Ok(Some(AuthUserId::from_uuid(user.id)))
            }
            _ if status.is_server_error() => {
                Err(AuthProviderError::transport(status_message(status, body.as_ref())))
            }
            _ => Err(AuthProviderError::rejected(
                hosted_error_message(body.as_ref())
                    .unwrap_or_else(|| status_message(status, body.as_ref())),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::BAD_REQUEST)]
    #[case(StatusCode::UNAUTHORIZED)]
    fn refused_grants_are_invalid_credentials(#[case] status: StatusCode) {
        let err = map_sign_in_status(
            status,
            br#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err, AuthProviderError::InvalidCredentials);
    }

    #[rstest]
    fn other_refusals_keep_the_provider_message() {
        let err = map_sign_in_status(StatusCode::TOO_MANY_REQUESTS, br#"{"msg":"Rate limit exceeded"}"#);
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[rstest]
    fn outages_are_transport_errors() {
        let err = map_sign_in_status(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert!(matches!(err, AuthProviderError::Transport { .. }));
    }

    #[rstest]
    fn decodes_token_response() {
        let body = br#"{
            "access_token": "jwt",
            "token_type": "bearer",
            "user": { "id": "0a0a0a0a-0000-4000-8000-000000000001", "email": "admin@example.com" }
        }"#;
        let token: TokenResponse = decode(body).expect("decode");
        assert_eq!(token.access_token, "jwt");
        assert_eq!(token.user.id.to_string(), "0a0a0a0a-0000-4000-8000-000000000001");
    }
}
