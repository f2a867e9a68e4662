//! Port for the hosted authentication provider.
//!
//! Inbound adapters sign operators in through this port and resolve the
//! session token back to a provider user id on each request.

use async_trait::async_trait;
use uuid::Uuid;

use super::define_port_error;
use crate::domain::{AccessToken, AuthSession, AuthUserId, LoginCredentials};

/// Message shown when the provider refuses the email/password pair.
pub const INVALID_LOGIN_MESSAGE: &str = "メールアドレスまたはパスワードが正しくありません";

define_port_error! {
    /// Errors surfaced by auth-provider adapters.
    pub enum AuthProviderError {
        /// Email/password pair was refused.
        InvalidCredentials => "メールアドレスまたはパスワードが正しくありません",
        /// The provider answered with an error other than bad credentials.
        Rejected { message: String } => "{message}",
        /// The provider could not be reached or replied with garbage.
        Transport { message: String } => "認証サービスに接続できませんでした: {message}",
    }
}

/// Password sign-in and token introspection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange credentials for an access token.
    async fn sign_in(&self, credentials: &LoginCredentials)
    -> Result<AuthSession, AuthProviderError>;

    /// Resolve a token to its user; `None` when the token is no longer valid.
    async fn user_for_token(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AuthUserId>, AuthProviderError>;
}

/// Password accepted for every fixture account.
pub const FIXTURE_PASSWORD: &str = "password";

/// Fixture account: email and provider user id.
#[derive(Debug, Clone, Copy)]
pub struct FixtureAccount {
    /// Sign-in email.
    pub email: &'static str,
    /// Provider user id, linked from `staffs.auth_user_id`.
    pub auth_user_id: Uuid,
}

/// Accounts recognised by [`FixtureAuthProvider`].
pub static FIXTURE_ACCOUNTS: [FixtureAccount; 3] = [
    FixtureAccount {
        email: "admin@example.com",
        auth_user_id: Uuid::from_u128(0x0a0a_0a0a_0000_4000_8000_0000_0000_0001),
    },
    FixtureAccount {
        email: "manager@example.com",
        auth_user_id: Uuid::from_u128(0x0a0a_0a0a_0000_4000_8000_0000_0000_0002),
    },
    FixtureAccount {
        email: "staff@example.com",
        auth_user_id: Uuid::from_u128(0x0a0a_0a0a_0000_4000_8000_0000_0000_0003),
    },
];

const FIXTURE_TOKEN_PREFIX: &str = "fixture-token-";

/// Resolve a token issued by [`FixtureAuthProvider`] without a round trip.
pub fn fixture_user_for_token(token: &AccessToken) -> Option<AuthUserId> {
    token
        .expose()
        .strip_prefix(FIXTURE_TOKEN_PREFIX)
        .and_then(|raw| raw.parse::<AuthUserId>().ok())
        .filter(|id| {
            FIXTURE_ACCOUNTS
                .iter()
                .any(|account| account.auth_user_id == *id.as_uuid())
        })
}

/// In-process authenticator used when no hosted provider is configured.
///
/// Each fixture email signs in with [`FIXTURE_PASSWORD`]; the issued token
/// embeds the user id so it survives restarts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthProvider;

#[async_trait]
impl AuthProvider for FixtureAuthProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, AuthProviderError> {
        let account = FIXTURE_ACCOUNTS
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(credentials.email()))
            .filter(|_| credentials.password() == FIXTURE_PASSWORD)
            .ok_or_else(AuthProviderError::invalid_credentials)?;
        Ok(AuthSession {
            access_token: AccessToken::new(format!(
                "{FIXTURE_TOKEN_PREFIX}{}",
                account.auth_user_id
            )),
            user_id: AuthUserId::from_uuid(account.auth_user_id),
        })
    }

    async fn user_for_token(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AuthUserId>, AuthProviderError> {
        Ok(fixture_user_for_token(token))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("admin@example.com", "password", true)]
    #[case("MANAGER@example.com", "password", true)]
    #[case("admin@example.com", "wrong", false)]
    #[case("nobody@example.com", "password", false)]
    #[tokio::test]
    async fn fixture_sign_in(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        let result = FixtureAuthProvider.sign_in(&creds).await;
        match (should_succeed, result) {
            (true, Ok(session)) => {
                let resolved = FixtureAuthProvider
                    .user_for_token(&session.access_token)
                    .await
                    .expect("introspection");
                assert_eq!(resolved, Some(session.user_id));
            }
            (false, Err(err)) => assert_eq!(err, AuthProviderError::InvalidCredentials),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(session)) => panic!("expected failure, got session for {}", session.user_id),
        }
    }

    #[rstest]
    #[case("garbage")]
    #[case("fixture-token-not-a-uuid")]
    #[case("fixture-token-00000000-0000-0000-0000-000000000000")]
    #[tokio::test]
    async fn unknown_tokens_resolve_to_nobody(#[case] raw: &str) {
        let resolved = FixtureAuthProvider
            .user_for_token(&AccessToken::new(raw))
            .await
            .expect("introspection");
        assert!(resolved.is_none());
    }
}
