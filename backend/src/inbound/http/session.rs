//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers only deal with domain values:
//! the hosted provider's access token and the provider user id it belongs to.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AccessToken, AuthSession, AuthUserId, Error};

pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const AUTH_USER_ID_KEY: &str = "auth_user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist a successful sign-in in the session cookie.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// replayed after authentication.
    pub fn persist_login(&self, login: &AuthSession) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ACCESS_TOKEN_KEY, login.access_token.expose())
            .and_then(|()| self.0.insert(AUTH_USER_ID_KEY, login.user_id.to_string()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Access token of the signed-in operator, if any.
    pub fn access_token(&self) -> Result<Option<AccessToken>, Error> {
        self.0
            .get::<String>(ACCESS_TOKEN_KEY)
            .map(|token| token.filter(|raw| !raw.trim().is_empty()).map(AccessToken::new))
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Provider user id recorded at sign-in. Tampered values read as absent.
    pub fn auth_user_id(&self) -> Result<Option<AuthUserId>, Error> {
        let raw = self
            .0
            .get::<String>(AUTH_USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|value| match value.parse::<AuthUserId>() {
            Ok(id) => Some(id),
            Err(error) => {
                warn!("invalid auth user id in session cookie: {error}");
                None
            }
        }))
    }

    /// Forget the signed-in operator.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
