//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{HttpResponse, web};
use mockable::DefaultClock;

use crate::domain::ports::{AuthProvider, FIXTURE_PASSWORD, FixtureAuthProvider};
use crate::domain::{Error, LoginCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::cache::InMemoryPageCache;
use crate::outbound::memory_store::InMemoryDataStoreFactory;

/// Name of the session cookie issued by [`test_session_middleware`].
pub const TEST_SESSION_COOKIE: &str = "session";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(TEST_SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// State backed by the seeded in-memory store and the fixture accounts.
pub fn fixture_state() -> HttpState {
    HttpState::new(
        HttpStatePorts {
            auth: Arc::new(FixtureAuthProvider),
            stores: Arc::new(InMemoryDataStoreFactory::seeded(Arc::new(DefaultClock))),
            cache: Arc::new(InMemoryPageCache::new()),
        },
        false,
    )
}

async fn fixture_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    email: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&email, FIXTURE_PASSWORD)
        .map_err(|error| Error::invalid_request(error.to_string()))?;
    let login = AuthProvider::sign_in(state.auth.as_ref(), &credentials)
        .await
        .map_err(|error| Error::unauthorized(error.to_string()))?;
    session.persist_login(&login)?;
    Ok(HttpResponse::Ok().finish())
}

/// Route signing the fixture account named in the path into the session.
///
/// Mount it at `/test-login/{email}`.
pub fn fixture_login_route() -> actix_web::Route {
    web::get().to(fixture_login)
}

/// Pull the session cookie out of a response.
pub fn session_cookie<B>(response: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == TEST_SESSION_COOKIE)
        .map(Cookie::into_owned)
        .unwrap_or_else(|| panic!("response sets the {TEST_SESSION_COOKIE} cookie"))
}
