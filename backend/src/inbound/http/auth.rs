//! Principal resolution and the page role gate.
//!
//! ```text
//! session token -> store handle (per request) -> staff row -> PageAccess
//! ```
//!
//! [`get_current_staff`] never redirects; pages use [`require_page_access`],
//! which turns the two terminal gate states into `303 See Other` responses
//! before any page data is queried.

use std::sync::Arc;

use tracing::error;

use crate::domain::ports::{DataStore, StoreCredentials, StoreError};
use crate::domain::{
    AllowedRoles, Error, LOGIN_ROUTE, PageAccess, Staff, current_staff,
};
use crate::inbound::http::pages::PageError;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Whoever sent the request, with a store handle bound to their credentials.
pub struct Requester {
    /// Store handle carrying the session's token.
    pub store: Arc<dyn DataStore>,
    /// Staff row linked to the session, if any.
    pub staff: Option<Staff>,
}

/// A request that passed the role gate.
pub struct AuthorizedRequest {
    /// Store handle carrying the session's token.
    pub store: Arc<dyn DataStore>,
    /// The permitted principal.
    pub staff: Staff,
}

fn map_connect_error(error: StoreError) -> Error {
    error!(error = %error, "could not open data-store handle");
    Error::service_unavailable(error.to_string())
}

/// Connect a request-scoped store handle and resolve the session's staff row.
pub async fn resolve_requester(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Requester, Error> {
    let token = session.access_token()?;
    let credentials = token
        .clone()
        .map_or(StoreCredentials::Anonymous, StoreCredentials::User);
    let store = state
        .stores
        .connect(&credentials)
        .map_err(map_connect_error)?;
    let staff = current_staff(state.auth.as_ref(), store.as_ref(), token.as_ref()).await?;
    Ok(Requester { store, staff })
}

/// The signed-in staff member, or `None`; never redirects.
pub async fn get_current_staff(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Option<Staff>, Error> {
    resolve_requester(state, session)
        .await
        .map(|requester| requester.staff)
}

/// Run the role gate for a page.
///
/// Unauthenticated requests are redirected to `/login`; authenticated
/// requests whose role is not in `allowed` are redirected to `/`.
pub async fn require_page_access(
    state: &HttpState,
    session: &SessionContext,
    allowed: &AllowedRoles,
) -> Result<AuthorizedRequest, PageError> {
    let Requester { store, staff } = resolve_requester(state, session)
        .await
        .map_err(PageError::Failed)?;
    match PageAccess::evaluate(staff, allowed) {
        PageAccess::Authorized(staff) => Ok(AuthorizedRequest { store, staff }),
        denied => Err(PageError::Redirect(
            denied.redirect_target().unwrap_or(LOGIN_ROUTE),
        )),
    }
}
