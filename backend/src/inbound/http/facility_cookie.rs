//! Facility preference cookie.
//!
//! The cookie only remembers which facility an operator last picked. Values
//! read back are [`FacilityHint`]s and must pass through
//! [`crate::domain::FacilityScope::resolve`] before narrowing any query.

use actix_web::HttpRequest;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use tracing::debug;

use crate::domain::{
    FACILITY_COOKIE_MAX_AGE_DAYS, FACILITY_COOKIE_NAME, FACILITY_COOKIE_PATH, FacilityHint,
};

/// Build the preference cookie for `hint`.
///
/// # Examples
/// ```
/// use actix_web::cookie::SameSite;
/// use facility_ops::domain::{FacilityHint, FacilityId};
/// use facility_ops::inbound::http::facility_cookie::preference_cookie;
///
/// let hint = FacilityHint::from_facility(FacilityId::random());
/// let cookie = preference_cookie(hint, true);
/// assert_eq!(cookie.name(), "selected_facility_id");
/// assert_eq!(cookie.same_site(), Some(SameSite::Lax));
/// assert_eq!(cookie.secure(), Some(true));
/// ```
pub fn preference_cookie(hint: FacilityHint, secure: bool) -> Cookie<'static> {
    Cookie::build(FACILITY_COOKIE_NAME, hint.cookie_value())
        .path(FACILITY_COOKIE_PATH)
        .max_age(Duration::days(FACILITY_COOKIE_MAX_AGE_DAYS))
        .same_site(SameSite::Lax)
        .secure(secure)
        .http_only(true)
        .finish()
}

/// Expired preference cookie, used to forget the operator's choice.
pub fn clearing_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(FACILITY_COOKIE_NAME, "")
        .path(FACILITY_COOKIE_PATH)
        .same_site(SameSite::Lax)
        .secure(secure)
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// Read the preference cookie, ignoring malformed values.
pub fn facility_hint(req: &HttpRequest) -> Option<FacilityHint> {
    let cookie = req.cookie(FACILITY_COOKIE_NAME)?;
    let hint = FacilityHint::parse(cookie.value());
    if hint.is_none() {
        debug!(value = cookie.value(), "ignoring malformed facility preference cookie");
    }
    hint
}
