//! Persisted facility selection.
//!
//! The operator's chosen facility lives in a browser cookie. Its value is an
//! untrusted [`FacilityHint`]; only [`super::FacilityScope::resolve`] turns it
//! into something that may restrict a query.

use super::FacilityId;

/// Cookie carrying the selected facility id.
pub const FACILITY_COOKIE_NAME: &str = "selected_facility_id";
/// Cookie path.
pub const FACILITY_COOKIE_PATH: &str = "/";
/// Cookie lifetime in days.
pub const FACILITY_COOKIE_MAX_AGE_DAYS: i64 = 30;
/// Failure message for a malformed facility id.
pub const INVALID_FACILITY_ID_MESSAGE: &str = "施設IDが正しくありません";

/// Facility id read from a client-controlled source.
///
/// # Examples
/// ```
/// use facility_ops::domain::FacilityHint;
///
/// assert!(FacilityHint::parse("not-a-uuid").is_none());
/// assert!(FacilityHint::parse("11111111-1111-4111-8111-111111111111").is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FacilityHint(FacilityId);

impl FacilityHint {
    /// Parse a raw cookie or form value; malformed input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<FacilityId>().ok().map(Self)
    }

    /// Wrap a known facility id.
    pub const fn from_facility(id: FacilityId) -> Self {
        Self(id)
    }

    /// The hinted facility id.
    pub const fn facility_id(self) -> FacilityId {
        self.0
    }

    /// Value written to the cookie.
    pub fn cookie_value(self) -> String {
        self.0.to_string()
    }
}
