//! Facility picker action.

use crate::domain::{ActionResult, FacilityHint, FacilityId, INVALID_FACILITY_ID_MESSAGE};

/// Validate the picker's submitted facility id.
///
/// The value is only checked for shape; whether the caller may see the
/// facility is decided later by [`crate::domain::FacilityScope::resolve`].
/// The inbound adapter writes the returned id to the preference cookie.
///
/// # Examples
/// ```
/// use facility_ops::domain::select_facility;
///
/// assert!(!select_facility("F001").is_success());
/// ```
pub fn select_facility(raw: &str) -> ActionResult<FacilityId> {
    match FacilityHint::parse(raw) {
        Some(hint) => ActionResult::success(hint.facility_id()),
        None => ActionResult::failure(INVALID_FACILITY_ID_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_id_twice_yields_same_value() {
        let id = FacilityId::random().to_string();
        assert_eq!(select_facility(&id), select_facility(&id));
        assert_eq!(
            select_facility(&id).data().map(ToString::to_string),
            Some(id)
        );
    }

    #[rstest]
    fn malformed_id_fails() {
        assert_eq!(
            select_facility("").error(),
            Some(INVALID_FACILITY_ID_MESSAGE)
        );
    }
}
