//! Server actions.
//!
//! Each action authorises the caller, validates its input, talks to the
//! request-scoped [`DataStore`] and answers with an [`ActionResult`]. No error
//! escapes an action: refusals, validation failures and store errors all
//! become [`ActionResult::Failure`]. Mutations invalidate the matching list
//! route only once the store has confirmed the write.

use std::sync::Arc;

use tracing::warn;

use super::ports::{DataStore, PageCache, SelectQuery, StoreError};
use super::{
    ActionResult, AllowedRoles, DailyRecordValidationError, FacilityScope,
    FacilityValidationError, Staff, StaffValidationError,
};

mod daily_records;
mod facilities;
mod principal;
mod selection;
mod staffs;

pub use daily_records::SELECT_FACILITY_MESSAGE;
pub use principal::current_staff;
pub use selection::select_facility;

/// Failure message when no principal could be resolved.
pub const LOGIN_REQUIRED_MESSAGE: &str = "ログインが必要です";
/// Failure message when the principal's role is not permitted.
pub const FORBIDDEN_MESSAGE: &str = "権限がありません";

/// List route for facilities.
pub const FACILITIES_PATH: &str = "/facilities";
/// List route for staff.
pub const STAFFS_PATH: &str = "/staffs";
/// List route for daily records.
pub const DAILY_RECORDS_PATH: &str = "/daily-records";

/// Reasons an action fails. `Display` is the operator-facing message.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ActionError {
    #[error("ログインが必要です")]
    LoginRequired,
    #[error("権限がありません")]
    Forbidden,
    #[error("{0}")]
    Refused(&'static str),
    #[error(transparent)]
    Facility(#[from] FacilityValidationError),
    #[error(transparent)]
    Staff(#[from] StaffValidationError),
    #[error(transparent)]
    DailyRecord(#[from] DailyRecordValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Server actions bound to one request's store handle.
#[derive(Clone)]
pub struct Actions {
    store: Arc<dyn DataStore>,
    cache: Arc<dyn PageCache>,
}

impl Actions {
    /// Bind actions to a request-scoped store handle and the shared cache.
    pub fn new(store: Arc<dyn DataStore>, cache: Arc<dyn PageCache>) -> Self {
        Self { store, cache }
    }
}

fn authorize<'a>(actor: Option<&'a Staff>, allowed: &AllowedRoles) -> Result<&'a Staff, ActionError> {
    let staff = actor.ok_or(ActionError::LoginRequired)?;
    if allowed.permits(staff.role) {
        Ok(staff)
    } else {
        Err(ActionError::Forbidden)
    }
}

/// Narrow `query` to `scope` on `column`; `None` means nothing is visible.
fn scoped(query: SelectQuery, scope: FacilityScope, column: &str) -> Option<SelectQuery> {
    match scope {
        FacilityScope::All => Some(query),
        FacilityScope::Single(id) => Some(query.eq(column, id)),
        FacilityScope::Nothing => None,
    }
}

fn finish<T>(result: Result<Option<T>, ActionError>) -> ActionResult<T> {
    match result {
        Ok(data) => ActionResult::Success(data),
        Err(err) => {
            if let ActionError::Store(store) = &err {
                warn!(kind = store.kind(), error = %store, "store call failed");
            }
            ActionResult::failure(err.to_string())
        }
    }
}
