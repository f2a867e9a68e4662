//! Domain primitives, ports and server actions.
//!
//! Purpose: Define strongly typed entities for facilities, staff and daily
//! records, the role gate that protects pages, and the actions that read and
//! write the hosted store. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - ActionResult: uniform envelope returned by every server action.
//! - PageAccess / AllowedRoles: the per-route role gate.
//! - FacilityScope / FacilityHint: server-derived list scope and its
//!   untrusted cookie input.
//! - Error: error payload for non-action surfaces.

pub mod access;
pub mod action_result;
pub mod actions;
pub mod auth;
pub mod daily_record;
pub mod error;
pub mod facility;
pub mod facility_preference;
pub mod ports;
pub mod staff;
pub mod trace_id;

pub use self::access::{
    AllowedRoles, FacilityScope, LOGIN_ROUTE, PageAccess, SAFE_DEFAULT_ROUTE,
};
pub use self::action_result::{
    ActionResult, GENERIC_FAILURE_MESSAGE, error_response, success_response,
};
pub use self::actions::{
    Actions, DAILY_RECORDS_PATH, FACILITIES_PATH, FORBIDDEN_MESSAGE, LOGIN_REQUIRED_MESSAGE,
    SELECT_FACILITY_MESSAGE, STAFFS_PATH, current_staff, select_facility,
};
pub use self::auth::{AccessToken, AuthSession, AuthUserId, LoginCredentials, LoginValidationError};
pub use self::daily_record::{
    DAILY_RECORD_MAX_CHARS, DailyRecord, DailyRecordValidationError, NewDailyRecord,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::facility::{
    FACILITY_REQUIRED_FIELDS_MESSAGE, Facility, FacilityId, FacilityValidationError, NewFacility,
};
pub use self::facility_preference::{
    FACILITY_COOKIE_MAX_AGE_DAYS, FACILITY_COOKIE_NAME, FACILITY_COOKIE_PATH, FacilityHint,
    INVALID_FACILITY_ID_MESSAGE,
};
pub use self::staff::{
    NewStaff, Role, STAFF_FACILITY_REQUIRED_MESSAGE, STAFF_NAME_REQUIRED_MESSAGE, Staff, StaffId,
    StaffValidationError,
};
pub use self::trace_id::TraceId;

