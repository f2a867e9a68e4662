//! Role gate and facility scoping.
//!
//! Every protected page declares an [`AllowedRoles`] list and evaluates it
//! with [`PageAccess::evaluate`] before touching any data. List queries are
//! then narrowed with a [`FacilityScope`] derived from the principal, never
//! from the client.

use std::fmt;

use tracing::debug;

use super::{FacilityHint, FacilityId, Role, Staff};

/// Where unauthenticated callers are sent.
pub const LOGIN_ROUTE: &str = "/login";
/// Where authenticated but unauthorised callers are sent.
pub const SAFE_DEFAULT_ROUTE: &str = "/";

/// Explicit allow-list of roles for one route.
///
/// # Examples
/// ```
/// use facility_ops::domain::{AllowedRoles, Role};
///
/// const MANAGERS: AllowedRoles = AllowedRoles::new(&[Role::Admin, Role::Manager]);
/// assert!(MANAGERS.permits(Role::Manager));
/// assert!(!MANAGERS.permits(Role::Staff));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedRoles(&'static [Role]);

impl AllowedRoles {
    /// Any recognised role.
    pub const ANY_STAFF: Self = Self::new(&[Role::Admin, Role::Manager, Role::Staff]);
    /// Administrators and facility managers.
    pub const MANAGEMENT: Self = Self::new(&[Role::Admin, Role::Manager]);
    /// Administrators only.
    pub const ADMIN_ONLY: Self = Self::new(&[Role::Admin]);

    /// Declare an allow-list.
    pub const fn new(roles: &'static [Role]) -> Self {
        Self(roles)
    }

    /// Whether `role` is on the list.
    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Roles on the list.
    pub fn roles(&self) -> &'static [Role] {
        self.0
    }
}

/// Outcome of the role gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAccess {
    /// No principal could be resolved.
    Unauthenticated,
    /// The principal's role is not on the allow-list.
    Forbidden,
    /// The principal may proceed.
    Authorized(Staff),
}

impl PageAccess {
    /// Evaluate the gate for `principal` against `allowed`.
    pub fn evaluate(principal: Option<Staff>, allowed: &AllowedRoles) -> Self {
        match principal {
            None => Self::Unauthenticated,
            Some(staff) if allowed.permits(staff.role) => Self::Authorized(staff),
            Some(staff) => {
                debug!(staff_id = %staff.id, role = %staff.role, "role not permitted");
                Self::Forbidden
            }
        }
    }

    /// Redirect target for the terminal non-authorised states.
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Unauthenticated => Some(LOGIN_ROUTE),
            Self::Forbidden => Some(SAFE_DEFAULT_ROUTE),
            Self::Authorized(_) => None,
        }
    }
}

/// Server-derived set of facilities a request may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacilityScope {
    /// Every facility.
    All,
    /// Exactly one facility.
    Single(FacilityId),
    /// No facility at all.
    Nothing,
}

impl FacilityScope {
    /// Resolve the scope for `staff`, treating `hint` as advisory.
    ///
    /// Administrators may narrow to the hinted facility; everyone else is
    /// pinned to their own facility whatever the hint says.
    ///
    /// # Examples
    /// ```
    /// use facility_ops::domain::{FacilityHint, FacilityId, FacilityScope, Role, Staff, StaffId};
    /// use uuid::Uuid;
    ///
    /// let own = FacilityId::random();
    /// let other = FacilityId::random();
    /// let manager = Staff {
    ///     id: StaffId::from_uuid(Uuid::new_v4()),
    ///     name: "施設長".into(),
    ///     facility_id: Some(own),
    ///     role: Role::Manager,
    /// };
    /// let scope = FacilityScope::resolve(&manager, Some(FacilityHint::from_facility(other)));
    /// assert_eq!(scope, FacilityScope::Single(own));
    /// ```
    pub fn resolve(staff: &Staff, hint: Option<FacilityHint>) -> Self {
        if staff.role.has_cross_facility_visibility() {
            return hint.map_or(Self::All, |hint| Self::Single(hint.facility_id()));
        }
        staff.facility_id.map_or(Self::Nothing, Self::Single)
    }

    /// Whether rows owned by `facility` are visible.
    pub fn permits(&self, facility: FacilityId) -> bool {
        match self {
            Self::All => true,
            Self::Single(id) => *id == facility,
            Self::Nothing => false,
        }
    }

    /// The single facility, when the scope names one.
    pub fn single(&self) -> Option<FacilityId> {
        match self {
            Self::Single(id) => Some(*id),
            Self::All | Self::Nothing => None,
        }
    }

    /// Stable key for render-cache partitioning.
    pub fn cache_key(&self) -> String {
        match self {
            Self::All => "all".to_owned(),
            Self::Single(id) => format!("facility:{id}"),
            Self::Nothing => "none".to_owned(),
        }
    }
}

impl fmt::Display for FacilityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
