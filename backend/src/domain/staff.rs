//! Staff principals and their roles.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FacilityId;

/// Message returned when a staff member is submitted without a name.
pub const STAFF_NAME_REQUIRED_MESSAGE: &str = "氏名は必須です";
/// Message returned when a facility-level staff member has no facility.
pub const STAFF_FACILITY_REQUIRED_MESSAGE: &str = "所属施設は必須です";

/// Stable staff identifier (row id in `staffs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(Uuid);

impl StaffId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Permission tier on a staff principal.
///
/// Role strings the application does not know are kept as
/// [`Role::Unrecognised`]; that tier appears in no allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Headquarters administrator with cross-facility visibility.
    Admin,
    /// Facility manager.
    Manager,
    /// Care staff.
    Staff,
    /// Any other role string.
    Unrecognised,
}

impl Role {
    /// Canonical lowercase name as stored in the `staffs.role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Staff => "staff",
            Self::Unrecognised => "unknown",
        }
    }

    /// Whether the role may read data across all facilities.
    #[must_use]
    pub const fn has_cross_facility_visibility(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Japanese label shown in the UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "管理者",
            Self::Manager => "施設長",
            Self::Staff => "職員",
            Self::Unrecognised => "不明",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            "staff" => Self::Staff,
            _ => Self::Unrecognised,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff member as stored in the `staffs` table.
///
/// A staff member belongs to exactly one facility, or none for HQ-level
/// roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// Row identifier.
    pub id: StaffId,
    /// Full name.
    pub name: String,
    /// Home facility, if any.
    #[serde(default)]
    pub facility_id: Option<FacilityId>,
    /// Permission tier.
    pub role: Role,
}

/// Validation errors for [`NewStaff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StaffValidationError {
    /// Name was blank once trimmed.
    #[error("氏名は必須です")]
    EmptyName,
    /// A facility-level role was submitted without a facility.
    #[error("所属施設は必須です")]
    MissingFacility,
    /// The role string is not one the application grants.
    #[error("役割が正しくありません")]
    UnknownRole,
}

/// Validated insert payload for the `staffs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStaff {
    name: String,
    role: Role,
    facility_id: Option<FacilityId>,
}

impl NewStaff {
    /// Validate raw form input.
    ///
    /// Non-admin roles must name a facility; admins may be facility-less.
    pub fn try_new(
        name: &str,
        role: &str,
        facility_id: Option<FacilityId>,
    ) -> Result<Self, StaffValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StaffValidationError::EmptyName);
        }
        let role = Role::from(role);
        if role == Role::Unrecognised {
            return Err(StaffValidationError::UnknownRole);
        }
        if facility_id.is_none() && !role.has_cross_facility_visibility() {
            return Err(StaffValidationError::MissingFacility);
        }
        Ok(Self {
            name: name.to_owned(),
            role,
            facility_id,
        })
    }

    /// Staff name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Requested facility.
    pub fn facility_id(&self) -> Option<FacilityId> {
        self.facility_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("admin", Role::Admin)]
    #[case(" Manager ", Role::Manager)]
    #[case("staff", Role::Staff)]
    #[case("nurse", Role::Unrecognised)]
    fn parses_role_strings(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::from(raw), expected);
    }

    #[rstest]
    fn only_admin_crosses_facilities() {
        assert!(Role::Admin.has_cross_facility_visibility());
        assert!(!Role::Manager.has_cross_facility_visibility());
        assert!(!Role::Unrecognised.has_cross_facility_visibility());
    }

    #[rstest]
    fn staff_row_decodes_without_facility() {
        let staff: Staff = serde_json::from_value(serde_json::json!({
            "id": "22222222-2222-4222-8222-222222222222",
            "name": "本部 太郎",
            "facility_id": null,
            "role": "admin"
        }))
        .expect("decode");
        assert_eq!(staff.role, Role::Admin);
        assert!(staff.facility_id.is_none());
    }

    #[rstest]
    #[case("", "staff", true, StaffValidationError::EmptyName)]
    #[case("山田", "staff", false, StaffValidationError::MissingFacility)]
    #[case("山田", "owner", true, StaffValidationError::UnknownRole)]
    fn new_staff_validation(
        #[case] name: &str,
        #[case] role: &str,
        #[case] with_facility: bool,
        #[case] expected: StaffValidationError,
    ) {
        let facility = with_facility.then(FacilityId::random);
        let err = NewStaff::try_new(name, role, facility).expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn admin_may_be_facility_less() {
        let staff = NewStaff::try_new("本部 花子", "admin", None).expect("valid");
        assert_eq!(staff.role(), Role::Admin);
    }
}
