//! Facility master data.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message returned when a facility is submitted without a name or code.
pub const FACILITY_REQUIRED_FIELDS_MESSAGE: &str = "施設名と施設コードは必須です";

/// Stable facility identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(Uuid);

impl FacilityId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for FacilityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A care site as stored in the `facilities` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// Row identifier.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Operator-assigned facility code such as `F001`.
    pub code: String,
    /// Creation timestamp assigned by the store.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Validation errors for [`NewFacility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FacilityValidationError {
    /// Name or code was blank once trimmed.
    #[error("施設名と施設コードは必須です")]
    MissingNameOrCode,
}

/// Validated insert payload for the `facilities` table.
///
/// ## Invariants
/// - `name` and `code` are trimmed and non-empty.
///
/// # Examples
/// ```
/// use facility_ops::domain::NewFacility;
///
/// let facility = NewFacility::try_new(" Sunrise ", "F001").expect("valid");
/// assert_eq!(facility.name(), "Sunrise");
/// assert!(NewFacility::try_new("", "F001").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFacility {
    name: String,
    code: String,
}

impl NewFacility {
    /// Validate raw form input.
    pub fn try_new(name: &str, code: &str) -> Result<Self, FacilityValidationError> {
        let name = name.trim();
        let code = code.trim();
        if name.is_empty() || code.is_empty() {
            return Err(FacilityValidationError::MissingNameOrCode);
        }
        Ok(Self {
            name: name.to_owned(),
            code: code.to_owned(),
        })
    }

    /// Facility name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Facility code.
    pub fn code(&self) -> &str {
        &self.code
    }
}
