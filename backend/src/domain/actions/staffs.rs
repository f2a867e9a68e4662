//! Staff roster actions.

use super::{Actions, ActionError, STAFFS_PATH, authorize, finish, scoped};
use crate::domain::ports::{Order, STAFFS_TABLE, SelectQuery, decode_rows, encode_row};
use crate::domain::{
    ActionResult, AllowedRoles, FacilityId, FacilityScope, NewStaff, Role, Staff,
};

const STAFF_COLUMNS: &str = "id,name,facility_id,role";

impl Actions {
    /// List staff visible in `scope`, ordered by name.
    pub async fn list_staff(&self, scope: FacilityScope) -> ActionResult<Vec<Staff>> {
        finish(self.try_list_staff(scope).await)
    }

    /// Register a staff member.
    ///
    /// Managers always register into their own facility and may not grant
    /// the admin role; administrators may target any facility.
    pub async fn create_staff(
        &self,
        actor: Option<&Staff>,
        name: &str,
        role: &str,
        facility_id: Option<FacilityId>,
    ) -> ActionResult<()> {
        finish(self.try_create_staff(actor, name, role, facility_id).await)
    }

    async fn try_list_staff(&self, scope: FacilityScope) -> Result<Option<Vec<Staff>>, ActionError> {
        let query = SelectQuery::from(STAFFS_TABLE)
            .columns(STAFF_COLUMNS)
            .order_by(Order::asc("name"));
        let Some(query) = scoped(query, scope, "facility_id") else {
            return Ok(Some(Vec::new()));
        };
        let rows = self.store.select(&query).await?;
        Ok(Some(decode_rows(rows)?))
    }

    async fn try_create_staff(
        &self,
        actor: Option<&Staff>,
        name: &str,
        role: &str,
        facility_id: Option<FacilityId>,
    ) -> Result<Option<()>, ActionError> {
        let actor = authorize(actor, &AllowedRoles::MANAGEMENT)?;
        let facility_id = if actor.role.has_cross_facility_visibility() {
            facility_id
        } else {
            if Role::from(role) == Role::Admin {
                return Err(ActionError::Forbidden);
            }
            actor.facility_id
        };
        let staff = NewStaff::try_new(name, role, facility_id)?;
        self.store.insert(STAFFS_TABLE, encode_row(&staff)?).await?;
        self.cache.revalidate(STAFFS_PATH).await;
        Ok(None)
    }
}
