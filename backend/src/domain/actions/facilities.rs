//! Facility master-data actions.

use super::{
    Actions, ActionError, DAILY_RECORDS_PATH, FACILITIES_PATH, STAFFS_PATH, authorize, finish,
    scoped,
};
use crate::domain::ports::{EqFilter, FACILITIES_TABLE, Order, SelectQuery, decode_rows, encode_row};
use crate::domain::{
    ActionResult, AllowedRoles, Facility, FacilityId, FacilityScope, NewFacility, Staff,
};

const FACILITY_NOT_FOUND_MESSAGE: &str = "施設が見つかりません";

/// Lists that print facility names next to their rows.
const FACILITY_NAME_PATHS: [&str; 2] = [STAFFS_PATH, DAILY_RECORDS_PATH];

impl Actions {
    /// List the facilities visible in `scope`, ordered by code.
    pub async fn list_facilities(&self, scope: FacilityScope) -> ActionResult<Vec<Facility>> {
        finish(self.try_list_facilities(scope).await)
    }

    /// Create a facility from raw form input.
    ///
    /// Administrators and managers only. Revalidates [`FACILITIES_PATH`] once
    /// the store accepts the row.
    ///
    /// # Examples
    /// A blank name is refused before the store is touched:
    ///
    /// ```no_run
    /// # async fn demo(actions: facility_ops::domain::Actions, admin: facility_ops::domain::Staff) {
    /// let result = actions.create_facility(Some(&admin), "", "F001").await;
    /// assert_eq!(result.error(), Some("施設名と施設コードは必須です"));
    /// # }
    /// ```
    pub async fn create_facility(
        &self,
        actor: Option<&Staff>,
        name: &str,
        code: &str,
    ) -> ActionResult<()> {
        finish(self.try_create_facility(actor, name, code).await)
    }

    /// Delete a facility. Administrators only.
    ///
    /// Revalidates [`FACILITIES_PATH`], then the staff and daily-record lists
    /// whose cached rows name the facility.
    pub async fn delete_facility(&self, actor: Option<&Staff>, id: FacilityId) -> ActionResult<()> {
        finish(self.try_delete_facility(actor, id).await)
    }

    async fn try_list_facilities(
        &self,
        scope: FacilityScope,
    ) -> Result<Option<Vec<Facility>>, ActionError> {
        let query = SelectQuery::from(FACILITIES_TABLE)
            .columns("id,name,code,created_at")
            .order_by(Order::asc("code"));
        let Some(query) = scoped(query, scope, "id") else {
            return Ok(Some(Vec::new()));
        };
        let rows = self.store.select(&query).await?;
        Ok(Some(decode_rows(rows)?))
    }

    async fn try_create_facility(
        &self,
        actor: Option<&Staff>,
        name: &str,
        code: &str,
    ) -> Result<Option<()>, ActionError> {
        authorize(actor, &AllowedRoles::MANAGEMENT)?;
        let facility = NewFacility::try_new(name, code)?;
        self.store
            .insert(FACILITIES_TABLE, encode_row(&facility)?)
            .await?;
        self.cache.revalidate(FACILITIES_PATH).await;
        Ok(None)
    }

    async fn try_delete_facility(
        &self,
        actor: Option<&Staff>,
        id: FacilityId,
    ) -> Result<Option<()>, ActionError> {
        authorize(actor, &AllowedRoles::ADMIN_ONLY)?;
        let removed = self
            .store
            .delete(FACILITIES_TABLE, &[EqFilter::new("id", id)])
            .await?;
        if removed == 0 {
            return Err(ActionError::Refused(FACILITY_NOT_FOUND_MESSAGE));
        }
        self.cache.revalidate(FACILITIES_PATH).await;
        for path in FACILITY_NAME_PATHS {
            self.cache.revalidate(path).await;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::Sequence;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::actions::test_support::staff;
    use crate::domain::actions::{FORBIDDEN_MESSAGE, LOGIN_REQUIRED_MESSAGE};
    use crate::domain::ports::{MockDataStore, MockPageCache, Row, StoreError};
    use crate::domain::{FACILITY_REQUIRED_FIELDS_MESSAGE, Role};

    fn actions(store: MockDataStore, cache: MockPageCache) -> Actions {
        Actions::new(Arc::new(store), Arc::new(cache))
    }

    fn idle_cache() -> MockPageCache {
        let mut cache = MockPageCache::new();
        cache.expect_revalidate().never();
        cache
    }

    #[rstest]
    #[case("", "F001")]
    #[case("Sunrise", "  ")]
    #[tokio::test]
    async fn missing_fields_fail_before_the_store(#[case] name: &str, #[case] code: &str) {
        let mut store = MockDataStore::new();
        store.expect_insert().never();
        let admin = staff(Role::Admin, None);

        let result = actions(store, idle_cache())
            .create_facility(Some(&admin), name, code)
            .await;

        assert_eq!(result.error(), Some(FACILITY_REQUIRED_FIELDS_MESSAGE));
    }

    #[rstest]
    #[tokio::test]
    async fn successful_insert_revalidates_once_afterwards() {
        let mut seq = Sequence::new();
        let mut store = MockDataStore::new();
        store
            .expect_insert()
            .withf(|table, row| {
                table == FACILITIES_TABLE
                    && row.get("name") == Some(&json!("Sunrise"))
                    && row.get("code") == Some(&json!("F001"))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, row| Ok(vec![row]));
        let mut cache = MockPageCache::new();
        cache
            .expect_revalidate()
            .withf(|path| path == FACILITIES_PATH)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        let admin = staff(Role::Admin, None);

        let result = actions(store, cache)
            .create_facility(Some(&admin), "Sunrise", "F001")
            .await;

        assert_eq!(result, ActionResult::success_empty());
        assert_eq!(
            serde_json::to_value(&result).expect("serialise"),
            json!({ "success": true })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn backend_message_is_forwarded_verbatim() {
        const MESSAGE: &str =
            "duplicate key value violates unique constraint \"facilities_code_key\"";
        let mut store = MockDataStore::new();
        store
            .expect_insert()
            .times(1)
            .returning(|_, _| Err(StoreError::backend(MESSAGE)));

        let admin = staff(Role::Admin, None);
        let result = actions(store, idle_cache())
            .create_facility(Some(&admin), "Sunrise", "F001")
            .await;

        assert_eq!(result.error(), Some(MESSAGE));
    }

    #[rstest]
    #[case(None, LOGIN_REQUIRED_MESSAGE)]
    #[case(Some(Role::Staff), FORBIDDEN_MESSAGE)]
    #[tokio::test]
    async fn refuses_callers_before_validation(
        #[case] role: Option<Role>,
        #[case] expected: &str,
    ) {
        let mut store = MockDataStore::new();
        store.expect_insert().never();
        let actor = role.map(|role| staff(role, Some(FacilityId::random())));

        let result = actions(store, idle_cache())
            .create_facility(actor.as_ref(), "", "")
            .await;

        assert_eq!(result.error(), Some(expected));
    }

    #[rstest]
    #[tokio::test]
    async fn nothing_scope_lists_without_querying() {
        let mut store = MockDataStore::new();
        store.expect_select().never();

        let result = actions(store, idle_cache())
            .list_facilities(FacilityScope::Nothing)
            .await;

        assert_eq!(result.data().map(Vec::len), Some(0));
    }

    #[rstest]
    #[tokio::test]
    async fn single_scope_filters_by_id() {
        let facility = FacilityId::random();
        let mut store = MockDataStore::new();
        store
            .expect_select()
            .withf(move |query| {
                query.table() == FACILITIES_TABLE
                    && query.filters() == [EqFilter::new("id", facility)]
            })
            .times(1)
            .returning(move |_| {
                let row: Row = serde_json::from_value(json!({
                    "id": facility.to_string(),
                    "name": "Sunrise",
                    "code": "F001",
                    "created_at": null
                }))
                .expect("row");
                Ok(vec![row])
            });

        let result = actions(store, idle_cache())
            .list_facilities(FacilityScope::Single(facility))
            .await;

        let facilities = result.data().expect("facilities");
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].code, "F001");
    }

    #[rstest]
    #[tokio::test]
    async fn only_admins_delete() {
        let mut store = MockDataStore::new();
        store.expect_delete().never();
        let manager = staff(Role::Manager, Some(FacilityId::random()));

        let result = actions(store, idle_cache())
            .delete_facility(Some(&manager), FacilityId::random())
            .await;

        assert_eq!(result.error(), Some(FORBIDDEN_MESSAGE));
    }

    #[rstest]
    #[tokio::test]
    async fn deletion_revalidates_every_list_naming_the_facility() {
        let mut seq = Sequence::new();
        let mut store = MockDataStore::new();
        store
            .expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(1));
        let mut cache = MockPageCache::new();
        for path in [FACILITIES_PATH, STAFFS_PATH, DAILY_RECORDS_PATH] {
            cache
                .expect_revalidate()
                .withf(move |revalidated| revalidated == path)
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
        }
        let admin = staff(Role::Admin, None);

        let result = actions(store, cache)
            .delete_facility(Some(&admin), FacilityId::random())
            .await;

        assert_eq!(result, ActionResult::success_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_missing_facility_fails_without_revalidation() {
        let mut store = MockDataStore::new();
        store.expect_delete().times(1).returning(|_, _| Ok(0));
        let admin = staff(Role::Admin, None);

        let result = actions(store, idle_cache())
            .delete_facility(Some(&admin), FacilityId::random())
            .await;

        assert_eq!(result.error(), Some(FACILITY_NOT_FOUND_MESSAGE));
    }
}
