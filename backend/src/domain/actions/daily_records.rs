//! Daily care record actions.

use super::{Actions, ActionError, DAILY_RECORDS_PATH, authorize, finish, scoped};
use crate::domain::ports::{DAILY_RECORDS_TABLE, Order, SelectQuery, decode_rows, encode_row};
use crate::domain::{
    ActionResult, AllowedRoles, DailyRecord, FacilityScope, NewDailyRecord, Staff,
};

/// Failure message when a record is submitted without a single facility in scope.
pub const SELECT_FACILITY_MESSAGE: &str = "記録する施設を選択してください";

/// Most recent records shown on the list page.
const DAILY_RECORD_PAGE_SIZE: usize = 100;

impl Actions {
    /// List recent records visible in `scope`, newest first.
    pub async fn list_daily_records(&self, scope: FacilityScope) -> ActionResult<Vec<DailyRecord>> {
        finish(self.try_list_daily_records(scope).await)
    }

    /// Record a day's notes for the facility in `scope`.
    ///
    /// Any recognised role may write, but only while exactly one facility is
    /// in scope; administrators select one with the facility picker.
    pub async fn create_daily_record(
        &self,
        actor: Option<&Staff>,
        scope: FacilityScope,
        record_date: &str,
        content: &str,
    ) -> ActionResult<()> {
        finish(
            self.try_create_daily_record(actor, scope, record_date, content)
                .await,
        )
    }

    async fn try_list_daily_records(
        &self,
        scope: FacilityScope,
    ) -> Result<Option<Vec<DailyRecord>>, ActionError> {
        let query = SelectQuery::from(DAILY_RECORDS_TABLE)
            .columns("id,facility_id,staff_id,record_date,content,created_at")
            .order_by(Order::desc("record_date"))
            .order_by(Order::desc("created_at"))
            .limit(DAILY_RECORD_PAGE_SIZE);
        let Some(query) = scoped(query, scope, "facility_id") else {
            return Ok(Some(Vec::new()));
        };
        let rows = self.store.select(&query).await?;
        Ok(Some(decode_rows(rows)?))
    }

    async fn try_create_daily_record(
        &self,
        actor: Option<&Staff>,
        scope: FacilityScope,
        record_date: &str,
        content: &str,
    ) -> Result<Option<()>, ActionError> {
        let actor = authorize(actor, &AllowedRoles::ANY_STAFF)?;
        let facility_id = scope
            .single()
            .ok_or(ActionError::Refused(SELECT_FACILITY_MESSAGE))?;
        let record = NewDailyRecord::try_new(facility_id, actor.id, record_date, content)?;
        self.store
            .insert(DAILY_RECORDS_TABLE, encode_row(&record)?)
            .await?;
        self.cache.revalidate(DAILY_RECORDS_PATH).await;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::actions::test_support::staff;
    use crate::domain::ports::{MockDataStore, MockPageCache, StoreError};
    use crate::domain::{FacilityId, Role};

    fn idle_cache() -> MockPageCache {
        let mut cache = MockPageCache::new();
        cache.expect_revalidate().never();
        cache
    }

    #[rstest]
    #[case(FacilityScope::All)]
    #[case(FacilityScope::Nothing)]
    #[tokio::test]
    async fn writing_requires_a_single_facility(#[case] scope: FacilityScope) {
        let mut store = MockDataStore::new();
        store.expect_insert().never();
        let admin = staff(Role::Admin, None);

        let result = Actions::new(Arc::new(store), Arc::new(idle_cache()))
            .create_daily_record(Some(&admin), scope, "2024-04-01", "入浴介助")
            .await;

        assert_eq!(result.error(), Some(SELECT_FACILITY_MESSAGE));
    }

    #[rstest]
    #[tokio::test]
    async fn record_is_written_by_the_actor() {
        let facility = FacilityId::random();
        let carer = staff(Role::Staff, Some(facility));
        let author = json!(carer.id.to_string());
        let mut store = MockDataStore::new();
        store
            .expect_insert()
            .withf(move |table, row| {
                table == DAILY_RECORDS_TABLE
                    && row.get("staff_id") == Some(&author)
                    && row.get("record_date") == Some(&json!("2024-04-01"))
            })
            .times(1)
            .returning(|_, row| Ok(vec![row]));
        let mut cache = MockPageCache::new();
        cache
            .expect_revalidate()
            .withf(|path| path == DAILY_RECORDS_PATH)
            .times(1)
            .return_const(());

        let result = Actions::new(Arc::new(store), Arc::new(cache))
            .create_daily_record(
                Some(&carer),
                FacilityScope::Single(facility),
                "2024-04-01",
                "入浴介助",
            )
            .await;

        assert!(result.is_success());
    }

    #[rstest]
    #[tokio::test]
    async fn row_level_refusal_is_forwarded() {
        const MESSAGE: &str = "new row violates row-level security policy for table \"daily_records\"";
        let facility = FacilityId::random();
        let mut store = MockDataStore::new();
        store
            .expect_insert()
            .returning(|_, _| Err(StoreError::backend(MESSAGE)));

        let result = Actions::new(Arc::new(store), Arc::new(idle_cache()))
            .create_daily_record(
                Some(&staff(Role::Staff, Some(facility))),
                FacilityScope::Single(facility),
                "2024-04-01",
                "入浴介助",
            )
            .await;

        assert_eq!(result.error(), Some(MESSAGE));
    }

    #[rstest]
    #[tokio::test]
    async fn list_is_newest_first_and_capped() {
        let mut store = MockDataStore::new();
        store
            .expect_select()
            .withf(|query| {
                query.ordering().first().is_some_and(|order| {
                    order.column() == "record_date" && !order.is_ascending()
                }) && query.row_limit() == Some(DAILY_RECORD_PAGE_SIZE)
                    && query.filters().is_empty()
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let result = Actions::new(Arc::new(store), Arc::new(idle_cache()))
            .list_daily_records(FacilityScope::All)
            .await;

        assert!(result.is_success());
    }
}
