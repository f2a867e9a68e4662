//! Behaviour of the fixture store against the hosted schema's constraints.

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{DAILY_RECORDS_TABLE, FIXTURE_ACCOUNTS};
use crate::domain::AccessToken;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: Utc
            .with_ymd_and_hms(2024, 4, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    })
}

#[fixture]
fn store() -> Arc<dyn DataStore> {
    InMemoryDataStoreFactory::seeded(fixture_clock())
        .connect(&StoreCredentials::ServiceRole)
        .expect("handle")
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => panic!("fixture rows must be objects"),
    }
}

#[rstest]
#[tokio::test]
async fn seeded_facilities_sorted_by_code(store: Arc<dyn DataStore>) {
    let rows = store
        .select(
            &SelectQuery::from(FACILITIES_TABLE)
                .columns("code,name")
                .order_by(Order::asc("code")),
        )
        .await
        .expect("select");

    let codes = rows
        .iter()
        .filter_map(|row| row.get("code").and_then(Value::as_str))
        .collect::<Vec<_>>();
    assert_eq!(codes, ["F001", "F002"]);
    assert_eq!(rows[0].len(), 2, "only requested columns are returned");
}

#[rstest]
#[tokio::test]
async fn duplicate_code_reports_unique_violation(store: Arc<dyn DataStore>) {
    let err = store
        .insert(
            FACILITIES_TABLE,
            row(json!({ "name": "Another", "code": "F001" })),
        )
        .await
        .expect_err("duplicate");

    assert_eq!(
        err.to_string(),
        "duplicate key value violates unique constraint \"facilities_code_key\""
    );
}

#[rstest]
#[tokio::test]
async fn insert_assigns_id_and_timestamp(store: Arc<dyn DataStore>) {
    let inserted = store
        .insert(
            FACILITIES_TABLE,
            row(json!({ "name": "Sunrise Annex", "code": "F003" })),
        )
        .await
        .expect("insert");

    let created = &inserted[0];
    assert!(created.get("id").and_then(Value::as_str).is_some());
    assert_eq!(
        created.get("created_at").and_then(Value::as_str),
        Some("2024-04-01T09:00:00+00:00")
    );
}

#[rstest]
#[case(json!({ "name": "No code" }), "null value in column \"code\" of relation \"facilities\" violates not-null constraint")]
#[case(json!({ "name": "X", "code": "F9", "phone": "000" }), "Could not find the 'phone' column of 'facilities' in the schema cache")]
#[tokio::test]
async fn insert_constraint_messages(
    store: Arc<dyn DataStore>,
    #[case] payload: Value,
    #[case] expected: &str,
) {
    let err = store
        .insert(FACILITIES_TABLE, row(payload))
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), expected);
}

#[rstest]
#[tokio::test]
async fn unknown_table_is_reported_like_postgres(store: Arc<dyn DataStore>) {
    let err = store
        .select(&SelectQuery::from("residents"))
        .await
        .expect_err("missing table");
    assert_eq!(err.to_string(), "relation \"public.residents\" does not exist");
}

#[rstest]
#[tokio::test]
async fn referenced_facility_cannot_be_deleted(store: Arc<dyn DataStore>) {
    let err = store
        .delete(
            FACILITIES_TABLE,
            &[EqFilter::new("id", SUNRISE_FACILITY)],
        )
        .await
        .expect_err("referenced");
    assert!(err.to_string().contains("violates foreign key constraint"));
}

#[rstest]
#[tokio::test]
async fn unreferenced_facility_is_deleted(store: Arc<dyn DataStore>) {
    let inserted = store
        .insert(
            FACILITIES_TABLE,
            row(json!({ "name": "Temporary", "code": "TMP" })),
        )
        .await
        .expect("insert");
    let id = inserted[0]
        .get("id")
        .and_then(Value::as_str)
        .expect("id")
        .to_owned();

    let removed = store
        .delete(FACILITIES_TABLE, &[EqFilter::new("id", id)])
        .await
        .expect("delete");
    assert_eq!(removed, 1);
}

#[rstest]
#[tokio::test]
async fn record_for_unknown_facility_violates_foreign_key(store: Arc<dyn DataStore>) {
    let err = store
        .insert(
            DAILY_RECORDS_TABLE,
            row(json!({
                "facility_id": Uuid::new_v4().to_string(),
                "staff_id": CARE_STAFF.to_string(),
                "record_date": "2024-04-01",
                "content": "記録"
            })),
        )
        .await
        .expect_err("fk");
    assert_eq!(
        err.to_string(),
        "insert or update on table \"daily_records\" violates foreign key constraint \"daily_records_facility_id_fkey\""
    );
}

#[rstest]
#[tokio::test]
async fn rpc_resolves_the_callers_facility() {
    let factory = InMemoryDataStoreFactory::seeded(fixture_clock());
    let manager = FIXTURE_ACCOUNTS[1];
    let token = AccessToken::new(format!("fixture-token-{}", manager.auth_user_id));
    let handle = factory
        .connect(&StoreCredentials::User(token))
        .expect("handle");

    let facility = handle
        .rpc(GET_MY_FACILITY_ID_RPC, json!({}))
        .await
        .expect("rpc");
    assert_eq!(facility, json!(SUNRISE_FACILITY.to_string()));

    let anonymous = factory
        .connect(&StoreCredentials::Anonymous)
        .expect("handle");
    let role = anonymous.rpc(GET_MY_ROLE_RPC, json!({})).await.expect("rpc");
    assert!(role.is_null());
}

#[rstest]
#[tokio::test]
async fn unknown_rpc_is_reported(store: Arc<dyn DataStore>) {
    let err = store
        .rpc("recalculate_billing", json!({}))
        .await
        .expect_err("missing function");
    assert!(err.to_string().contains("public.recalculate_billing"));
}

#[rstest]
#[tokio::test]
async fn empty_delete_filters_are_refused(store: Arc<dyn DataStore>) {
    let err = store
        .delete(FACILITIES_TABLE, &[])
        .await
        .expect_err("must refuse");
    assert!(matches!(err, StoreError::InvalidRequest { .. }));
}
