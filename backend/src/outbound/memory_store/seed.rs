//! Demo rows loaded into the fixture store.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::ports::{
    DAILY_RECORDS_TABLE, FACILITIES_TABLE, FIXTURE_ACCOUNTS, Row, STAFFS_TABLE,
};
use crate::domain::{FacilityId, StaffId};

/// Seeded facility with code `F001`.
pub const SUNRISE_FACILITY: FacilityId =
    FacilityId::from_uuid(Uuid::from_u128(0xf001_0000_0000_4000_8000_0000_0000_0001));
/// Seeded facility with code `F002`.
pub const HARBOR_FACILITY: FacilityId =
    FacilityId::from_uuid(Uuid::from_u128(0xf002_0000_0000_4000_8000_0000_0000_0002));

/// Staff row linked to `admin@example.com`.
pub const ADMIN_STAFF: StaffId =
    StaffId::from_uuid(Uuid::from_u128(0x5aff_0000_0000_4000_8000_0000_0000_0001));
/// Staff row linked to `manager@example.com`.
pub const MANAGER_STAFF: StaffId =
    StaffId::from_uuid(Uuid::from_u128(0x5aff_0000_0000_4000_8000_0000_0000_0002));
/// Staff row linked to `staff@example.com`.
pub const CARE_STAFF: StaffId =
    StaffId::from_uuid(Uuid::from_u128(0x5aff_0000_0000_4000_8000_0000_0000_0003));
const HARBOR_STAFF: StaffId =
    StaffId::from_uuid(Uuid::from_u128(0x5aff_0000_0000_4000_8000_0000_0000_0004));

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Tables and their seeded rows.
pub(super) fn seed_rows(now: DateTime<Utc>) -> Vec<(&'static str, Vec<Row>)> {
    let created_at = now.to_rfc3339();
    let [admin, manager, carer] = FIXTURE_ACCOUNTS;

    let facilities = vec![
        row(json!({
            "id": SUNRISE_FACILITY.to_string(),
            "name": "Sunrise Home",
            "code": "F001",
            "created_at": created_at,
        })),
        row(json!({
            "id": HARBOR_FACILITY.to_string(),
            "name": "Harbor View",
            "code": "F002",
            "created_at": created_at,
        })),
    ];

    let staffs = vec![
        row(json!({
            "id": ADMIN_STAFF.to_string(),
            "auth_user_id": admin.auth_user_id.to_string(),
            "name": "本部 管理者",
            "facility_id": null,
            "role": "admin",
            "created_at": created_at,
        })),
        row(json!({
            "id": MANAGER_STAFF.to_string(),
            "auth_user_id": manager.auth_user_id.to_string(),
            "name": "朝日 施設長",
            "facility_id": SUNRISE_FACILITY.to_string(),
            "role": "manager",
            "created_at": created_at,
        })),
        row(json!({
            "id": CARE_STAFF.to_string(),
            "auth_user_id": carer.auth_user_id.to_string(),
            "name": "朝日 職員",
            "facility_id": SUNRISE_FACILITY.to_string(),
            "role": "staff",
            "created_at": created_at,
        })),
        row(json!({
            "id": HARBOR_STAFF.to_string(),
            "auth_user_id": null,
            "name": "港 職員",
            "facility_id": HARBOR_FACILITY.to_string(),
            "role": "staff",
            "created_at": created_at,
        })),
    ];

    let today = now.date_naive().format("%Y-%m-%d").to_string();
    let daily_records = vec![
        row(json!({
            "id": Uuid::from_u128(0xd0c0_0000_0000_4000_8000_0000_0000_0001).to_string(),
            "facility_id": SUNRISE_FACILITY.to_string(),
            "staff_id": CARE_STAFF.to_string(),
            "record_date": today,
            "content": "朝食は全量摂取。午後に入浴介助。",
            "created_at": created_at,
        })),
        row(json!({
            "id": Uuid::from_u128(0xd0c0_0000_0000_4000_8000_0000_0000_0002).to_string(),
            "facility_id": HARBOR_FACILITY.to_string(),
            "staff_id": HARBOR_STAFF.to_string(),
            "record_date": today,
            "content": "レクリエーションに参加。体調変化なし。",
            "created_at": created_at,
        })),
    ];

    vec![
        (FACILITIES_TABLE, facilities),
        (STAFFS_TABLE, staffs),
        (DAILY_RECORDS_TABLE, daily_records),
    ]
}
