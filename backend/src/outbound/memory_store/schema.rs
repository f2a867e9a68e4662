//! Table definitions mirrored from the hosted schema.

use crate::domain::ports::{DAILY_RECORDS_TABLE, FACILITIES_TABLE, STAFFS_TABLE};

/// Foreign key from `column` to `facilities.id`.
pub(super) struct FacilityReference {
    pub(super) table: &'static str,
    pub(super) column: &'static str,
    pub(super) constraint: &'static str,
}

pub(super) struct TableDef {
    pub(super) name: &'static str,
    pub(super) columns: &'static [&'static str],
    pub(super) required: &'static [&'static str],
    pub(super) unique: &'static [(&'static str, &'static str)],
}

pub(super) static TABLES: [TableDef; 3] = [
    TableDef {
        name: FACILITIES_TABLE,
        columns: &["id", "name", "code", "created_at"],
        required: &["name", "code"],
        unique: &[("code", "facilities_code_key")],
    },
    TableDef {
        name: STAFFS_TABLE,
        columns: &["id", "auth_user_id", "name", "facility_id", "role", "created_at"],
        required: &["name", "role"],
        unique: &[("auth_user_id", "staffs_auth_user_id_key")],
    },
    TableDef {
        name: DAILY_RECORDS_TABLE,
        columns: &[
            "id",
            "facility_id",
            "staff_id",
            "record_date",
            "content",
            "created_at",
        ],
        required: &["facility_id", "staff_id", "record_date", "content"],
        unique: &[],
    },
];

pub(super) static FACILITY_REFERENCES: [FacilityReference; 2] = [
    FacilityReference {
        table: STAFFS_TABLE,
        column: "facility_id",
        constraint: "staffs_facility_id_fkey",
    },
    FacilityReference {
        table: DAILY_RECORDS_TABLE,
        column: "facility_id",
        constraint: "daily_records_facility_id_fkey",
    },
];

/// Stored procedures the fixture store answers.
pub(super) const GET_MY_FACILITY_ID_RPC: &str = "get_my_facility_id";
pub(super) const GET_MY_ROLE_RPC: &str = "get_my_role";

pub(super) fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|table| table.name == name)
}
