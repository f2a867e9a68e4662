//! In-memory data store used when no hosted backend is configured.
//!
//! Tables mirror the hosted schema closely enough for local runs and tests:
//! unique and not-null constraints, facility foreign keys, and the two
//! row-level-security helper functions are emulated, and failures carry the
//! same messages PostgreSQL would produce. Row-level security itself is not
//! emulated; every handle sees every row.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::AuthUserId;
use crate::domain::ports::{
    DataStore, DataStoreFactory, EqFilter, FACILITIES_TABLE, Order, Row, STAFFS_TABLE,
    SelectQuery, StoreCredentials, StoreError, fixture_user_for_token,
};

mod schema;
mod seed;

pub use seed::{ADMIN_STAFF, CARE_STAFF, HARBOR_FACILITY, MANAGER_STAFF, SUNRISE_FACILITY};

use schema::{FACILITY_REFERENCES, GET_MY_FACILITY_ID_RPC, GET_MY_ROLE_RPC, TableDef};

const STAFF_ROLES: [&str; 3] = ["admin", "manager", "staff"];

struct Tables {
    rows: RwLock<HashMap<&'static str, Vec<Row>>>,
    clock: Arc<dyn Clock>,
}

/// Factory for handles onto one shared in-memory database.
#[derive(Clone)]
pub struct InMemoryDataStoreFactory {
    tables: Arc<Tables>,
}

impl InMemoryDataStoreFactory {
    /// Empty tables.
    pub fn empty(clock: Arc<dyn Clock>) -> Self {
        let rows = schema::TABLES
            .iter()
            .map(|table| (table.name, Vec::new()))
            .collect();
        Self {
            tables: Arc::new(Tables {
                rows: RwLock::new(rows),
                clock,
            }),
        }
    }

    /// Tables pre-filled with demo facilities, staff and records.
    pub fn seeded(clock: Arc<dyn Clock>) -> Self {
        let factory = Self::empty(clock);
        let now = factory.tables.clock.utc();
        {
            let mut rows = factory
                .tables
                .rows
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for (table, seeded) in seed::seed_rows(now) {
                rows.entry(table).or_default().extend(seeded);
            }
        }
        factory
    }
}

impl DataStoreFactory for InMemoryDataStoreFactory {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn DataStore>, StoreError> {
        let caller = match credentials {
            StoreCredentials::User(token) => fixture_user_for_token(token),
            StoreCredentials::Anonymous | StoreCredentials::ServiceRole => None,
        };
        Ok(Arc::new(InMemoryDataStore {
            tables: Arc::clone(&self.tables),
            caller,
        }))
    }
}

/// Handle onto the in-memory tables.
pub struct InMemoryDataStore {
    tables: Arc<Tables>,
    caller: Option<AuthUserId>,
}

fn table_def(name: &str) -> Result<&'static TableDef, StoreError> {
    schema::table(name)
        .ok_or_else(|| StoreError::backend(format!("relation \"public.{name}\" does not exist")))
}

fn ensure_column(table: &TableDef, column: &str) -> Result<(), StoreError> {
    if table.columns.iter().any(|known| *known == column) {
        Ok(())
    } else {
        Err(StoreError::backend(format!(
            "column {}.{column} does not exist",
            table.name
        )))
    }
}

fn is_null(row: &Row, column: &str) -> bool {
    row.get(column).is_none_or(Value::is_null)
}

fn compare_cells(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

fn sort_rows(rows: &mut [Row], order: &[Order]) {
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|key| {
                let ordering = compare_cells(a.get(key.column()), b.get(key.column()));
                if key.is_ascending() {
                    ordering
                } else {
                    ordering.reverse()
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn project(row: &Row, columns: &[&str]) -> Row {
    columns
        .iter()
        .map(|column| {
            (
                (*column).to_owned(),
                row.get(*column).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

impl InMemoryDataStore {
    fn select_rows(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let table = table_def(query.table())?;
        let columns: Vec<&str> = match query.column_list().trim() {
            "*" => table.columns.to_vec(),
            list => list.split(',').map(str::trim).collect(),
        };
        for column in &columns {
            ensure_column(table, column)?;
        }
        for filter in query.filters() {
            ensure_column(table, filter.column())?;
        }
        for key in query.ordering() {
            ensure_column(table, key.column())?;
        }

        let guard = self.tables.rows.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows = guard
            .get(table.name)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters().iter().all(|filter| filter.matches(row)))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        drop(guard);

        sort_rows(&mut rows, query.ordering());
        if let Some(limit) = query.row_limit() {
            rows.truncate(limit);
        }
        Ok(rows.iter().map(|row| project(row, &columns)).collect())
    }

    fn insert_row(&self, table_name: &str, mut row: Row) -> Result<Vec<Row>, StoreError> {
        let table = table_def(table_name)?;
        if let Some(unknown) = row
            .keys()
            .find(|key| !table.columns.iter().any(|known| *known == key.as_str()))
        {
            return Err(StoreError::backend(format!(
                "Could not find the '{unknown}' column of '{}' in the schema cache",
                table.name
            )));
        }
        if is_null(&row, "id") {
            row.insert("id".to_owned(), Value::String(Uuid::new_v4().to_string()));
        }
        if is_null(&row, "created_at") {
            row.insert(
                "created_at".to_owned(),
                Value::String(self.tables.clock.utc().to_rfc3339()),
            );
        }
        for column in table.columns {
            row.entry((*column).to_owned()).or_insert(Value::Null);
        }
        if let Some(column) = table.required.iter().find(|column| is_null(&row, column)) {
            return Err(StoreError::backend(format!(
                "null value in column \"{column}\" of relation \"{}\" violates not-null constraint",
                table.name
            )));
        }
        if table.name == STAFFS_TABLE {
            let role = row.get("role").and_then(Value::as_str).unwrap_or_default();
            if !STAFF_ROLES.iter().any(|known| *known == role) {
                return Err(StoreError::backend(
                    "new row for relation \"staffs\" violates check constraint \"staffs_role_check\"",
                ));
            }
        }

        let mut guard = self.tables.rows.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(reference) = FACILITY_REFERENCES
            .iter()
            .find(|reference| reference.table == table.name)
        {
            if let Some(Value::String(facility)) = row.get(reference.column) {
                let exists = guard.get(FACILITIES_TABLE).is_some_and(|facilities| {
                    facilities
                        .iter()
                        .any(|f| f.get("id").and_then(Value::as_str) == Some(facility.as_str()))
                });
                if !exists {
                    return Err(StoreError::backend(format!(
                        "insert or update on table \"{}\" violates foreign key constraint \"{}\"",
                        table.name, reference.constraint
                    )));
                }
            }
        }
        let existing = guard.entry(table.name).or_default();
        for (column, constraint) in table.unique {
            let Some(value) = row.get(*column).filter(|value| !value.is_null()) else {
                continue;
            };
            if existing.iter().any(|other| other.get(*column) == Some(value)) {
                return Err(StoreError::backend(format!(
                    "duplicate key value violates unique constraint \"{constraint}\""
                )));
            }
        }
        existing.push(row.clone());
        Ok(vec![row])
    }

    fn delete_rows(&self, table_name: &str, filters: &[EqFilter]) -> Result<usize, StoreError> {
        if filters.is_empty() {
            return Err(StoreError::invalid_request(
                "refusing to delete without filters",
            ));
        }
        let table = table_def(table_name)?;
        for filter in filters {
            ensure_column(table, filter.column())?;
        }

        let mut guard = self.tables.rows.write().unwrap_or_else(PoisonError::into_inner);
        let doomed = guard
            .get(table.name)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|filter| filter.matches(row)))
                    .filter_map(|row| row.get("id").and_then(Value::as_str).map(str::to_owned))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        if table.name == FACILITIES_TABLE {
            for reference in &FACILITY_REFERENCES {
                let referenced = guard.get(reference.table).is_some_and(|rows| {
                    rows.iter().any(|row| {
                        row.get(reference.column)
                            .and_then(Value::as_str)
                            .is_some_and(|id| doomed.iter().any(|doomed| doomed == id))
                    })
                });
                if referenced {
                    return Err(StoreError::backend(format!(
                        "update or delete on table \"facilities\" violates foreign key constraint \"{}\" on table \"{}\"",
                        reference.constraint, reference.table
                    )));
                }
            }
        }

        let rows = guard.entry(table.name).or_default();
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|filter| filter.matches(row)));
        Ok(before - rows.len())
    }

    fn caller_staff_field(&self, field: &str) -> Value {
        let Some(caller) = self.caller else {
            return Value::Null;
        };
        let caller = caller.to_string();
        self.tables
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(STAFFS_TABLE)
            .and_then(|rows| {
                rows.iter()
                    .find(|row| {
                        row.get("auth_user_id").and_then(Value::as_str) == Some(caller.as_str())
                    })
            })
            .and_then(|row| row.get(field).cloned())
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        self.select_rows(query)
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        self.insert_row(table, row)
    }

    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<usize, StoreError> {
        self.delete_rows(table, filters)
    }

    async fn rpc(&self, name: &str, _args: Value) -> Result<Value, StoreError> {
        match name {
            GET_MY_FACILITY_ID_RPC => Ok(self.caller_staff_field("facility_id")),
            GET_MY_ROLE_RPC => Ok(self.caller_staff_field("role")),
            _ => Err(StoreError::backend(format!(
                "Could not find the function public.{name} without parameters in the schema cache"
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
