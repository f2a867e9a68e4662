//! Port for the hosted relational store.
//!
//! A [`DataStoreFactory`] hands out a [`DataStore`] per request, bound to the
//! credentials of that request. Row-level security is enforced by the store
//! itself; this layer never holds user credentials process-wide.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::define_port_error;
use crate::domain::AccessToken;

/// Table holding facility master data.
pub const FACILITIES_TABLE: &str = "facilities";
/// Table holding staff principals.
pub const STAFFS_TABLE: &str = "staffs";
/// Table holding daily care records.
pub const DAILY_RECORDS_TABLE: &str = "daily_records";

/// A single row as returned by the store.
pub type Row = serde_json::Map<String, Value>;

define_port_error! {
    /// Errors surfaced by data-store adapters.
    pub enum StoreError {
        /// The store rejected the call; the message is shown to operators verbatim.
        Backend { message: String } => "{message}",
        /// The store could not be reached.
        Transport { message: String } => "データベースに接続できませんでした: {message}",
        /// A response did not have the expected shape.
        Decode { message: String } => "データベースの応答を解釈できませんでした: {message}",
        /// The caller built a request the adapter refuses to send.
        InvalidRequest { message: String } => "不正なデータベース要求です: {message}",
        /// Required connection settings are missing.
        Unconfigured { message: String } => "データベース接続が設定されていません: {message}",
    }
}

/// Equality predicate on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    column: String,
    value: String,
}

impl EqFilter {
    /// Match rows where `column` equals `value`.
    pub fn new(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// Filtered column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Expected value in its textual form.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether a JSON cell satisfies the predicate.
    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            Some(Value::String(text)) => *text == self.value,
            Some(Value::Null) | None => self.value == "null",
            Some(other) => other.to_string() == self.value,
        }
    }
}

/// Sort key for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    column: String,
    ascending: bool,
}

impl Order {
    /// Ascending sort on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    /// Descending sort on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Sorted column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Sort direction.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }
}

/// Read request against one table.
///
/// # Examples
/// ```
/// use facility_ops::domain::ports::{Order, SelectQuery};
///
/// let query = SelectQuery::from("facilities")
///     .columns("id,name,code")
///     .order_by(Order::asc("code"));
/// assert_eq!(query.table(), "facilities");
/// assert_eq!(query.column_list(), "id,name,code");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    table: String,
    columns: String,
    filters: Vec<EqFilter>,
    order: Vec<Order>,
    limit: Option<usize>,
}

impl SelectQuery {
    /// Start a query selecting every column of `table`.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_owned(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Restrict the returned columns (comma separated).
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Add an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(EqFilter::new(column, value));
        self
    }

    /// Append a sort key.
    pub fn order_by(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    /// Cap the number of rows returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Target table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Requested columns.
    pub fn column_list(&self) -> &str {
        &self.columns
    }

    /// Equality filters.
    pub fn filters(&self) -> &[EqFilter] {
        &self.filters
    }

    /// Sort keys in priority order.
    pub fn ordering(&self) -> &[Order] {
        &self.order
    }

    /// Row cap.
    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Credentials a handle is bound to.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreCredentials {
    /// Publishable key only; row-level security sees an anonymous caller.
    Anonymous,
    /// A signed-in user's access token.
    User(AccessToken),
    /// Elevated key bypassing row-level security. Diagnostics only.
    ServiceRole,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::User(_) => f.write_str("User(<redacted>)"),
            Self::ServiceRole => f.write_str("ServiceRole"),
        }
    }
}

/// Request-scoped handle onto the hosted store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read rows.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError>;

    /// Insert one row and return the stored representation.
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError>;

    /// Delete rows matching every filter and return how many were removed.
    ///
    /// Adapters refuse an empty filter list.
    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<usize, StoreError>;

    /// Invoke a stored procedure.
    async fn rpc(&self, name: &str, args: Value) -> Result<Value, StoreError>;
}

/// Builds [`DataStore`] handles for explicit credentials.
#[cfg_attr(test, mockall::automock)]
pub trait DataStoreFactory: Send + Sync {
    /// Open a handle bound to `credentials`.
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn DataStore>, StoreError>;
}

/// Decode raw rows into typed records.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)))
        .collect::<Result<Vec<T>, _>>()
        .map_err(|err| StoreError::decode(err.to_string()))
}

/// Encode a typed payload as an insertable row.
pub fn encode_row<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::invalid_request(format!(
            "row payload must be an object, got {other}"
        ))),
        Err(err) => Err(StoreError::invalid_request(err.to_string())),
    }
}
