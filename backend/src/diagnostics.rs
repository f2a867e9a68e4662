//! Schema and sign-in diagnostics behind the `db-doctor` command.
//!
//! Probes run through the same ports as the web server, so a report against
//! the hosted backend exercises the exact queries pages and actions issue.
//! Each probe is independent; one failure never hides the next.

use std::fmt;
use std::io::{self, Write};

use serde_json::json;
use tracing::debug;

use crate::domain::LoginCredentials;
use crate::domain::ports::{
    AuthProvider, DAILY_RECORDS_TABLE, DataStore, FACILITIES_TABLE, STAFFS_TABLE, SelectQuery,
};

/// A table and the columns the application reads or writes.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedTable {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Tables and columns the application depends on.
pub static EXPECTED_TABLES: [ExpectedTable; 3] = [
    ExpectedTable {
        name: FACILITIES_TABLE,
        columns: &["id", "name", "code", "created_at"],
    },
    ExpectedTable {
        name: STAFFS_TABLE,
        columns: &["id", "auth_user_id", "name", "facility_id", "role"],
    },
    ExpectedTable {
        name: DAILY_RECORDS_TABLE,
        columns: &["id", "facility_id", "staff_id", "record_date", "content"],
    },
];

/// Row-level-security helper functions the policies call.
pub static EXPECTED_RPCS: [&str; 2] = ["get_my_facility_id", "get_my_role"];

/// What a probe looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Table(&'static str),
    Column {
        table: &'static str,
        column: &'static str,
    },
    Rpc(&'static str),
    Login(String),
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(table) => write!(f, "table {table}"),
            Self::Column { table, column } => write!(f, "column {table}.{column}"),
            Self::Rpc(name) => write!(f, "rpc {name}()"),
            Self::Login(email) => write!(f, "login {email}"),
        }
    }
}

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub probe: Probe,
    /// `None` when the probe passed; otherwise the backend's message.
    pub failure: Option<String>,
    /// Extra detail printed after a passing probe.
    pub note: Option<String>,
}

impl Finding {
    fn pass(probe: Probe) -> Self {
        Self {
            probe,
            failure: None,
            note: None,
        }
    }

    fn fail(probe: Probe, message: impl Into<String>) -> Self {
        Self {
            probe,
            failure: Some(message.into()),
            note: None,
        }
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Every finding, in probe order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// `true` when every probe passed.
    pub fn is_healthy(&self) -> bool {
        self.findings.iter().all(Finding::passed)
    }

    /// Human-readable report, one line per probe.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        for finding in &self.findings {
            match (&finding.failure, &finding.note) {
                (None, None) => writeln!(out, "[ OK ] {}", finding.probe)?,
                (None, Some(note)) => writeln!(out, "[ OK ] {} ({note})", finding.probe)?,
                (Some(message), _) => writeln!(out, "[FAIL] {}: {message}", finding.probe)?,
            }
        }
        let failed = self.findings.iter().filter(|f| !f.passed()).count();
        if failed == 0 {
            writeln!(out, "all {} checks passed", self.findings.len())
        } else {
            writeln!(out, "{failed} of {} checks failed", self.findings.len())
        }
    }
}

async fn probe_table(store: &dyn DataStore, table: &ExpectedTable, report: &mut Report) {
    let table_query = SelectQuery::from(table.name).columns("*").limit(1);
    match store.select(&table_query).await {
        Ok(_) => report.findings.push(Finding::pass(Probe::Table(table.name))),
        Err(error) => {
            report
                .findings
                .push(Finding::fail(Probe::Table(table.name), error.to_string()));
            // Column probes against a missing table only repeat the same error.
            return;
        }
    }
    for &column in table.columns {
        let probe = Probe::Column {
            table: table.name,
            column,
        };
        let column_query = SelectQuery::from(table.name).columns(column).limit(1);
        report.findings.push(match store.select(&column_query).await {
            Ok(_) => Finding::pass(probe),
            Err(error) => Finding::fail(probe, error.to_string()),
        });
    }
}

async fn probe_login(
    store: &dyn DataStore,
    auth: &dyn AuthProvider,
    credentials: &LoginCredentials,
    report: &mut Report,
) {
    let probe = Probe::Login(credentials.email().to_owned());
    let session = match auth.sign_in(credentials).await {
        Ok(session) => session,
        Err(error) => {
            report.findings.push(Finding::fail(probe, error.to_string()));
            return;
        }
    };
    let query = SelectQuery::from(STAFFS_TABLE)
        .columns("name,role")
        .eq("auth_user_id", session.user_id)
        .limit(1);
    report.findings.push(match store.select(&query).await {
        Ok(rows) => match rows.first() {
            Some(row) => Finding::pass(probe).with_note(format!(
                "linked staff {}",
                json!({"name": row.get("name"), "role": row.get("role")})
            )),
            None => Finding::fail(
                probe,
                format!("signed in as {} but no staffs row is linked", session.user_id),
            ),
        },
        Err(error) => Finding::fail(probe, error.to_string()),
    });
}

/// Probe tables, columns, RPCs and, when credentials are given, sign-in.
///
/// `store` should carry elevated credentials so row-level security does not
/// hide rows from the probes.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use facility_ops::diagnostics::run_diagnostics;
/// use facility_ops::domain::ports::{DataStoreFactory, FixtureAuthProvider, StoreCredentials};
/// use facility_ops::outbound::memory_store::InMemoryDataStoreFactory;
/// use mockable::DefaultClock;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let stores = InMemoryDataStoreFactory::seeded(Arc::new(DefaultClock));
/// let store = stores.connect(&StoreCredentials::ServiceRole).expect("connect");
/// let report = run_diagnostics(store.as_ref(), &FixtureAuthProvider, None).await;
/// assert!(report.is_healthy());
/// # });
/// ```
pub async fn run_diagnostics(
    store: &dyn DataStore,
    auth: &dyn AuthProvider,
    login: Option<&LoginCredentials>,
) -> Report {
    let mut report = Report::default();
    for table in &EXPECTED_TABLES {
        probe_table(store, table, &mut report).await;
    }
    for name in EXPECTED_RPCS {
        let finding = match store.rpc(name, json!({})).await {
            Ok(value) => {
                debug!(rpc = name, %value, "rpc answered");
                Finding::pass(Probe::Rpc(name))
            }
            Err(error) => Finding::fail(Probe::Rpc(name), error.to_string()),
        };
        report.findings.push(finding);
    }
    if let Some(credentials) = login {
        probe_login(store, auth, credentials, &mut report).await;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::ports::{
        DataStoreFactory, FixtureAuthProvider, MockDataStore, StoreCredentials, StoreError,
    };
    use crate::outbound::memory_store::InMemoryDataStoreFactory;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn seeded_store() -> Arc<dyn DataStore> {
        InMemoryDataStoreFactory::seeded(Arc::new(DefaultClock))
            .connect(&StoreCredentials::ServiceRole)
            .expect("connect")
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("credentials")
    }

    fn rendered(report: &Report) -> String {
        let mut out = Vec::new();
        report.write_to(&mut out).expect("write report");
        String::from_utf8(out).expect("utf8")
    }

    #[rstest]
    #[tokio::test]
    async fn seeded_store_passes_every_probe() {
        let store = seeded_store();
        let login = credentials("manager@example.com", "password");
        let report = run_diagnostics(store.as_ref(), &FixtureAuthProvider, Some(&login)).await;

        assert!(report.is_healthy(), "{}", rendered(&report));
        let text = rendered(&report);
        assert!(text.contains("[ OK ] table staffs"));
        assert!(text.contains("[ OK ] column daily_records.record_date"));
        assert!(text.contains("[ OK ] rpc get_my_role()"));
        assert!(text.contains("linked staff"));
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_fails_the_login_probe() {
        let store = seeded_store();
        let login = credentials("manager@example.com", "nope");
        let report = run_diagnostics(store.as_ref(), &FixtureAuthProvider, Some(&login)).await;

        assert!(!report.is_healthy());
        let last = report.findings().last().expect("login finding");
        assert_eq!(last.probe, Probe::Login("manager@example.com".to_owned()));
        assert!(!last.passed());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_table_skips_its_column_probes() {
        let mut store = MockDataStore::new();
        store.expect_select().returning(|query| {
            if query.table() == STAFFS_TABLE {
                Err(StoreError::backend(
                    "relation \"public.staffs\" does not exist",
                ))
            } else {
                Ok(Vec::new())
            }
        });
        store.expect_rpc().returning(|_, _| Ok(serde_json::Value::Null));

        let report = run_diagnostics(&store, &FixtureAuthProvider, None).await;

        assert!(!report.is_healthy());
        assert!(
            report
                .findings()
                .iter()
                .all(|f| !matches!(f.probe, Probe::Column { table, .. } if table == STAFFS_TABLE))
        );
        assert!(rendered(&report).contains("[FAIL] table staffs: relation \"public.staffs\" does not exist"));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_rpc_is_reported() {
        let mut store = MockDataStore::new();
        store.expect_select().returning(|_| Ok(Vec::new()));
        store.expect_rpc().returning(|name, _| {
            Err(StoreError::backend(format!(
                "Could not find the function public.{name}"
            )))
        });

        let report = run_diagnostics(&store, &FixtureAuthProvider, None).await;
        let failed: Vec<_> = report.findings().iter().filter(|f| !f.passed()).collect();
        assert_eq!(failed.len(), EXPECTED_RPCS.len());
        assert!(rendered(&report).ends_with("2 of 19 checks failed\n"));
    }
}
