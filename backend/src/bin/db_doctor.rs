//! Check the hosted schema, RPC helpers and an optional sign-in.
//!
//! Exits 0 when every probe passes and 1 otherwise, including when the
//! elevated credentials are missing. `--help` and `--version` print to stdout
//! and exit 0; malformed flags get clap's usage error.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use facility_ops::diagnostics::{Report, run_diagnostics};
use facility_ops::domain::LoginCredentials;
use facility_ops::domain::ports::{
    AuthProvider, DataStore, DataStoreFactory, FixtureAuthProvider, StoreCredentials,
};
use facility_ops::outbound::hosted::HostedBackend;
use facility_ops::outbound::memory_store::InMemoryDataStoreFactory;
use facility_ops::settings::AppSettings;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

/// `db-doctor` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db-doctor",
    about = "Verify tables, columns, RLS helpers and sign-in against the configured backend",
    version
)]
struct CliArgs {
    /// Also sign in as this account and check its staffs row.
    #[arg(long, value_name = "email", requires = "password")]
    email: Option<String>,
    /// Password for `--email`.
    #[arg(long, value_name = "password", requires = "email")]
    password: Option<String>,
    /// Probe the seeded in-memory store instead of the hosted backend.
    #[arg(long)]
    fixture: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let outcome = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))
        .and_then(|runtime| runtime.block_on(async_main(args)));
    match outcome {
        Ok(report) if report.is_healthy() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            writeln!(io::stderr().lock(), "db-doctor: {error}").ok();
            ExitCode::FAILURE
        }
    }
}

async fn async_main(args: CliArgs) -> io::Result<Report> {
    let login = match (args.email.as_deref(), args.password.as_deref()) {
        (Some(email), Some(password)) => Some(
            LoginCredentials::try_from_parts(email, password)
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?,
        ),
        _ => None,
    };

    let (store, auth) = if args.fixture {
        fixture_ports()?
    } else {
        hosted_ports()?
    };

    let report = run_diagnostics(store.as_ref(), auth.as_ref(), login.as_ref()).await;
    let mut out = io::stdout().lock();
    report.write_to(&mut out)?;
    out.flush()?;
    Ok(report)
}

type Ports = (Arc<dyn DataStore>, Arc<dyn AuthProvider>);

fn fixture_ports() -> io::Result<Ports> {
    let store = InMemoryDataStoreFactory::seeded(Arc::new(DefaultClock))
        .connect(&StoreCredentials::ServiceRole)
        .map_err(io::Error::other)?;
    Ok((store, Arc::new(FixtureAuthProvider)))
}

fn hosted_ports() -> io::Result<Ports> {
    // Flags belong to this command; settings come from the environment only.
    let settings = AppSettings::load_from_iter([OsString::from("db-doctor")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let config = settings
        .elevated_backend()
        .map_err(io::Error::other)?
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "FACILITY_OPS_BACKEND_URL is not set; pass --fixture to probe the in-memory store",
            )
        })?;
    let backend = HostedBackend::new(config)
        .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?;
    let store = backend
        .data_store_factory()
        .connect(&StoreCredentials::ServiceRole)
        .map_err(io::Error::other)?;
    Ok((store, Arc::new(backend.auth_provider())))
}
