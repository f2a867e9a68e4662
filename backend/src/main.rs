//! Backend entry-point: loads settings and the session policy, then serves
//! pages, actions, and health probes.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use facility_ops::inbound::http::health::HealthState;
use facility_ops::inbound::http::session_config::{BuildMode, SessionPolicy};
use facility_ops::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|error| std::io::Error::other(format!("load settings: {error}")))?;
    let backend = settings.backend_mode().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let policy = SessionPolicy::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(policy, bind_addr).with_backend(backend);
    info!(addr = %config.bind_addr(), "listening");
    create_server(health_state, config)?.await
}
