//! Application settings loaded via OrthoConfig.
//!
//! Values come from `FACILITY_OPS_*` environment variables, an optional
//! config file, and command-line flags. Without a backend URL the server runs
//! in fixture mode against the in-memory store and fixture accounts.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::hosted::HostedBackendConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration for the web server and the diagnostic CLI.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FACILITY_OPS")]
pub struct AppSettings {
    /// Hosted backend project URL; unset selects fixture mode.
    pub backend_url: Option<String>,
    /// Publishable (anon) API key sent with every hosted request.
    pub anon_key: Option<String>,
    /// Elevated key used only by `db-doctor`.
    pub service_role_key: Option<String>,
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// Per-request timeout for hosted calls, in seconds.
    pub backend_timeout_secs: Option<u64>,
}

/// Where pages and actions read and write.
#[derive(Clone)]
pub enum BackendMode {
    /// In-memory store seeded with demo rows; fixture sign-in accounts.
    Fixture,
    /// Hosted REST store and auth provider.
    Hosted(HostedBackendConfig),
}

/// Reasons the settings cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("FACILITY_OPS_BACKEND_URL is not a valid URL: {0}")]
    InvalidBackendUrl(#[source] url::ParseError),
    #[error("FACILITY_OPS_ANON_KEY is required when FACILITY_OPS_BACKEND_URL is set")]
    MissingAnonKey,
    #[error("FACILITY_OPS_SERVICE_ROLE_KEY is required for this command")]
    MissingServiceRoleKey,
    #[error("FACILITY_OPS_BIND_ADDR '{value}' is not a socket address")]
    InvalidBindAddr { value: String },
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

impl AppSettings {
    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Fixture or hosted mode, validated.
    ///
    /// # Examples
    /// ```
    /// use facility_ops::settings::{AppSettings, BackendMode};
    ///
    /// let settings = AppSettings {
    ///     backend_url: None,
    ///     anon_key: None,
    ///     service_role_key: None,
    ///     bind_addr: None,
    ///     backend_timeout_secs: None,
    /// };
    /// assert!(matches!(settings.backend_mode(), Ok(BackendMode::Fixture)));
    /// ```
    pub fn backend_mode(&self) -> Result<BackendMode, SettingsError> {
        let Some(url) = non_blank(self.backend_url.as_ref()) else {
            return Ok(BackendMode::Fixture);
        };
        let base_url = Url::parse(url).map_err(SettingsError::InvalidBackendUrl)?;
        let anon_key = non_blank(self.anon_key.as_ref()).ok_or(SettingsError::MissingAnonKey)?;
        Ok(BackendMode::Hosted(HostedBackendConfig {
            base_url,
            anon_key: anon_key.to_owned(),
            service_role_key: non_blank(self.service_role_key.as_ref()).map(str::to_owned),
            timeout: self.backend_timeout_secs.map(Duration::from_secs),
        }))
    }

    /// Hosted configuration carrying the service-role key.
    pub fn elevated_backend(&self) -> Result<Option<HostedBackendConfig>, SettingsError> {
        match self.backend_mode()? {
            BackendMode::Fixture => Ok(None),
            BackendMode::Hosted(config) if config.service_role_key.is_some() => Ok(Some(config)),
            BackendMode::Hosted(_) => Err(SettingsError::MissingServiceRoleKey),
        }
    }
}
