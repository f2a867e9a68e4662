//! Builders for the HTTP state in fixture and hosted modes.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use facility_ops::domain::ports::{AuthProvider, DataStoreFactory, FixtureAuthProvider};
use facility_ops::inbound::http::state::{HttpState, HttpStatePorts};
use facility_ops::outbound::cache::InMemoryPageCache;
use facility_ops::outbound::hosted::HostedBackend;
use facility_ops::outbound::memory_store::InMemoryDataStoreFactory;
use facility_ops::settings::BackendMode;

use super::ServerConfig;

fn backend_ports(
    backend: &BackendMode,
) -> io::Result<(Arc<dyn AuthProvider>, Arc<dyn DataStoreFactory>)> {
    match backend {
        BackendMode::Fixture => {
            warn!("no backend URL configured; serving seeded in-memory data with fixture accounts");
            Ok((
                Arc::new(FixtureAuthProvider),
                Arc::new(InMemoryDataStoreFactory::seeded(Arc::new(DefaultClock))),
            ))
        }
        BackendMode::Hosted(config) => {
            let backend = HostedBackend::new(config.clone())
                .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?;
            info!(base_url = %backend.base_url(), "using hosted backend");
            Ok((
                Arc::new(backend.auth_provider()),
                Arc::new(backend.data_store_factory()),
            ))
        }
    }
}

/// Build the shared HTTP state for the configured backend.
///
/// # Errors
/// Returns [`io::Error`] when the hosted client cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let (auth, stores) = backend_ports(&config.backend)?;
    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            auth,
            stores,
            cache: Arc::new(InMemoryPageCache::new()),
        },
        config.policy.cookie_secure,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use facility_ops::domain::ports::StoreCredentials;
    use facility_ops::outbound::hosted::HostedBackendConfig;
    use rstest::rstest;
    use url::Url;

    #[rstest]
    fn fixture_mode_connects_without_network() {
        let (_, stores) = backend_ports(&BackendMode::Fixture).expect("fixture ports");
        assert!(stores.connect(&StoreCredentials::Anonymous).is_ok());
    }

    #[rstest]
    fn hosted_mode_refuses_elevated_access_without_key() {
        let config = HostedBackendConfig {
            base_url: Url::parse("https://project.example.co").expect("url"),
            anon_key: "anon".to_owned(),
            service_role_key: None,
            timeout: Some(Duration::from_secs(5)),
        };
        let (_, stores) = backend_ports(&BackendMode::Hosted(config)).expect("hosted ports");
        assert!(stores.connect(&StoreCredentials::ServiceRole).is_err());
        assert!(stores.connect(&StoreCredentials::Anonymous).is_ok());
    }
}
