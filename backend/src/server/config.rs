//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use facility_ops::inbound::http::session_config::SessionPolicy;
use facility_ops::settings::BackendMode;

/// Everything [`super::create_server`] needs, resolved before binding.
pub struct ServerConfig {
    pub(crate) policy: SessionPolicy,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) backend: BackendMode,
}

impl ServerConfig {
    /// Construct a server configuration for fixture mode.
    #[must_use]
    pub fn new(policy: SessionPolicy, bind_addr: SocketAddr) -> Self {
        Self {
            policy,
            bind_addr,
            backend: BackendMode::Fixture,
        }
    }

    /// Select the backend pages and actions talk to.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendMode) -> Self {
        self.backend = backend;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
