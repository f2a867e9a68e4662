//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O. The state holds no
//! user credentials: each request connects its own data-store handle through
//! [`HttpState::stores`] using the token from its session.

use std::sync::Arc;

use crate::domain::Actions;
use crate::domain::ports::{AuthProvider, DataStore, DataStoreFactory, PageCache};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn AuthProvider>,
    pub stores: Arc<dyn DataStoreFactory>,
    pub cache: Arc<dyn PageCache>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthProvider>,
    pub stores: Arc<dyn DataStoreFactory>,
    pub cache: Arc<dyn PageCache>,
    /// Whether cookies written by handlers carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl HttpState {
    /// Construct state from the port bundle and the deployment's cookie
    /// security setting.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use facility_ops::domain::ports::FixtureAuthProvider;
    /// use facility_ops::inbound::http::state::{HttpState, HttpStatePorts};
    /// use facility_ops::outbound::cache::InMemoryPageCache;
    /// use facility_ops::outbound::memory_store::InMemoryDataStoreFactory;
    /// use mockable::DefaultClock;
    ///
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         auth: Arc::new(FixtureAuthProvider),
    ///         stores: Arc::new(InMemoryDataStoreFactory::seeded(Arc::new(DefaultClock))),
    ///         cache: Arc::new(InMemoryPageCache::new()),
    ///     },
    ///     false,
    /// );
    /// assert!(!state.cookie_secure);
    /// ```
    pub fn new(ports: HttpStatePorts, cookie_secure: bool) -> Self {
        let HttpStatePorts {
            auth,
            stores,
            cache,
        } = ports;
        Self {
            auth,
            stores,
            cache,
            cookie_secure,
        }
    }

    /// Server actions bound to a request-scoped store handle.
    pub fn actions(&self, store: Arc<dyn DataStore>) -> Actions {
        Actions::new(store, Arc::clone(&self.cache))
    }
}
