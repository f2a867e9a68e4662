//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod data_store;
mod page_cache;

pub use auth_provider::{
    AuthProvider, AuthProviderError, FIXTURE_ACCOUNTS, FIXTURE_PASSWORD, FixtureAccount,
    FixtureAuthProvider, INVALID_LOGIN_MESSAGE, fixture_user_for_token,
};
pub use data_store::{
    DAILY_RECORDS_TABLE, DataStore, DataStoreFactory, EqFilter, FACILITIES_TABLE, Order, Row,
    STAFFS_TABLE, SelectQuery, StoreCredentials, StoreError, decode_rows, encode_row,
};
pub use page_cache::{PageCache, RenderKey};

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
#[cfg(test)]
pub use data_store::{MockDataStore, MockDataStoreFactory};
#[cfg(test)]
pub use page_cache::MockPageCache;
