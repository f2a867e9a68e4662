//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **hosted**: reqwest-backed PostgREST data store and auth provider
//! - **memory_store**: in-process tables used when no backend is configured
//! - **cache**: in-process page render cache
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod hosted;
pub mod memory_store;
