//! Request middleware.
//!
//! Purpose: request-lifecycle concerns shared by every route. Sessions are
//! provided by `actix-session` and configured in
//! [`crate::inbound::http::session_config`].

pub mod trace;

pub use trace::Trace;
