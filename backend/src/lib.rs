//! Care facility operations backend.
//!
//! Staff sign in against a hosted auth provider, browse facility, staff, and
//! daily-record pages gated by role, and mutate data through server actions
//! that always answer with an [`domain::ActionResult`] envelope.

pub mod diagnostics;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
