//! Server-rendered pages.
//!
//! Every handler runs the role gate first, resolves the facility scope from
//! the principal and the (untrusted) preference cookie, then renders with
//! Maud. List fragments are kept in the page cache per path and per
//! `"{staff_id}:{scope}"`, so a cached render never crosses scopes and is
//! dropped when an action revalidates the path.

use std::future::Future;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use maud::{Markup, PreEscaped};
use serde::Deserialize;
use tracing::{error, warn};

use crate::domain::ports::{PageCache, RenderKey};
use crate::domain::{Actions, AllowedRoles, Error, Facility, FacilityScope, Staff};
use crate::inbound::http::auth::{AuthorizedRequest, require_page_access};
use crate::inbound::http::error::{redact_if_internal, status_for};
use crate::inbound::http::facility_cookie::facility_hint;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

use layout::Chrome;

mod daily_records;
mod dashboard;
mod facilities;
pub(crate) mod layout;
mod staffs;

pub use daily_records::daily_records_page;
pub use dashboard::dashboard_page;
pub use facilities::facilities_page;
pub use staffs::staffs_page;

/// Why a page could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The role gate sent the visitor elsewhere.
    #[error("redirect to {0}")]
    Redirect(&'static str),
    /// Resolving the principal or rendering failed.
    #[error("{0}")]
    Failed(Error),
}

impl From<Error> for PageError {
    fn from(error: Error) -> Self {
        Self::Failed(error)
    }
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Redirect(_) => StatusCode::SEE_OTHER,
            Self::Failed(error) => status_for(error.code()),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Redirect(target) => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, *target))
                .finish(),
            Self::Failed(failure) => {
                error!(
                    code = ?failure.code(),
                    trace_id = failure.trace_id().unwrap_or_default(),
                    message = failure.message(),
                    "page render failed"
                );
                let shown = redact_if_internal(failure);
                HttpResponse::build(self.status_code())
                    .content_type("text/html; charset=utf-8")
                    .body(layout::error_page(&shown).into_string())
            }
        }
    }
}

/// One-shot status messages carried in the query string after a form post.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    /// Confirmation of a successful action.
    pub notice: Option<String>,
    /// Failure message from an action.
    pub error: Option<String>,
}

/// A gated page request with its resolved scope and facility list.
pub(crate) struct PageContext {
    pub staff: Staff,
    pub scope: FacilityScope,
    /// Facilities the principal may see; every facility for administrators.
    pub facilities: Vec<Facility>,
    pub actions: Actions,
}

impl PageContext {
    /// Run the role gate, then resolve the scope and the facility list.
    pub(crate) async fn load(
        state: &HttpState,
        session: &SessionContext,
        req: &HttpRequest,
        allowed: &AllowedRoles,
    ) -> Result<Self, PageError> {
        let AuthorizedRequest { store, staff } =
            require_page_access(state, session, allowed).await?;
        let scope = FacilityScope::resolve(&staff, facility_hint(req));
        let actions = state.actions(store);
        let visible = if staff.role.has_cross_facility_visibility() {
            FacilityScope::All
        } else {
            scope
        };
        let facilities = match actions.list_facilities(visible).await.into_result() {
            Ok(list) => list.unwrap_or_default(),
            Err(message) => {
                warn!(%message, "facility list unavailable for page chrome");
                Vec::new()
            }
        };
        Ok(Self {
            staff,
            scope,
            facilities,
            actions,
        })
    }

    pub(crate) fn chrome<'a>(&'a self, current_path: &'a str, flash: &'a Flash) -> Chrome<'a> {
        Chrome {
            staff: &self.staff,
            scope: self.scope,
            facilities: &self.facilities,
            show_picker: self.staff.role.has_cross_facility_visibility(),
            current_path,
            flash,
        }
    }

    pub(crate) fn render_key(&self, path: &str) -> RenderKey {
        render_key(path, &self.staff, self.scope)
    }
}

pub(crate) fn render_key(path: &str, staff: &Staff, scope: FacilityScope) -> RenderKey {
    RenderKey::new(path, format!("{}:{}", staff.id, scope.cache_key()))
}

/// Fetch a cached fragment or render and store it.
///
/// `render` returns the fragment and whether it may be cached; failed list
/// loads are shown but never stored. The path generation is read before
/// rendering, so a write revalidated mid-render keeps its result out of the
/// cache.
pub(crate) async fn cached_fragment<F, Fut>(
    cache: &dyn PageCache,
    key: RenderKey,
    render: F,
) -> Markup
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = (Markup, bool)>,
{
    let generation = cache.generation(key.path()).await;
    if let Some(html) = cache.get(&key).await {
        return PreEscaped(html);
    }
    let (fragment, cacheable) = render().await;
    if cacheable {
        cache.put(key, fragment.0.clone(), generation).await;
    }
    fragment
}

#[cfg(test)]
mod tests;
