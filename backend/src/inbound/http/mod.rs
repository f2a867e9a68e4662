//! HTTP inbound adapter: server-rendered pages, form/JSON actions, sign-in,
//! and health probes.

use actix_web::web;

pub mod actions;
pub mod auth;
pub mod error;
pub mod facility_cookie;
pub mod health;
pub mod login;
pub mod pages;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

/// Register every page, action, and sign-in route.
///
/// The caller wraps the scope in the session middleware and provides
/// [`state::HttpState`] as app data. Health probes are registered separately
/// so they bypass sessions.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use facility_ops::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login::login_page)
        .service(login::login)
        .service(login::logout)
        .service(pages::dashboard_page)
        .service(pages::facilities_page)
        .service(pages::staffs_page)
        .service(pages::daily_records_page)
        .service(actions::create_facility)
        .service(actions::delete_facility)
        .service(actions::create_staff)
        .service(actions::create_daily_record)
        .service(actions::select_facility_action)
        .service(actions::clear_facility_action);
}
