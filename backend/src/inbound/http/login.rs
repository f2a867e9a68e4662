//! Sign-in and sign-out.
//!
//! ```text
//! GET  /login
//! POST /login   email=admin@example.com&password=password
//! POST /logout
//! ```

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, get, post, web};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::ports::{AuthProviderError, INVALID_LOGIN_MESSAGE};
use crate::domain::{LOGIN_ROUTE, LoginCredentials, LoginValidationError, SAFE_DEFAULT_ROUTE};
use crate::inbound::http::auth::get_current_staff;
use crate::inbound::http::pages::layout::{alert, bare_page};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const UNAVAILABLE_MESSAGE: &str = "認証サービスに接続できませんでした。時間をおいて再度お試しください。";

/// Sign-in form fields.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<&LoginForm> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginForm) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn login_form(email: &str, message: Option<&str>) -> Markup {
    bare_page(
        "ログイン",
        html! {
            @if let Some(message) = message {
                (alert(message))
            }
            form method="post" action=(LOGIN_ROUTE) class="login" {
                label {
                    "メールアドレス"
                    input type="email" name="email" value=(email) autocomplete="username" required;
                }
                label {
                    "パスワード"
                    input type="password" name="password" autocomplete="current-password" required;
                }
                button type="submit" { "ログイン" }
            }
        },
    )
}

fn render_form(status: StatusCode, email: &str, message: Option<&str>) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(login_form(email, message).into_string())
}

fn see_other(target: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, target))
        .finish()
}

/// Sign-in form; visitors who are already signed in go to the dashboard.
#[get("/login")]
pub async fn login_page(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    match get_current_staff(&state, &session).await {
        Ok(Some(_)) => see_other(SAFE_DEFAULT_ROUTE),
        Ok(None) => render_form(StatusCode::OK, "", None),
        Err(error) => {
            warn!(code = ?error.code(), message = error.message(), "could not check existing session");
            render_form(StatusCode::OK, "", None)
        }
    }
}

/// Exchange email and password for a session.
///
/// The provider's own wording for bad credentials is never shown; every
/// refusal reads as [`INVALID_LOGIN_MESSAGE`].
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; redirected to the dashboard",
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Authentication service unavailable")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> HttpResponse {
    let credentials = match LoginCredentials::try_from(&*form) {
        Ok(credentials) => credentials,
        Err(error) => {
            return render_form(StatusCode::BAD_REQUEST, &form.email, Some(&error.to_string()));
        }
    };

    match state.auth.sign_in(&credentials).await {
        Ok(login) => match session.persist_login(&login) {
            Ok(()) => {
                info!(user_id = %login.user_id, "operator signed in");
                see_other(SAFE_DEFAULT_ROUTE)
            }
            Err(error) => {
                warn!(message = error.message(), "could not persist session");
                render_form(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &form.email,
                    Some(UNAVAILABLE_MESSAGE),
                )
            }
        },
        Err(AuthProviderError::Transport { message }) => {
            warn!(error = %message, "auth provider unreachable");
            render_form(
                StatusCode::SERVICE_UNAVAILABLE,
                &form.email,
                Some(UNAVAILABLE_MESSAGE),
            )
        }
        Err(error) => {
            info!(error = %error, "sign-in refused");
            render_form(
                StatusCode::UNAUTHORIZED,
                &form.email,
                Some(INVALID_LOGIN_MESSAGE),
            )
        }
    }
}

/// End the session and return to the sign-in form.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Session cleared; redirected to /login")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    see_other(LOGIN_ROUTE)
}
