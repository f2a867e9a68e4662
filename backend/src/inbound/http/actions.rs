//! HTTP endpoints for server actions.
//!
//! ```text
//! POST /actions/facilities               {"name":"Sunrise","code":"F001"}
//! POST /actions/facilities/{id}/delete
//! POST /actions/staffs                   {"name":"山田","role":"staff","facilityId":null}
//! POST /actions/daily-records            {"recordDate":"2024-04-01","content":"..."}
//! POST /actions/select-facility          {"facilityId":"..."}
//! POST /actions/clear-facility
//! ```
//!
//! Every action answers with the [`ActionResult`] envelope and status 200,
//! whatever the outcome. JSON callers get the envelope as the body; browser
//! form posts are redirected back to the list page with the outcome in the
//! query string (`?notice=` or `?error=`).

use std::str::FromStr;

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::web::{self, Either};
use actix_web::{FromRequest, HttpRequest, HttpResponse, post};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::form_urlencoded;

use crate::domain::{
    ActionResult, DAILY_RECORDS_PATH, FACILITIES_PATH, FacilityHint, FacilityId, FacilityScope,
    INVALID_FACILITY_ID_MESSAGE, SAFE_DEFAULT_ROUTE, STAFFS_PATH, select_facility,
};
use crate::inbound::http::auth::{Requester, resolve_requester};
use crate::inbound::http::error::redact_if_internal;
use crate::inbound::http::facility_cookie::{clearing_cookie, facility_hint, preference_cookie};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const SAVED_NOTICE: &str = "保存しました";
const DELETED_NOTICE: &str = "削除しました";
const SWITCHED_NOTICE: &str = "表示施設を切り替えました";
/// Failure message for a body that is neither valid JSON nor a valid form.
pub const UNREADABLE_BODY_MESSAGE: &str = "送信内容を読み取れませんでした";

/// Either a JSON body or an urlencoded form with the same fields.
pub type Submission<T> = Either<web::Json<T>, web::Form<T>>;

/// A submission, or why its body could not be decoded. Extraction never
/// fails the request, so decoding errors still reach the envelope.
pub type Submitted<T> = Result<Submission<T>, <Submission<T> as FromRequest>::Error>;

fn into_inner<T>(submission: Submission<T>) -> T {
    match submission {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

fn read_body<T, R>(submitted: Submitted<T>) -> Result<T, ActionResult<R>>
where
    T: DeserializeOwned + 'static,
{
    submitted.map(into_inner).map_err(|error| {
        info!(error = ?error, "action body rejected");
        ActionResult::failure(UNREADABLE_BODY_MESSAGE)
    })
}

/// Request body for `POST /actions/facilities`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

/// Request body for `POST /actions/staffs`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    /// Home facility; ignored for managers, who always register into their own.
    #[serde(default, alias = "facility_id")]
    pub facility_id: Option<String>,
}

/// Request body for `POST /actions/daily-records`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDailyRecordRequest {
    #[serde(default, alias = "record_date")]
    pub record_date: String,
    #[serde(default)]
    pub content: String,
}

/// Request body for `POST /actions/select-facility`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectFacilityRequest {
    #[serde(default, alias = "facility_id")]
    pub facility_id: String,
    /// Page to return to after a form post.
    #[serde(default, alias = "return_to")]
    pub return_to: Option<String>,
}

/// Optional body for `POST /actions/clear-facility`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearFacilityRequest {
    #[serde(default, alias = "return_to")]
    pub return_to: Option<String>,
}

fn wants_json(req: &HttpRequest) -> bool {
    [header::CONTENT_TYPE, header::ACCEPT].iter().any(|name| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"))
    })
}

/// Local path to redirect to; anything that could leave the site is replaced
/// with `/`.
fn local_path(candidate: Option<&str>) -> &str {
    let path = candidate
        .map(|raw| raw.split(['?', '#']).next().unwrap_or_default())
        .unwrap_or_default();
    let is_local = path.starts_with('/')
        && !path.starts_with("//")
        && !path
            .chars()
            .any(|c| c == '\\' || c.is_control() || c.is_whitespace());
    if is_local { path } else { SAFE_DEFAULT_ROUTE }
}

fn log_outcome<T>(action: &'static str, result: &ActionResult<T>) {
    match result.error() {
        None => info!(action, "action succeeded"),
        Some(message) => warn!(action, error = message, "action failed"),
    }
}

fn reply<T: Serialize>(
    req: &HttpRequest,
    return_to: &str,
    notice: &str,
    result: &ActionResult<T>,
    cookie: Option<Cookie<'static>>,
) -> HttpResponse {
    let json = wants_json(req);
    let mut builder = if json {
        HttpResponse::Ok()
    } else {
        let mut query = form_urlencoded::Serializer::new(String::new());
        match result.error() {
            Some(message) => query.append_pair("error", message),
            None => query.append_pair("notice", notice),
        };
        let mut redirect = HttpResponse::SeeOther();
        redirect.insert_header((header::LOCATION, format!("{return_to}?{}", query.finish())));
        redirect
    };
    if let Some(cookie) = cookie {
        builder.cookie(cookie);
    }
    if json {
        builder.json(result)
    } else {
        builder.finish()
    }
}

async fn requester<T>(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Requester, ActionResult<T>> {
    resolve_requester(state, session).await.map_err(|error| {
        warn!(code = ?error.code(), message = error.message(), "could not resolve requester");
        ActionResult::failure(redact_if_internal(&error).message().to_owned())
    })
}

fn parse_facility_id(raw: &str) -> Result<FacilityId, ActionResult<()>> {
    FacilityId::from_str(raw).map_err(|_| ActionResult::failure(INVALID_FACILITY_ID_MESSAGE))
}

/// Register a facility.
#[utoipa::path(
    post,
    path = "/actions/facilities",
    request_body = CreateFacilityRequest,
    responses(
        (status = 200, description = "Action outcome", body = crate::inbound::http::schemas::ActionResultSchema),
        (status = 303, description = "Form post redirected back to /facilities")
    ),
    tags = ["facilities"],
    operation_id = "createFacility"
)]
#[post("/actions/facilities")]
pub async fn create_facility(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Submitted<CreateFacilityRequest>,
) -> HttpResponse {
    let result = match (read_body(payload), requester(&state, &session).await) {
        (Err(failure), _) | (_, Err(failure)) => failure,
        (Ok(request), Ok(requester)) => {
            state
                .actions(requester.store)
                .create_facility(requester.staff.as_ref(), &request.name, &request.code)
                .await
        }
    };
    log_outcome("create_facility", &result);
    reply(&req, FACILITIES_PATH, SAVED_NOTICE, &result, None)
}

/// Delete a facility (administrators only).
#[utoipa::path(
    post,
    path = "/actions/facilities/{id}/delete",
    params(("id" = String, Path, description = "Facility id")),
    responses(
        (status = 200, description = "Action outcome", body = crate::inbound::http::schemas::ActionResultSchema),
        (status = 303, description = "Form post redirected back to /facilities")
    ),
    tags = ["facilities"],
    operation_id = "deleteFacility"
)]
#[post("/actions/facilities/{id}/delete")]
pub async fn delete_facility(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let result = match (parse_facility_id(&path), requester(&state, &session).await) {
        (Err(failure), _) | (_, Err(failure)) => failure,
        (Ok(id), Ok(requester)) => {
            state
                .actions(requester.store)
                .delete_facility(requester.staff.as_ref(), id)
                .await
        }
    };
    log_outcome("delete_facility", &result);
    reply(&req, FACILITIES_PATH, DELETED_NOTICE, &result, None)
}

/// Register a staff member.
#[utoipa::path(
    post,
    path = "/actions/staffs",
    request_body = CreateStaffRequest,
    responses(
        (status = 200, description = "Action outcome", body = crate::inbound::http::schemas::ActionResultSchema),
        (status = 303, description = "Form post redirected back to /staffs")
    ),
    tags = ["staffs"],
    operation_id = "createStaff"
)]
#[post("/actions/staffs")]
pub async fn create_staff(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Submitted<CreateStaffRequest>,
) -> HttpResponse {
    let submission = read_body(payload).and_then(|request| {
        let facility_id = match request.facility_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_facility_id(raw)?),
        };
        Ok((request, facility_id))
    });
    let result = match (submission, requester(&state, &session).await) {
        (Err(failure), _) | (_, Err(failure)) => failure,
        (Ok((request, facility_id)), Ok(requester)) => {
            state
                .actions(requester.store)
                .create_staff(
                    requester.staff.as_ref(),
                    &request.name,
                    &request.role,
                    facility_id,
                )
                .await
        }
    };
    log_outcome("create_staff", &result);
    reply(&req, STAFFS_PATH, SAVED_NOTICE, &result, None)
}

/// Record a day's notes for the facility in scope.
#[utoipa::path(
    post,
    path = "/actions/daily-records",
    request_body = CreateDailyRecordRequest,
    responses(
        (status = 200, description = "Action outcome", body = crate::inbound::http::schemas::ActionResultSchema),
        (status = 303, description = "Form post redirected back to /daily-records")
    ),
    tags = ["daily-records"],
    operation_id = "createDailyRecord"
)]
#[post("/actions/daily-records")]
pub async fn create_daily_record(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Submitted<CreateDailyRecordRequest>,
) -> HttpResponse {
    let result = match (read_body(payload), requester(&state, &session).await) {
        (Err(failure), _) | (_, Err(failure)) => failure,
        (Ok(request), Ok(requester)) => {
            let scope = requester
                .staff
                .as_ref()
                .map_or(FacilityScope::Nothing, |staff| {
                    FacilityScope::resolve(staff, facility_hint(&req))
                });
            state
                .actions(requester.store)
                .create_daily_record(
                    requester.staff.as_ref(),
                    scope,
                    &request.record_date,
                    &request.content,
                )
                .await
        }
    };
    log_outcome("create_daily_record", &result);
    reply(&req, DAILY_RECORDS_PATH, SAVED_NOTICE, &result, None)
}

/// Remember the operator's facility choice in the preference cookie.
///
/// Only the shape of the id is checked here; every later read goes through
/// the server-side scope resolution.
#[utoipa::path(
    post,
    path = "/actions/select-facility",
    request_body = SelectFacilityRequest,
    responses(
        (status = 200, description = "Action outcome; sets the selected_facility_id cookie on success",
            body = crate::inbound::http::schemas::FacilitySelectionResultSchema),
        (status = 303, description = "Form post redirected back to the submitting page")
    ),
    tags = ["facilities"],
    operation_id = "selectFacility",
    security([])
)]
#[post("/actions/select-facility")]
pub async fn select_facility_action(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: Submitted<SelectFacilityRequest>,
) -> HttpResponse {
    let (return_to, result) = match read_body(payload) {
        Ok(request) => (request.return_to, select_facility(&request.facility_id)),
        Err(failure) => (None, failure),
    };
    let cookie = result.data().map(|id| {
        preference_cookie(FacilityHint::from_facility(*id), state.cookie_secure)
    });
    log_outcome("select_facility", &result);
    reply(
        &req,
        local_path(return_to.as_deref()),
        SWITCHED_NOTICE,
        &result,
        cookie,
    )
}

/// Forget the facility choice so administrators see every facility again.
#[utoipa::path(
    post,
    path = "/actions/clear-facility",
    responses(
        (status = 200, description = "Action outcome; expires the selected_facility_id cookie",
            body = crate::inbound::http::schemas::ActionResultSchema),
        (status = 303, description = "Form post redirected back to the submitting page")
    ),
    tags = ["facilities"],
    operation_id = "clearFacility",
    security([])
)]
#[post("/actions/clear-facility")]
pub async fn clear_facility_action(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: Option<Submission<ClearFacilityRequest>>,
) -> HttpResponse {
    let request = payload.map(into_inner).unwrap_or_default();
    let result = ActionResult::<()>::success_empty();
    reply(
        &req,
        local_path(request.return_to.as_deref()),
        SWITCHED_NOTICE,
        &result,
        Some(clearing_cookie(state.cookie_secure)),
    )
}

#[cfg(test)]
mod tests;
