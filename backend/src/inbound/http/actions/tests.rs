//! Envelope and redirect behaviour of the action endpoints.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{PageCache, RenderKey};
use crate::domain::{FACILITY_COOKIE_NAME, FORBIDDEN_MESSAGE, LOGIN_REQUIRED_MESSAGE};
use crate::inbound::http::test_utils::{
    fixture_login_route, fixture_state, session_cookie, test_session_middleware,
};
use crate::outbound::memory_store::SUNRISE_FACILITY;

macro_rules! action_app {
    ($state:expr) => {
        actix_test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(test_session_middleware())
                .route("/test-login/{email}", fixture_login_route())
                .service(create_facility)
                .service(delete_facility)
                .service(create_staff)
                .service(create_daily_record)
                .service(select_facility_action)
                .service(clear_facility_action),
        )
        .await
    };
}

macro_rules! sign_in {
    ($app:expr, $email:expr) => {{
        let res = actix_test::call_service(
            &$app,
            actix_test::TestRequest::get()
                .uri(&format!("/test-login/{}", $email))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        session_cookie(&res)
    }};
}

fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

#[rstest]
#[case(Some("/staffs"), "/staffs")]
#[case(Some("/daily-records?notice=x"), "/daily-records")]
#[case(Some("//evil.example"), "/")]
#[case(Some("https://evil.example/"), "/")]
#[case(Some("/\\evil.example"), "/")]
#[case(Some("/\t/evil.example"), "/")]
#[case(Some("/\n/evil.example"), "/")]
#[case(Some("/\r\n/evil.example"), "/")]
#[case(Some("/ /evil.example"), "/")]
#[case(Some(""), "/")]
#[case(None, "/")]
fn return_paths_stay_on_site(#[case] candidate: Option<&str>, #[case] expected: &str) {
    assert_eq!(local_path(candidate), expected);
}

#[actix_web::test]
async fn anonymous_json_post_returns_failure_envelope() {
    let app = action_app!(fixture_state());
    let req = actix_test::TestRequest::post()
        .uri("/actions/facilities")
        .set_json(json!({"name": "Bayside", "code": "F010"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!({"success": false, "error": LOGIN_REQUIRED_MESSAGE}));
}

#[actix_web::test]
async fn admin_creates_facility_and_cached_list_is_dropped() {
    let state = fixture_state();
    let cache = Arc::clone(&state.cache);
    cache
        .put(
            RenderKey::new(FACILITIES_PATH, "stale"),
            "<p>old</p>".to_owned(),
            cache.generation(FACILITIES_PATH).await,
        )
        .await;
    let app = action_app!(state);
    let cookie = sign_in!(app, "admin@example.com");

    let req = actix_test::TestRequest::post()
        .uri("/actions/facilities")
        .cookie(cookie)
        .set_json(json!({"name": "Bayside", "code": "F010"}))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"success": true}));
    assert!(
        cache
            .get(&RenderKey::new(FACILITIES_PATH, "stale"))
            .await
            .is_none()
    );
}

#[actix_web::test]
async fn form_post_redirects_with_error_in_query() {
    let app = action_app!(fixture_state());
    let cookie = sign_in!(app, "staff@example.com");

    let req = actix_test::TestRequest::post()
        .uri("/actions/facilities")
        .cookie(cookie)
        .set_form([("name", "Bayside"), ("code", "F010")])
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let expected: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("error", FORBIDDEN_MESSAGE)
        .finish();
    assert_eq!(location(&res), Some(format!("/facilities?{expected}")));
}

#[actix_web::test]
async fn malformed_facility_id_is_rejected_before_the_store() {
    let app = action_app!(fixture_state());
    let cookie = sign_in!(app, "admin@example.com");

    let req = actix_test::TestRequest::post()
        .uri("/actions/facilities/F001/delete")
        .cookie(cookie)
        .insert_header((header::ACCEPT, "application/json"))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({"success": false, "error": INVALID_FACILITY_ID_MESSAGE})
    );
}

#[actix_web::test]
async fn staff_facility_must_be_a_uuid() {
    let app = action_app!(fixture_state());
    let cookie = sign_in!(app, "admin@example.com");

    let req = actix_test::TestRequest::post()
        .uri("/actions/staffs")
        .cookie(cookie)
        .set_json(json!({"name": "新人", "role": "staff", "facilityId": "F001"}))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({"success": false, "error": INVALID_FACILITY_ID_MESSAGE})
    );
}

#[actix_web::test]
async fn care_staff_records_into_their_own_facility() {
    let app = action_app!(fixture_state());
    let cookie = sign_in!(app, "staff@example.com");

    let req = actix_test::TestRequest::post()
        .uri("/actions/daily-records")
        .cookie(cookie)
        .set_json(json!({"recordDate": "2024-04-01", "content": "午前 散歩"}))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"success": true}));
}

#[actix_web::test]
async fn selecting_a_facility_sets_the_preference_cookie() {
    let app = action_app!(fixture_state());
    let req = actix_test::TestRequest::post()
        .uri("/actions/select-facility")
        .set_json(json!({"facilityId": SUNRISE_FACILITY.to_string()}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == FACILITY_COOKIE_NAME)
        .map(Cookie::into_owned)
        .unwrap_or_else(|| panic!("preference cookie set"));
    assert_eq!(cookie.value(), SUNRISE_FACILITY.to_string());
    assert_eq!(cookie.http_only(), Some(true));

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({"success": true, "data": SUNRISE_FACILITY.to_string()})
    );
}

#[rstest]
#[case("")]
#[case("F001")]
#[actix_web::test]
async fn invalid_selection_leaves_cookie_untouched(#[case] raw: &str) {
    let app = action_app!(fixture_state());
    let req = actix_test::TestRequest::post()
        .uri("/actions/select-facility")
        .set_json(json!({"facilityId": raw}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert!(
        res.response()
            .cookies()
            .all(|cookie| cookie.name() != FACILITY_COOKIE_NAME)
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({"success": false, "error": INVALID_FACILITY_ID_MESSAGE})
    );
}

#[actix_web::test]
async fn selection_form_returns_to_a_local_page_only() {
    let app = action_app!(fixture_state());
    let facility = SUNRISE_FACILITY.to_string();
    let req = actix_test::TestRequest::post()
        .uri("/actions/select-facility")
        .set_form([
            ("facility_id", facility.as_str()),
            ("return_to", "//evil.example/staffs"),
        ])
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).is_some_and(|target| target.starts_with("/?notice=")));
}

#[actix_web::test]
async fn clearing_the_selection_expires_the_cookie() {
    let app = action_app!(fixture_state());
    let req = actix_test::TestRequest::post()
        .uri("/actions/clear-facility")
        .set_form([("return_to", "/daily-records")])
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).is_some_and(|target| target.starts_with("/daily-records?notice=")));
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == FACILITY_COOKIE_NAME)
        .map(Cookie::into_owned)
        .unwrap_or_else(|| panic!("removal cookie set"));
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn undecodable_json_body_fails_inside_the_envelope() {
    let app = action_app!(fixture_state());
    let cookie = sign_in!(app, "admin@example.com");

    let req = actix_test::TestRequest::post()
        .uri("/actions/facilities")
        .cookie(cookie)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"name": 5, "code": "F001"}"#)
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({"success": false, "error": UNREADABLE_BODY_MESSAGE})
    );
}

#[actix_web::test]
async fn body_without_content_type_redirects_with_error() {
    let app = action_app!(fixture_state());
    let cookie = sign_in!(app, "admin@example.com");

    let req = actix_test::TestRequest::post()
        .uri("/actions/daily-records")
        .cookie(cookie)
        .set_payload("recordDate=2026-10-01&content=x")
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let target = location(&res).expect("location");
    assert!(target.starts_with("/daily-records?error="), "{target}");
}

#[actix_web::test]
async fn undecodable_selection_leaves_cookie_untouched() {
    let app = action_app!(fixture_state());
    let req = actix_test::TestRequest::post()
        .uri("/actions/select-facility")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"facilityId": 7}"#)
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert!(
        res.response()
            .cookies()
            .all(|cookie| cookie.name() != FACILITY_COOKIE_NAME)
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("error"), Some(&json!(UNREADABLE_BODY_MESSAGE)));
}
