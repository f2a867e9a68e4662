//! Page error rendering and the render-cache helper.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::body::to_bytes;
use maud::html;
use rstest::rstest;
use uuid::Uuid;

use super::*;
use crate::domain::{FacilityId, Role, StaffId};
use crate::outbound::cache::InMemoryPageCache;

fn staff() -> Staff {
    Staff {
        id: StaffId::from_uuid(Uuid::nil()),
        name: "佐藤 一郎".to_owned(),
        facility_id: None,
        role: Role::Admin,
    }
}

#[rstest]
#[actix_web::test]
async fn redirect_sets_location() {
    let response = PageError::Redirect("/login").error_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/login")
    );
}

#[rstest]
#[actix_web::test]
async fn failures_render_a_redacted_error_page() {
    let failure = Error::internal("column staffs.role does not exist").with_trace_id("trace-1");
    let response = PageError::Failed(failure).error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(response.into_body()).await.expect("body");
    let html = String::from_utf8(body.to_vec()).expect("utf8");
    assert!(html.contains("エラーが発生しました"));
    assert!(html.contains("trace-1"));
    assert!(!html.contains("staffs.role"));
}

#[rstest]
#[case(FacilityScope::All, "all")]
#[case(FacilityScope::Nothing, "none")]
fn render_keys_partition_by_staff_and_scope(#[case] scope: FacilityScope, #[case] suffix: &str) {
    let key = render_key("/staffs", &staff(), scope);
    assert_eq!(key.path(), "/staffs");
    assert_eq!(key.variant(), format!("{}:{suffix}", Uuid::nil()));
}

#[rstest]
fn single_scope_keys_differ_per_facility() {
    let a = render_key("/daily-records", &staff(), FacilityScope::Single(FacilityId::random()));
    let b = render_key("/daily-records", &staff(), FacilityScope::Single(FacilityId::random()));
    assert_ne!(a, b);
}

#[rstest]
#[actix_web::test]
async fn cached_fragment_renders_once_until_revalidated() {
    let cache = InMemoryPageCache::new();
    let renders = Arc::new(AtomicUsize::new(0));
    let key = || RenderKey::new("/facilities", "k");
    let render = |renders: Arc<AtomicUsize>| async move {
        renders.fetch_add(1, Ordering::SeqCst);
        (html! { p { "list" } }, true)
    };

    let first = cached_fragment(&cache, key(), || render(Arc::clone(&renders))).await;
    let second = cached_fragment(&cache, key(), || render(Arc::clone(&renders))).await;
    assert_eq!(first.into_string(), second.into_string());
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    cache.revalidate("/facilities").await;
    cached_fragment(&cache, key(), || render(Arc::clone(&renders))).await;
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

#[rstest]
#[actix_web::test]
async fn failed_renders_are_not_cached() {
    let cache = InMemoryPageCache::new();
    cached_fragment(&cache, RenderKey::new("/staffs", "k"), || async {
        (html! { p { "failed" } }, false)
    })
    .await;
    assert!(cache.is_empty());
}

#[rstest]
#[actix_web::test]
async fn render_overtaken_by_a_write_is_not_cached() {
    let cache = Arc::new(InMemoryPageCache::new());
    let key = RenderKey::new("/facilities", "k");

    let writer = Arc::clone(&cache);
    let shown = cached_fragment(cache.as_ref(), key.clone(), || async move {
        let list = html! { p { "old list" } };
        writer.revalidate("/facilities").await;
        (list, true)
    })
    .await;

    assert_eq!(shown.into_string(), "<p>old list</p>");
    assert!(cache.get(&key).await.is_none());
}
