//! `GET /facilities`: facility master list (administrators and managers).

use actix_web::{HttpRequest, get, web};
use maud::{Markup, html};

use super::layout::{alert, page};
use super::{Flash, PageContext, PageError, cached_fragment};
use crate::domain::{ActionResult, AllowedRoles, FACILITIES_PATH, Facility, Role};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn facility_table(result: &ActionResult<Vec<Facility>>, role: Role) -> Markup {
    let can_delete = AllowedRoles::ADMIN_ONLY.permits(role);
    match result.data() {
        Some(facilities) if !facilities.is_empty() => html! {
            table {
                thead { tr { th { "施設コード" } th { "施設名" } th { "登録日" } @if can_delete { th {} } } }
                tbody {
                    @for facility in facilities {
                        tr {
                            td { (facility.code) }
                            td { (facility.name) }
                            td {
                                @if let Some(created) = facility.created_at {
                                    (created.format("%Y-%m-%d").to_string())
                                }
                            }
                            @if can_delete {
                                td {
                                    form method="post"
                                        action=(format!("/actions/facilities/{}/delete", facility.id)) {
                                        button type="submit" { "削除" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
        Some(_) => html! { p { "登録された施設はありません" } },
        None => alert(result.error().unwrap_or_default()),
    }
}

fn create_form() -> Markup {
    html! {
        form method="post" action="/actions/facilities" class="create" {
            h2 { "施設を追加" }
            label { "施設名" input type="text" name="name" required; }
            label { "施設コード" input type="text" name="code" required; }
            button type="submit" { "登録" }
        }
    }
}

/// Facility master list with create and (for administrators) delete forms.
#[get("/facilities")]
pub async fn facilities_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    flash: web::Query<Flash>,
) -> Result<Markup, PageError> {
    let context = PageContext::load(&state, &session, &req, &AllowedRoles::MANAGEMENT).await?;
    let role = context.staff.role;
    let list = cached_fragment(
        state.cache.as_ref(),
        context.render_key(FACILITIES_PATH),
        || async {
            let result = context.actions.list_facilities(context.scope).await;
            (facility_table(&result, role), result.is_success())
        },
    )
    .await;

    Ok(page(
        "施設管理",
        &context.chrome(FACILITIES_PATH, &flash),
        html! {
            (list)
            (create_form())
        },
    ))
}
