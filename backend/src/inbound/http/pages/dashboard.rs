//! `GET /`: landing page for any signed-in role.

use actix_web::{HttpRequest, get, web};
use maud::{Markup, html};

use super::layout::{page, scope_label};
use super::{Flash, PageContext, PageError};
use crate::domain::{AllowedRoles, FacilityScope, SAFE_DEFAULT_ROUTE};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Principal summary and effective facility scope.
#[get("/")]
pub async fn dashboard_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    flash: web::Query<Flash>,
) -> Result<Markup, PageError> {
    let context = PageContext::load(&state, &session, &req, &AllowedRoles::ANY_STAFF).await?;
    let staff = &context.staff;
    let body = html! {
        dl class="summary" {
            dt { "氏名" } dd { (staff.name) }
            dt { "役割" } dd { (staff.role.label()) }
            dt { "表示範囲" } dd { (scope_label(context.scope, &context.facilities)) }
        }
        @match context.scope {
            FacilityScope::Nothing => {
                p class="hint" { "所属施設が設定されていません。管理者に連絡してください。" }
            }
            FacilityScope::All => {
                p class="hint" { "施設を選択すると、その施設の記録だけを表示します。" }
            }
            FacilityScope::Single(_) => {}
        }
    };

    Ok(page(
        "ダッシュボード",
        &context.chrome(SAFE_DEFAULT_ROUTE, &flash),
        body,
    ))
}
