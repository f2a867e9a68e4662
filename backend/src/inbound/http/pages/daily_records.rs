//! `GET /daily-records`: daily care records for the facility in scope.

use actix_web::{HttpRequest, get, web};
use maud::{Markup, html};

use super::layout::{alert, page};
use super::{Flash, PageContext, PageError, cached_fragment};
use crate::domain::{
    ActionResult, AllowedRoles, DAILY_RECORD_MAX_CHARS, DAILY_RECORDS_PATH, DailyRecord, Facility,
    SELECT_FACILITY_MESSAGE,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn record_list(result: &ActionResult<Vec<DailyRecord>>, facilities: &[Facility]) -> Markup {
    match result.data() {
        Some(records) if !records.is_empty() => html! {
            ol class="records" {
                @for record in records {
                    li {
                        h3 {
                            time datetime=(record.record_date.to_string()) {
                                (record.record_date.format("%Y年%m月%d日").to_string())
                            }
                            @if let Some(facility) = facilities.iter().find(|f| f.id == record.facility_id) {
                                " " small { (facility.name) }
                            }
                        }
                        p { (record.content) }
                    }
                }
            }
        },
        Some(_) => html! { p { "記録はまだありません" } },
        None => alert(result.error().unwrap_or_default()),
    }
}

fn create_form() -> Markup {
    html! {
        form method="post" action="/actions/daily-records" class="create" {
            h2 { "記録を追加" }
            label { "記録日" input type="date" name="record_date" required; }
            label {
                "内容"
                textarea name="content" maxlength=(DAILY_RECORD_MAX_CHARS) required {}
            }
            button type="submit" { "保存" }
        }
    }
}

/// Records visible in the caller's scope, newest first.
///
/// The create form is only offered once a single facility is in scope.
#[get("/daily-records")]
pub async fn daily_records_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    flash: web::Query<Flash>,
) -> Result<Markup, PageError> {
    let context = PageContext::load(&state, &session, &req, &AllowedRoles::ANY_STAFF).await?;
    let list = cached_fragment(
        state.cache.as_ref(),
        context.render_key(DAILY_RECORDS_PATH),
        || async {
            let result = context.actions.list_daily_records(context.scope).await;
            (
                record_list(&result, &context.facilities),
                result.is_success(),
            )
        },
    )
    .await;
    let form = if context.scope.single().is_some() {
        create_form()
    } else {
        html! { p class="hint" { (SELECT_FACILITY_MESSAGE) } }
    };

    Ok(page(
        "業務日誌",
        &context.chrome(DAILY_RECORDS_PATH, &flash),
        html! {
            (form)
            (list)
        },
    ))
}
