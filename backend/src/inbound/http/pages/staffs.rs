//! `GET /staffs`: staff roster (administrators and managers).

use actix_web::{HttpRequest, get, web};
use maud::{Markup, html};

use super::layout::{alert, page};
use super::{Flash, PageContext, PageError, cached_fragment};
use crate::domain::{ActionResult, AllowedRoles, Facility, Role, STAFFS_PATH, Staff};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn facility_name(facilities: &[Facility], staff: &Staff) -> String {
    match staff.facility_id {
        None => "本部".to_owned(),
        Some(id) => facilities
            .iter()
            .find(|facility| facility.id == id)
            .map_or_else(|| id.to_string(), |facility| facility.name.clone()),
    }
}

fn staff_table(result: &ActionResult<Vec<Staff>>, facilities: &[Facility]) -> Markup {
    match result.data() {
        Some(roster) if !roster.is_empty() => html! {
            table {
                thead { tr { th { "氏名" } th { "役割" } th { "所属施設" } } }
                tbody {
                    @for member in roster {
                        tr {
                            td { (member.name) }
                            td { (member.role.label()) }
                            td { (facility_name(facilities, member)) }
                        }
                    }
                }
            }
        },
        Some(_) => html! { p { "登録されたスタッフはいません" } },
        None => alert(result.error().unwrap_or_default()),
    }
}

fn create_form(actor: Role, facilities: &[Facility]) -> Markup {
    let is_admin = actor.has_cross_facility_visibility();
    html! {
        form method="post" action="/actions/staffs" class="create" {
            h2 { "スタッフを追加" }
            label { "氏名" input type="text" name="name" required; }
            label {
                "役割"
                select name="role" {
                    option value=(Role::Staff.as_str()) { (Role::Staff.label()) }
                    option value=(Role::Manager.as_str()) { (Role::Manager.label()) }
                    @if is_admin {
                        option value=(Role::Admin.as_str()) { (Role::Admin.label()) }
                    }
                }
            }
            @if is_admin {
                label {
                    "所属施設"
                    select name="facility_id" {
                        option value="" { "本部（施設なし）" }
                        @for facility in facilities {
                            option value=(facility.id.to_string()) { (facility.name) }
                        }
                    }
                }
            }
            button type="submit" { "登録" }
        }
    }
}

/// Staff roster scoped to the caller's facilities, with a create form.
#[get("/staffs")]
pub async fn staffs_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    flash: web::Query<Flash>,
) -> Result<Markup, PageError> {
    let context = PageContext::load(&state, &session, &req, &AllowedRoles::MANAGEMENT).await?;
    let list = cached_fragment(
        state.cache.as_ref(),
        context.render_key(STAFFS_PATH),
        || async {
            let result = context.actions.list_staff(context.scope).await;
            (
                staff_table(&result, &context.facilities),
                result.is_success(),
            )
        },
    )
    .await;

    Ok(page(
        "スタッフ管理",
        &context.chrome(STAFFS_PATH, &flash),
        html! {
            (list)
            (create_form(context.staff.role, &context.facilities))
        },
    ))
}
