//! Shared page chrome: document shell, navigation, facility picker, alerts.

use maud::{DOCTYPE, Markup, html};

use crate::domain::{
    AllowedRoles, DAILY_RECORDS_PATH, Error, FACILITIES_PATH, Facility, FacilityScope,
    SAFE_DEFAULT_ROUTE, STAFFS_PATH, Staff,
};

use super::Flash;

struct NavItem {
    path: &'static str,
    label: &'static str,
    allowed: AllowedRoles,
}

static NAV: [NavItem; 4] = [
    NavItem {
        path: SAFE_DEFAULT_ROUTE,
        label: "ダッシュボード",
        allowed: AllowedRoles::ANY_STAFF,
    },
    NavItem {
        path: FACILITIES_PATH,
        label: "施設管理",
        allowed: AllowedRoles::MANAGEMENT,
    },
    NavItem {
        path: STAFFS_PATH,
        label: "スタッフ管理",
        allowed: AllowedRoles::MANAGEMENT,
    },
    NavItem {
        path: DAILY_RECORDS_PATH,
        label: "業務日誌",
        allowed: AllowedRoles::ANY_STAFF,
    },
];

/// Everything the chrome needs to know about the current request.
pub(crate) struct Chrome<'a> {
    pub staff: &'a Staff,
    pub scope: FacilityScope,
    /// Facilities visible to the principal.
    pub facilities: &'a [Facility],
    /// Whether the facility picker is offered.
    pub show_picker: bool,
    pub current_path: &'a str,
    pub flash: &'a Flash,
}

fn document(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ja" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | 施設運営" }
            }
            body { (body) }
        }
    }
}

/// Human label for a scope, naming the facility when one is known.
pub(crate) fn scope_label(scope: FacilityScope, facilities: &[Facility]) -> String {
    match scope {
        FacilityScope::All => "全施設".to_owned(),
        FacilityScope::Nothing => "所属施設なし".to_owned(),
        FacilityScope::Single(id) => facilities
            .iter()
            .find(|facility| facility.id == id)
            .map_or_else(|| id.to_string(), |facility| facility.name.clone()),
    }
}

fn picker(chrome: &Chrome<'_>) -> Markup {
    let selected = chrome.scope.single();
    html! {
        form method="post" action="/actions/select-facility" class="facility-picker" {
            input type="hidden" name="return_to" value=(chrome.current_path);
            label for="facility_id" { "表示施設" }
            select id="facility_id" name="facility_id" {
                @for facility in chrome.facilities {
                    option value=(facility.id.to_string()) selected[selected == Some(facility.id)] {
                        (facility.code) " " (facility.name)
                    }
                }
            }
            button type="submit" { "切り替え" }
        }
        @if selected.is_some() {
            form method="post" action="/actions/clear-facility" {
                input type="hidden" name="return_to" value=(chrome.current_path);
                button type="submit" { "全施設を表示" }
            }
        }
    }
}

/// Inline failure message.
pub(crate) fn alert(message: &str) -> Markup {
    html! { p class="alert" role="alert" { (message) } }
}

fn flash(flash: &Flash) -> Markup {
    html! {
        @if let Some(notice) = &flash.notice {
            p class="notice" role="status" { (notice) }
        }
        @if let Some(error) = &flash.error {
            (alert(error))
        }
    }
}

/// Full page for a signed-in operator.
pub(crate) fn page(title: &str, chrome: &Chrome<'_>, body: Markup) -> Markup {
    let role = chrome.staff.role;
    document(
        title,
        html! {
            header {
                nav {
                    @for item in &NAV {
                        @if item.allowed.permits(role) {
                            a href=(item.path)
                                aria-current=[(item.path == chrome.current_path).then_some("page")] {
                                (item.label)
                            }
                        }
                    }
                }
                p class="principal" {
                    (chrome.staff.name) " (" (role.label()) ") / "
                    (scope_label(chrome.scope, chrome.facilities))
                }
                @if chrome.show_picker {
                    (picker(chrome))
                }
                form method="post" action="/logout" {
                    button type="submit" { "ログアウト" }
                }
            }
            main {
                h1 { (title) }
                (flash(chrome.flash))
                (body)
            }
        },
    )
}

/// Page without navigation, used before sign-in.
pub(crate) fn bare_page(title: &str, body: Markup) -> Markup {
    document(
        title,
        html! {
            main {
                h1 { (title) }
                (body)
            }
        },
    )
}

/// Generic failure page; never a partial render of the requested page.
pub(crate) fn error_page(error: &Error) -> Markup {
    bare_page(
        "エラーが発生しました",
        html! {
            (alert("ページを表示できませんでした。時間をおいて再度お試しください。"))
            p { (error.message()) }
            @if let Some(trace_id) = error.trace_id() {
                p class="trace" { "トレースID: " code { (trace_id) } }
            }
            a href=(SAFE_DEFAULT_ROUTE) { "ダッシュボードへ戻る" }
        },
    )
}
