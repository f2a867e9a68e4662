//! OpenAPI documentation for the JSON surface.
//!
//! Pages are HTML and stay out of the document; it covers the server
//! actions, sign-in, and health probes. Action responses are described by the
//! envelope wrappers in [`crate::inbound::http::schemas`].
//!
//! The document backs Swagger UI in debug builds and is exported with
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::actions::{
    ClearFacilityRequest, CreateDailyRecordRequest, CreateFacilityRequest, CreateStaffRequest,
    SelectFacilityRequest,
};
use crate::inbound::http::login::LoginForm;
use crate::inbound::http::schemas::{ActionResultSchema, FacilitySelectionResultSchema};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for actions, sign-in, and probes.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Facility operations API",
        description = "Server actions for facilities, staff, and daily records. \
            Every action answers 200 with an ActionResult envelope."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::login::login,
        crate::inbound::http::login::logout,
        crate::inbound::http::actions::create_facility,
        crate::inbound::http::actions::delete_facility,
        crate::inbound::http::actions::create_staff,
        crate::inbound::http::actions::create_daily_record,
        crate::inbound::http::actions::select_facility_action,
        crate::inbound::http::actions::clear_facility_action,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ActionResultSchema,
        FacilitySelectionResultSchema,
        CreateFacilityRequest,
        CreateStaffRequest,
        CreateDailyRecordRequest,
        SelectFacilityRequest,
        ClearFacilityRequest,
        LoginForm,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "auth", description = "Sign-in and sign-out"),
        (name = "facilities", description = "Facility registry and facility selection"),
        (name = "staffs", description = "Staff registration"),
        (name = "daily-records", description = "Daily care records"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
