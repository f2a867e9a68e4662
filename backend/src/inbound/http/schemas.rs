//! OpenAPI schema definitions for the action envelope.
//!
//! [`crate::domain::ActionResult`] serialises through a hand-written envelope
//! so its shape cannot be derived. The wrappers below describe that shape for
//! each payload the JSON action endpoints return; they live in the inbound
//! adapter because only the OpenAPI document needs them.

use utoipa::ToSchema;

/// Envelope returned by actions that carry no payload.
///
/// `error` is present exactly when `success` is `false`.
#[derive(ToSchema)]
#[schema(as = ActionResult)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ActionResultSchema {
    /// Whether the action completed.
    #[schema(example = true)]
    success: bool,
    /// Reason for failure, suitable for display to operators.
    #[schema(example = "施設名と施設コードは必須です")]
    error: Option<String>,
}

/// Envelope returned by `POST /actions/select-facility`.
#[derive(ToSchema)]
#[schema(as = FacilitySelectionResult)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FacilitySelectionResultSchema {
    #[schema(example = true)]
    success: bool,
    /// The facility id written to the preference cookie.
    #[schema(value_type = Option<String>, format = Uuid,
        example = "f0010000-0000-4000-8000-000000000001")]
    data: Option<String>,
    #[schema(example = "施設IDが不正です")]
    error: Option<String>,
}
