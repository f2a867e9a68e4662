//! HTTP mapping for domain errors.
//!
//! Pages render errors as HTML (see [`super::pages::PageError`]); sign-in,
//! probes and extractor failures answer with the JSON [`Error`] payload.
//! Actions never reach this path: their failures travel inside the
//! `ActionResult` envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, info};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for handlers that fail with a domain [`Error`].
pub type ApiResult<T> = Result<T, Error>;

/// Message shown instead of internal error detail.
pub const REDACTED_MESSAGE: &str = "システムエラーが発生しました。時間をおいて再度お試しください";

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Copy of `error` safe to show: internal failures lose their message and
/// details but keep the trace id so operators can find the log line.
pub(crate) fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

/// Extractor and middleware failures.
///
/// Malformed form or JSON bodies are the caller's fault and keep their
/// message; anything actix reports as a server error is hidden.
impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        if status.is_client_error() {
            info!(error = %err, %status, "request rejected by extractor");
            return Self::invalid_request(err.to_string());
        }
        error!(error = %err, %status, "actix error promoted to domain error");
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests;
