//! Uniform success/failure envelope returned by every server action.
//!
//! Callers never distinguish a thrown error from a returned one: validation
//! failures, authorisation refusals, and hosted-store errors all come back as
//! [`ActionResult::Failure`] with a human-readable message.
//!
//! Wire shape:
//!
//! ```text
//! {"success":true,"data":...}
//! {"success":false,"error":"施設名と施設コードは必須です"}
//! ```

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Message used when a failure is constructed with a blank message.
pub const GENERIC_FAILURE_MESSAGE: &str = "予期しないエラーが発生しました";

/// Outcome of one server action invocation.
///
/// ## Invariants
/// - A success never carries an error message.
/// - A failure never carries data and its message is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult<T> {
    /// The action completed; `data` is optional.
    Success(Option<T>),
    /// The action failed with a human-readable message.
    Failure(String),
}

/// Build a successful result carrying `data`.
pub fn success_response<T>(data: T) -> ActionResult<T> {
    ActionResult::Success(Some(data))
}

/// Build a failed result with `message`.
pub fn error_response<T>(message: impl Into<String>) -> ActionResult<T> {
    ActionResult::failure(message)
}

impl<T> ActionResult<T> {
    /// Successful result carrying `data`.
    pub fn success(data: T) -> Self {
        Self::Success(Some(data))
    }

    /// Successful result without data.
    pub fn success_empty() -> Self {
        Self::Success(None)
    }

    /// Failed result; blank messages are replaced with
    /// [`GENERIC_FAILURE_MESSAGE`].
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Failure(GENERIC_FAILURE_MESSAGE.to_owned())
        } else {
            Self::Failure(message)
        }
    }

    /// Whether the action succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Borrow the success payload, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => data.as_ref(),
            Self::Failure(_) => None,
        }
    }

    /// Borrow the failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message.as_str()),
        }
    }

    /// Transform the success payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResult<U> {
        match self {
            Self::Success(data) => ActionResult::Success(data.map(f)),
            Self::Failure(message) => ActionResult::Failure(message),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<Option<T>, String> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(message) => Err(message),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let envelope = match self {
            Self::Success(data) => EnvelopeRef {
                success: true,
                data: data.as_ref(),
                error: None,
            },
            Self::Failure(message) => EnvelopeRef {
                success: false,
                data: None,
                error: Some(message.as_str()),
            },
        };
        envelope.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ActionResult<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Envelope {
            success,
            data,
            error,
        } = Envelope::deserialize(deserializer)?;
        match (success, data, error) {
            (true, data, None) => Ok(Self::Success(data)),
            (true, _, Some(_)) => Err(de::Error::custom("successful result must not carry an error")),
            (false, None, Some(message)) if !message.trim().is_empty() => Ok(Self::Failure(message)),
            (false, Some(_), _) => Err(de::Error::custom("failed result must not carry data")),
            (false, None, _) => Err(de::Error::custom("failed result requires a non-empty error")),
        }
    }
}
