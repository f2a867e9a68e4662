//! Resident daily care records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FacilityId, StaffId};

/// Longest record body accepted, counted in characters.
pub const DAILY_RECORD_MAX_CHARS: usize = 2000;

/// A daily record row as stored in `daily_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Facility the record belongs to.
    pub facility_id: FacilityId,
    /// Author of the record.
    pub staff_id: StaffId,
    /// Calendar day the record describes.
    pub record_date: NaiveDate,
    /// Free-text body.
    pub content: String,
    /// Creation timestamp assigned by the store.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Validation errors for [`NewDailyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DailyRecordValidationError {
    /// Content was blank once trimmed.
    #[error("記録内容は必須です")]
    EmptyContent,
    /// Content exceeded [`DAILY_RECORD_MAX_CHARS`].
    #[error("記録内容は2000文字以内で入力してください")]
    ContentTooLong,
    /// Date was not `YYYY-MM-DD`.
    #[error("記録日の形式が正しくありません")]
    InvalidDate,
}

/// Validated insert payload for `daily_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDailyRecord {
    facility_id: FacilityId,
    staff_id: StaffId,
    record_date: NaiveDate,
    content: String,
}

impl NewDailyRecord {
    /// Validate raw form input for a record written by `staff_id`.
    pub fn try_new(
        facility_id: FacilityId,
        staff_id: StaffId,
        record_date: &str,
        content: &str,
    ) -> Result<Self, DailyRecordValidationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DailyRecordValidationError::EmptyContent);
        }
        if content.chars().count() > DAILY_RECORD_MAX_CHARS {
            return Err(DailyRecordValidationError::ContentTooLong);
        }
        let record_date = NaiveDate::parse_from_str(record_date.trim(), "%Y-%m-%d")
            .map_err(|_| DailyRecordValidationError::InvalidDate)?;
        Ok(Self {
            facility_id,
            staff_id,
            record_date,
            content: content.to_owned(),
        })
    }

    /// Target facility.
    pub fn facility_id(&self) -> FacilityId {
        self.facility_id
    }

    /// Record date.
    pub fn record_date(&self) -> NaiveDate {
        self.record_date
    }
}
