use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body the grading service returns alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("academic year starting {start} is outside the selectable range")]
    AcademicYearOutOfRange { start: u16 },
    #[error("malformed academic year '{0}', expected YYYY-YYYY")]
    MalformedAcademicYear(String),
}
