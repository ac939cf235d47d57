use serde::{Deserialize, Serialize};

use crate::domain::{CourseEntry, ScaleKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertGradeRequest {
    pub grade: String,
    pub university: ScaleKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertGradeResponse {
    /// `None` when the service cannot convert the value on this scale.
    #[serde(default)]
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSubmission {
    pub course: String,
    pub grade: String,
    pub credits: f64,
    /// `""` when the row has no academic year selected.
    #[serde(default)]
    pub academic_year: String,
}

impl From<&CourseEntry> for CourseSubmission {
    fn from(entry: &CourseEntry) -> Self {
        Self {
            course: entry.course_name().to_string(),
            grade: entry.trimmed_grade().to_string(),
            credits: entry.credits_value(),
            academic_year: entry
                .academic_year
                .map(|year| year.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub university: ScaleKey,
    pub courses: Vec<CourseSubmission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearBreakdown {
    pub year: String,
    pub gpa: f64,
    #[serde(default)]
    pub credits: Option<f64>,
    #[serde(default)]
    pub courses: Option<u32>,
}

/// Response of `/calculate`. Only `cGPA` is guaranteed; the client never
/// recomputes any of these figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub scale_used: Option<String>,
    #[serde(rename = "cGPA")]
    pub cgpa: f64,
    #[serde(default)]
    pub total_courses: Option<u32>,
    #[serde(default)]
    pub total_credits: Option<f64>,
    #[serde(default)]
    pub year_breakdown: Option<Vec<YearBreakdown>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropped_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_best_years_gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_two_years: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_recent_years_gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_three_years: Option<Vec<String>>,
}
