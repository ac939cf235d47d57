use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(RowId);

/// Identifier the grading service uses for a scale (the `key` field of `/universities`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaleKey(pub String);

impl ScaleKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeFormat {
    Percentage,
    Letter,
}

impl GradeFormat {
    pub fn placeholder(self) -> &'static str {
        match self {
            GradeFormat::Percentage => "Enter percentage (0-100)",
            GradeFormat::Letter => "Enter letter grade (A+, A, B+, etc.)",
        }
    }
}

pub const NO_SCALE_PLACEHOLDER: &str = "Enter grade";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingScale {
    pub key: ScaleKey,
    pub name: String,
    /// Descriptive label such as "4.0 Percentage" or "Letter".
    pub scale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl GradingScale {
    pub fn grade_format(&self) -> GradeFormat {
        let hinted = self
            .format
            .as_deref()
            .map(|hint| hint.to_ascii_lowercase().contains("percent"))
            .unwrap_or(false);
        if hinted || self.scale.contains("Percentage") {
            GradeFormat::Percentage
        } else {
            GradeFormat::Letter
        }
    }

    pub fn grade_placeholder(&self) -> &'static str {
        self.grade_format().placeholder()
    }

    pub fn selector_label(&self) -> String {
        format!("{} ({})", self.name, self.scale)
    }
}

/// A school year of the form `YYYY-YYYY+1`, limited to the selectable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AcademicYear {
    start: u16,
}

impl AcademicYear {
    pub const FIRST_START: u16 = 2010;
    pub const LAST_START: u16 = 2030;

    pub fn starting(start: u16) -> Result<Self, DomainError> {
        if (Self::FIRST_START..=Self::LAST_START).contains(&start) {
            Ok(Self { start })
        } else {
            Err(DomainError::AcademicYearOutOfRange { start })
        }
    }

    pub fn all() -> impl Iterator<Item = AcademicYear> {
        (Self::FIRST_START..=Self::LAST_START).map(|start| AcademicYear { start })
    }

    pub fn start(self) -> u16 {
        self.start
    }

    pub fn option_label(self) -> String {
        format!("Academic Year {self}")
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.start + 1)
    }
}

impl FromStr for AcademicYear {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DomainError::MalformedAcademicYear(s.to_string());
        let (first, second) = s.trim().split_once('-').ok_or_else(malformed)?;
        let start: u16 = first.parse().map_err(|_| malformed())?;
        let end: u16 = second.parse().map_err(|_| malformed())?;
        if start.checked_add(1) != Some(end) {
            return Err(malformed());
        }
        Self::starting(start)
    }
}

impl Serialize for AcademicYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AcademicYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw user input for one course row, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseEntry {
    pub course: String,
    pub grade: String,
    pub credits: String,
    pub academic_year: Option<AcademicYear>,
}

pub const DEFAULT_COURSE_NAME: &str = "Course";

impl CourseEntry {
    pub fn trimmed_grade(&self) -> &str {
        self.grade.trim()
    }

    /// Credits as a number; anything unparsable counts as zero.
    pub fn credits_value(&self) -> f64 {
        match self.credits.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => 0.0,
        }
    }

    pub fn course_name(&self) -> &str {
        if self.course.trim().is_empty() {
            DEFAULT_COURSE_NAME
        } else {
            &self.course
        }
    }

    pub fn is_submittable(&self) -> bool {
        !self.trimmed_grade().is_empty() && self.credits_value() > 0.0
    }
}
