//! Shapes a [`CalculationResult`] into the sections the results region shows.

use shared::protocol::{CalculationResult, YearBreakdown};

pub const IMPORTANT_NOTES: [&str; 4] = [
    "Different medical schools use different calculation methods",
    "Some schools require minimum 18 credits per year for \"worst year\" dropping",
    "Always verify GPA calculations with official school requirements",
    "Graduate coursework may be treated differently by some schools",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ResultHeader {
    pub title: String,
    pub scale_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimarySection {
    pub title: &'static str,
    pub value: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearLine {
    pub year: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeKind {
    WorstYearDropped,
    TwoBestYears,
    ThreeRecentYears,
}

impl AlternativeKind {
    pub fn title(self) -> &'static str {
        match self {
            AlternativeKind::WorstYearDropped => "Adjusted GPA (Worst Year Dropped)",
            AlternativeKind::TwoBestYears => "Two Best Years GPA",
            AlternativeKind::ThreeRecentYears => "Three Most Recent Years GPA",
        }
    }

    /// Schools known to apply this weighting.
    pub fn used_by(self) -> &'static str {
        match self {
            AlternativeKind::WorstYearDropped => {
                "University of Calgary, University of Alberta, UBC"
            }
            AlternativeKind::TwoBestYears => "Western University, Dalhousie University",
            AlternativeKind::ThreeRecentYears => "University of Ottawa",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeSection {
    pub kind: AlternativeKind,
    pub value: String,
    pub details: Option<String>,
    pub note: Option<String>,
}

impl AlternativeSection {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn used_by_line(&self) -> String {
        format!("Used by: {}", self.kind.used_by())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub header: ResultHeader,
    pub primary: PrimarySection,
    /// Newest year first; empty when the result has no breakdown.
    pub years: Vec<YearLine>,
    pub alternatives: Vec<AlternativeSection>,
    pub notes: &'static [&'static str],
}

#[cfg(test)]
impl ResultView {
    pub fn alternative(&self, kind: AlternativeKind) -> Option<&AlternativeSection> {
        self.alternatives.iter().find(|section| section.kind == kind)
    }
}

pub fn render_result(result: &CalculationResult) -> ResultView {
    let header = ResultHeader {
        title: format!(
            "University: {}",
            result
                .university
                .as_deref()
                .map(display_university)
                .unwrap_or_else(|| "Unknown".to_string())
        ),
        scale_line: result
            .scale_used
            .as_ref()
            .map(|scale| format!("Scale Used: {scale}")),
    };

    let primary = PrimarySection {
        title: "Cumulative GPA (cGPA)",
        value: result.cgpa.to_string(),
        details: cumulative_details(result.total_courses, result.total_credits),
    };

    let mut alternatives = Vec::new();
    if let Some(gpa) = result.adjusted_gpa {
        alternatives.push(AlternativeSection {
            kind: AlternativeKind::WorstYearDropped,
            value: gpa.to_string(),
            details: result
                .dropped_year
                .as_ref()
                .map(|year| format!("Dropped: {year}")),
            note: result.adjusted_note.clone(),
        });
    }
    if let Some(gpa) = result.two_best_years_gpa {
        alternatives.push(AlternativeSection {
            kind: AlternativeKind::TwoBestYears,
            value: gpa.to_string(),
            details: years_used(result.best_two_years.as_deref()),
            note: None,
        });
    }
    if let Some(gpa) = result.three_recent_years_gpa {
        alternatives.push(AlternativeSection {
            kind: AlternativeKind::ThreeRecentYears,
            value: gpa.to_string(),
            details: years_used(result.recent_three_years.as_deref()),
            note: None,
        });
    }

    ResultView {
        header,
        primary,
        years: year_lines(result.year_breakdown.as_deref().unwrap_or_default()),
        alternatives,
        notes: &IMPORTANT_NOTES,
    }
}

fn cumulative_details(courses: Option<u32>, credits: Option<f64>) -> Option<String> {
    match (courses, credits) {
        (Some(courses), Some(credits)) => Some(format!(
            "Based on {courses} courses ({credits} total credits)"
        )),
        (Some(courses), None) => Some(format!("Based on {courses} courses")),
        (None, Some(credits)) => Some(format!("Based on {credits} total credits")),
        (None, None) => None,
    }
}

fn years_used(years: Option<&[String]>) -> Option<String> {
    years
        .filter(|years| !years.is_empty())
        .map(|years| format!("Years used: {}", years.join(", ")))
}

fn year_lines(breakdown: &[YearBreakdown]) -> Vec<YearLine> {
    let mut sorted: Vec<&YearBreakdown> = breakdown.iter().collect();
    sorted.sort_by(|a, b| b.year.cmp(&a.year));
    sorted
        .into_iter()
        .map(|entry| {
            let mut summary = format!("{} GPA", entry.gpa);
            let mut extras = Vec::new();
            if let Some(credits) = entry.credits {
                extras.push(format!("{credits} credits"));
            }
            if let Some(courses) = entry.courses {
                extras.push(format!("{courses} courses"));
            }
            if !extras.is_empty() {
                summary.push_str(&format!(" ({})", extras.join(", ")));
            }
            YearLine {
                year: entry.year.clone(),
                summary,
            }
        })
        .collect()
}

/// `university_of_toronto` -> `University Of Toronto`.
pub fn display_university(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
