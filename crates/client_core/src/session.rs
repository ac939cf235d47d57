//! Form session state: course rows, the selected scale, the submission
//! lifecycle and the error banner.
//!
//! Nothing in here performs I/O. Operations that need the grading service
//! hand back a request value ([`PreviewRequest`], [`CalculateRequest`]) and
//! the outcome is fed back through [`FormSession::apply_preview`] or
//! [`FormSession::finish_submission`].

use std::time::{Duration, Instant};

use shared::{
    domain::{AcademicYear, CourseEntry, GradingScale, RowId, ScaleKey, NO_SCALE_PLACEHOLDER},
    protocol::{
        CalculateRequest, CalculationResult, ConvertGradeRequest, ConvertGradeResponse,
        CourseSubmission,
    },
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    error::ClientError,
    registry::ScaleRegistry,
    render::{render_result, ResultView},
};

pub const ERROR_BANNER_DURATION: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq)]
pub enum GradePreview {
    Neutral,
    Pending,
    Converted(f64),
    Invalid,
    Error,
}

impl GradePreview {
    pub fn label(&self) -> String {
        match self {
            GradePreview::Neutral => "-".to_string(),
            GradePreview::Pending => "...".to_string(),
            GradePreview::Converted(gpa) => format!("{gpa:.2}"),
            GradePreview::Invalid => "Invalid".to_string(),
            GradePreview::Error => "Error".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseRow {
    id: RowId,
    entry: CourseEntry,
    placeholder: &'static str,
    preview: GradePreview,
}

impl CourseRow {
    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn entry(&self) -> &CourseEntry {
        &self.entry
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn preview(&self) -> &GradePreview {
        &self.preview
    }
}

/// A single-grade conversion tagged with the row and value it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub row: RowId,
    pub grade: String,
    pub scale: ScaleKey,
}

impl PreviewRequest {
    pub fn to_wire(&self) -> ConvertGradeRequest {
        ConvertGradeRequest {
            grade: self.grade.clone(),
            university: self.scale.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    Converted(f64),
    Unconvertible,
    Failed(String),
}

impl PreviewOutcome {
    pub fn from_response(response: Result<ConvertGradeResponse, ClientError>) -> Self {
        match response {
            Ok(ConvertGradeResponse { gpa: Some(gpa) }) if gpa.is_finite() => {
                PreviewOutcome::Converted(gpa)
            }
            Ok(_) => PreviewOutcome::Unconvertible,
            Err(err) => PreviewOutcome::Failed(err.user_message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewResponse {
    pub request: PreviewRequest,
    pub outcome: PreviewOutcome,
}

/// Identifies one Idle -> Submitting transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("A calculation is already in progress.")]
    InFlight,
    #[error("Please select a university first.")]
    NoScaleSelected,
    #[error("Please add at least one course.")]
    NoCourses,
    #[error("Please enter valid grades and credits for at least one course.")]
    NoValidCourses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    LoadFailure,
    Validation,
    Submission,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner {
    kind: BannerKind,
    message: String,
    expires_at: Option<Instant>,
}

impl ErrorBanner {
    pub fn kind(&self) -> BannerKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `None` for banners that stay until dismissed.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct FormSession {
    registry: ScaleRegistry,
    selected: Option<GradingScale>,
    rows: Vec<CourseRow>,
    next_row_id: u64,
    last_result: Option<CalculationResult>,
    in_flight: Option<SubmissionTicket>,
    generation: u64,
    banner: Option<ErrorBanner>,
    banner_duration: Duration,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(ERROR_BANNER_DURATION)
    }
}

impl FormSession {
    pub fn new(banner_duration: Duration) -> Self {
        let mut session = Self {
            registry: ScaleRegistry::new(),
            selected: None,
            rows: Vec::new(),
            next_row_id: 1,
            last_result: None,
            in_flight: None,
            generation: 0,
            banner: None,
            banner_duration,
        };
        session.add_row();
        session
    }

    pub fn registry(&self) -> &ScaleRegistry {
        &self.registry
    }

    /// Feeds the startup scale load into the registry. A failure raises a
    /// banner that does not expire.
    pub fn record_scales(&mut self, outcome: Result<Vec<GradingScale>, String>) {
        let failure = outcome.as_ref().err().cloned();
        if !self.registry.record_load(outcome) {
            return;
        }
        if let Some(message) = failure {
            self.banner = Some(ErrorBanner {
                kind: BannerKind::LoadFailure,
                message,
                expires_at: None,
            });
        }
    }

    pub fn selected_scale(&self) -> Option<&GradingScale> {
        self.selected.as_ref()
    }

    pub fn scale_info(&self) -> Option<String> {
        self.selected
            .as_ref()
            .map(|scale| format!("Selected Scale: {}", scale.scale))
    }

    pub fn grade_placeholder(&self) -> &'static str {
        self.selected
            .as_ref()
            .map(GradingScale::grade_placeholder)
            .unwrap_or(NO_SCALE_PLACEHOLDER)
    }

    /// Switches the active scale (or clears it with `None`). Placeholders are
    /// refreshed on every row and previews are re-requested for rows that
    /// hold a grade. An unknown key behaves like `None`.
    pub fn select_scale(&mut self, key: Option<&ScaleKey>) -> Vec<PreviewRequest> {
        let scale = key.and_then(|key| {
            let found = self.registry.get(key).cloned();
            if found.is_none() {
                warn!(%key, "session: selected scale is not in the registry");
            }
            found
        });
        debug!(scale = ?scale.as_ref().map(|s| &s.key), "session: scale changed");
        self.selected = scale;
        self.last_result = None;

        let placeholder = self.grade_placeholder();
        match &self.selected {
            None => {
                for row in &mut self.rows {
                    row.placeholder = placeholder;
                    row.preview = GradePreview::Neutral;
                }
                Vec::new()
            }
            Some(scale) => self
                .rows
                .iter_mut()
                .filter_map(|row| {
                    row.placeholder = placeholder;
                    preview_request_for(row, scale)
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> &[CourseRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&CourseRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn add_row(&mut self) -> RowId {
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        self.rows.push(CourseRow {
            id,
            entry: CourseEntry::default(),
            placeholder: self.grade_placeholder(),
            preview: GradePreview::Neutral,
        });
        id
    }

    /// Returns `false` when the row is already gone.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn set_course(&mut self, id: RowId, course: String) -> bool {
        self.entry_mut(id).map(|entry| entry.course = course).is_some()
    }

    pub fn set_credits(&mut self, id: RowId, credits: String) -> bool {
        self.entry_mut(id).map(|entry| entry.credits = credits).is_some()
    }

    pub fn set_academic_year(&mut self, id: RowId, year: Option<AcademicYear>) -> bool {
        self.entry_mut(id)
            .map(|entry| entry.academic_year = year)
            .is_some()
    }

    /// Stores a new grade value. Returns the conversion to request when the
    /// preview needs the grading service.
    pub fn set_grade(&mut self, id: RowId, grade: String) -> Option<PreviewRequest> {
        let row = self.rows.iter_mut().find(|row| row.id == id)?;
        row.entry.grade = grade;
        match &self.selected {
            Some(scale) => preview_request_for(row, scale),
            None => {
                row.preview = GradePreview::Neutral;
                None
            }
        }
    }

    /// Applies a conversion result if the row still shows the value and scale
    /// it was requested for. Returns whether the preview changed.
    pub fn apply_preview(&mut self, response: PreviewResponse) -> bool {
        let request = &response.request;
        let scale_matches = self
            .selected
            .as_ref()
            .is_some_and(|scale| scale.key == request.scale);
        let Some(row) = self.rows.iter_mut().find(|row| row.id == request.row) else {
            debug!(row = request.row.0, "session: preview for removed row dropped");
            return false;
        };
        if !scale_matches || row.entry.trimmed_grade() != request.grade {
            debug!(row = request.row.0, "session: stale preview dropped");
            return false;
        }
        row.preview = match response.outcome {
            PreviewOutcome::Converted(gpa) => GradePreview::Converted(gpa),
            PreviewOutcome::Unconvertible => GradePreview::Invalid,
            PreviewOutcome::Failed(reason) => {
                debug!(row = request.row.0, %reason, "session: preview request failed");
                GradePreview::Error
            }
        };
        true
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Idle -> Submitting. On success the banner is cleared and the caller
    /// owns sending the returned request; on failure a validation banner is
    /// shown and nothing should be sent.
    pub fn begin_submission(
        &mut self,
        now: Instant,
    ) -> Result<(SubmissionTicket, CalculateRequest), ValidationFailure> {
        match self.submission_request() {
            Ok(request) => {
                let ticket = SubmissionTicket {
                    generation: self.generation,
                };
                self.in_flight = Some(ticket);
                self.banner = None;
                Ok((ticket, request))
            }
            Err(failure) => {
                self.show_banner(BannerKind::Validation, failure.to_string(), now);
                Err(failure)
            }
        }
    }

    fn submission_request(&self) -> Result<CalculateRequest, ValidationFailure> {
        if self.in_flight.is_some() {
            return Err(ValidationFailure::InFlight);
        }
        let scale = self
            .selected
            .as_ref()
            .ok_or(ValidationFailure::NoScaleSelected)?;
        if self.rows.is_empty() {
            return Err(ValidationFailure::NoCourses);
        }
        let courses: Vec<CourseSubmission> = self
            .rows
            .iter()
            .map(|row| &row.entry)
            .filter(|entry| entry.is_submittable())
            .map(CourseSubmission::from)
            .collect();
        if courses.is_empty() {
            return Err(ValidationFailure::NoValidCourses);
        }
        Ok(CalculateRequest {
            university: scale.key.clone(),
            courses,
        })
    }

    /// Submitting -> Idle. The outcome is shown only if the form has not
    /// been cleared since the ticket was issued; returns whether it was.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<CalculationResult, String>,
        now: Instant,
    ) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        }
        if ticket.generation != self.generation {
            debug!("session: calculation outcome for a cleared form discarded");
            return false;
        }
        match outcome {
            Ok(result) => self.last_result = Some(result),
            Err(message) => self.show_banner(
                BannerKind::Submission,
                format!("Calculation failed: {message}"),
                now,
            ),
        }
        true
    }

    pub fn last_result(&self) -> Option<&CalculationResult> {
        self.last_result.as_ref()
    }

    pub fn result_view(&self) -> Option<ResultView> {
        self.last_result.as_ref().map(render_result)
    }

    pub fn banner(&self) -> Option<&ErrorBanner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Hides a timed banner once its deadline passed. Returns whether it did.
    pub fn expire_banner(&mut self, now: Instant) -> bool {
        let expired = self
            .banner
            .as_ref()
            .and_then(ErrorBanner::expires_at)
            .is_some_and(|deadline| now >= deadline);
        if expired {
            self.banner = None;
        }
        expired
    }

    /// Drops every row, the scale, results and errors, then adds one blank row.
    pub fn clear_all(&mut self) {
        self.rows.clear();
        self.selected = None;
        self.last_result = None;
        self.banner = None;
        self.generation += 1;
        self.add_row();
    }

    fn show_banner(&mut self, kind: BannerKind, message: String, now: Instant) {
        let expires_at = match kind {
            BannerKind::LoadFailure => None,
            BannerKind::Validation | BannerKind::Submission => Some(now + self.banner_duration),
        };
        self.banner = Some(ErrorBanner {
            kind,
            message,
            expires_at,
        });
    }

    fn entry_mut(&mut self, id: RowId) -> Option<&mut CourseEntry> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id)
            .map(|row| &mut row.entry)
    }
}

fn preview_request_for(row: &mut CourseRow, scale: &GradingScale) -> Option<PreviewRequest> {
    let grade = row.entry.trimmed_grade();
    if grade.is_empty() {
        row.preview = GradePreview::Neutral;
        return None;
    }
    let request = PreviewRequest {
        row: row.id,
        grade: grade.to_string(),
        scale: scale.key.clone(),
    };
    row.preview = GradePreview::Pending;
    Some(request)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
