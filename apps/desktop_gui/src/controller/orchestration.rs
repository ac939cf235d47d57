//! Command orchestration helpers from UI actions to backend command queue.

use std::time::Instant;

use client_core::{FormSession, PreviewOutcome, PreviewRequest, PreviewResponse};
use crossbeam_channel::{Sender, TrySendError};
use shared::domain::{AcademicYear, RowId, ScaleKey};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns `false` and sets the
/// status line when the queue cannot take it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            false
        }
    }
}

/// Edits collected while drawing the course table, applied once the frame
/// no longer borrows the rows.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIntent {
    Course(RowId, String),
    Grade(RowId, String),
    Credits(RowId, String),
    Year(RowId, Option<AcademicYear>),
    Remove(RowId),
}

pub fn apply_row_intent(
    session: &mut FormSession,
    cmd_tx: &Sender<BackendCommand>,
    intent: RowIntent,
    status: &mut String,
) {
    match intent {
        RowIntent::Course(id, course) => {
            session.set_course(id, course);
        }
        RowIntent::Grade(id, grade) => {
            if let Some(request) = session.set_grade(id, grade) {
                queue_preview(session, cmd_tx, request, status);
            }
        }
        RowIntent::Credits(id, credits) => {
            session.set_credits(id, credits);
        }
        RowIntent::Year(id, year) => {
            session.set_academic_year(id, year);
        }
        RowIntent::Remove(id) => {
            if !session.remove_row(id) {
                tracing::debug!(row = id.0, "remove requested for a row that is already gone");
            }
        }
    }
}

pub fn select_scale(
    session: &mut FormSession,
    cmd_tx: &Sender<BackendCommand>,
    key: Option<&ScaleKey>,
    status: &mut String,
) {
    for request in session.select_scale(key) {
        queue_preview(session, cmd_tx, request, status);
    }
}

/// Queues a conversion; if the worker cannot take it the row shows the
/// failure instead of staying pending.
fn queue_preview(
    session: &mut FormSession,
    cmd_tx: &Sender<BackendCommand>,
    request: PreviewRequest,
    status: &mut String,
) {
    if dispatch_backend_command(cmd_tx, BackendCommand::ConvertGrade(request.clone()), status) {
        return;
    }
    session.apply_preview(PreviewResponse {
        request,
        outcome: PreviewOutcome::Failed(status.clone()),
    });
}

/// Validates the form and queues the calculation. A validation failure
/// leaves the banner raised by the session; a queue failure is reported as
/// a failed calculation so the form returns to idle.
pub fn submit_form(
    session: &mut FormSession,
    cmd_tx: &Sender<BackendCommand>,
    status: &mut String,
    now: Instant,
) -> bool {
    let (ticket, request) = match session.begin_submission(now) {
        Ok(pending) => pending,
        Err(failure) => {
            tracing::debug!(reason = %failure, "calculation not submitted");
            return false;
        }
    };
    if dispatch_backend_command(cmd_tx, BackendCommand::Calculate { ticket, request }, status) {
        return true;
    }
    session.finish_submission(ticket, Err(status.clone()), now);
    false
}

#[cfg(test)]
mod tests {
    use client_core::{BannerKind, GradePreview};
    use crossbeam_channel::bounded;
    use shared::domain::GradingScale;

    use super::*;

    fn ready_session() -> FormSession {
        let mut session = FormSession::default();
        session.record_scales(Ok(vec![GradingScale {
            key: ScaleKey::new("uoft"),
            name: "University of Toronto".to_string(),
            scale: "4.0 Percentage".to_string(),
            format: Some("percentage".to_string()),
        }]));
        session
    }

    #[test]
    fn grade_edit_queues_a_conversion_once_a_scale_is_selected() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let mut status = String::new();
        let mut session = ready_session();
        let row = session.rows()[0].id();

        apply_row_intent(
            &mut session,
            &cmd_tx,
            RowIntent::Grade(row, "85".to_string()),
            &mut status,
        );
        assert!(cmd_rx.try_recv().is_err());

        select_scale(&mut session, &cmd_tx, Some(&ScaleKey::new("uoft")), &mut status);
        match cmd_rx.try_recv() {
            Ok(BackendCommand::ConvertGrade(request)) => {
                assert_eq!(request.row, row);
                assert_eq!(request.grade, "85");
            }
            other => panic!("expected conversion, got {other:?}"),
        }
        assert_eq!(session.rows()[0].preview(), &GradePreview::Pending);
    }

    #[test]
    fn remove_intent_drops_the_row() {
        let (cmd_tx, _cmd_rx) = bounded(8);
        let mut status = String::new();
        let mut session = ready_session();
        let row = session.rows()[0].id();
        apply_row_intent(&mut session, &cmd_tx, RowIntent::Remove(row), &mut status);
        assert!(session.rows().is_empty());
    }

    #[test]
    fn invalid_form_sends_nothing() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let mut status = String::new();
        let mut session = ready_session();
        assert!(!submit_form(&mut session, &cmd_tx, &mut status, Instant::now()));
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(
            session.banner().map(|b| b.message()),
            Some("Please select a university first.")
        );
    }

    #[test]
    fn valid_form_queues_one_calculation() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let mut status = String::new();
        let mut session = ready_session();
        select_scale(&mut session, &cmd_tx, Some(&ScaleKey::new("uoft")), &mut status);
        let row = session.rows()[0].id();
        session.set_grade(row, "A".to_string());
        session.set_credits(row, "3".to_string());

        assert!(submit_form(&mut session, &cmd_tx, &mut status, Instant::now()));
        assert!(session.is_submitting());
        assert!(!submit_form(&mut session, &cmd_tx, &mut status, Instant::now()));
        match cmd_rx.try_recv() {
            Ok(BackendCommand::Calculate { request, .. }) => {
                assert_eq!(request.courses.len(), 1);
            }
            other => panic!("expected calculation, got {other:?}"),
        }
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn disconnected_worker_returns_the_form_to_idle() {
        let (cmd_tx, cmd_rx) = bounded(8);
        drop(cmd_rx);
        let mut status = String::new();
        let mut session = ready_session();
        session.select_scale(Some(&ScaleKey::new("uoft")));
        let row = session.rows()[0].id();
        session.set_grade(row, "A".to_string());
        session.set_credits(row, "3".to_string());

        assert!(!submit_form(&mut session, &cmd_tx, &mut status, Instant::now()));
        assert!(!session.is_submitting());
        assert!(status.contains("disconnected"));
        let banner = session.banner().expect("failure banner");
        assert_eq!(banner.kind(), BannerKind::Submission);
        assert!(banner.message().starts_with("Calculation failed: "));
    }

    #[test]
    fn unqueued_preview_shows_error_instead_of_pending() {
        let (cmd_tx, cmd_rx) = bounded(8);
        drop(cmd_rx);
        let mut status = String::new();
        let mut session = ready_session();
        let row = session.rows()[0].id();
        select_scale(&mut session, &cmd_tx, Some(&ScaleKey::new("uoft")), &mut status);

        apply_row_intent(
            &mut session,
            &cmd_tx,
            RowIntent::Grade(row, "A".to_string()),
            &mut status,
        );
        assert!(status.contains("disconnected"));
        assert_eq!(session.rows()[0].preview(), &GradePreview::Error);
        assert_eq!(session.rows()[0].preview().label(), "Error");
    }

    #[test]
    fn full_queue_marks_rescaled_previews_as_failed() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();
        let mut session = ready_session();
        let first = session.rows()[0].id();
        let second = session.add_row();
        session.set_grade(first, "85".to_string());
        session.set_grade(second, "90".to_string());

        select_scale(&mut session, &cmd_tx, Some(&ScaleKey::new("uoft")), &mut status);
        assert_eq!(session.rows()[0].preview(), &GradePreview::Pending);
        assert_eq!(session.rows()[1].preview(), &GradePreview::Error);
        assert_eq!(status, "UI command queue is full; please retry");
    }
}
