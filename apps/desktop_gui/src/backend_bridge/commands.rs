//! Backend commands queued from UI to backend worker.

use client_core::{PreviewRequest, SubmissionTicket};
use shared::protocol::CalculateRequest;

#[derive(Debug)]
pub enum BackendCommand {
    LoadScales,
    ConvertGrade(PreviewRequest),
    Calculate {
        ticket: SubmissionTicket,
        request: CalculateRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadScales => "load_scales",
            BackendCommand::ConvertGrade(_) => "convert_grade",
            BackendCommand::Calculate { .. } => "calculate",
        }
    }
}
