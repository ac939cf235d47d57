//! Backend-to-UI events and error modeling for the grade form.

use client_core::{PreviewResponse, SubmissionTicket};
use shared::{domain::GradingScale, protocol::CalculationResult};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    ScalesLoaded(Result<Vec<GradingScale>, String>),
    PreviewResolved(PreviewResponse),
    CalculationFinished {
        ticket: SubmissionTicket,
        outcome: Result<CalculationResult, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Configuration,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadScales,
}

/// Banner text shown when the scale list cannot be fetched at startup.
pub fn load_failure_message(base_url: &str) -> String {
    format!("Failed to load universities. Please check if the server is running on {base_url}")
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("failed to load")
            || message_lower.contains("connect")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("address") {
            UiErrorCategory::Configuration
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Connection",
        UiErrorCategory::Configuration => "Settings",
        UiErrorCategory::Unknown => "Error",
    }
}
