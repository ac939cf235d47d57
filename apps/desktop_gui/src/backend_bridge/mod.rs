//! Bridge between the UI thread and the async grading-service worker.

pub mod commands;
pub mod runtime;
