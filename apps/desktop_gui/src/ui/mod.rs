//! UI layer for the grade form: app shell, panels and colours.

pub mod app;
pub mod panels;
pub mod theme;

pub use app::GpaFormApp;
