//! Controller layer: UI events and command orchestration for the grade form.

pub mod events;
pub mod orchestration;
