//! Colours shared by the form panels.

use client_core::GradePreview;
use eframe::egui::{Color32, Stroke, Visuals};

pub const SUCCESS: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
pub const ERROR: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

pub const BANNER_FILL: Color32 = Color32::from_rgb(111, 53, 53);
pub const BANNER_STROKE: Color32 = Color32::from_rgb(175, 96, 96);

pub const SECTION_FILL_DARK: Color32 = Color32::from_rgb(43, 45, 49);
pub const SECTION_FILL_LIGHT: Color32 = Color32::from_rgb(242, 244, 247);
pub const PRIMARY_ACCENT: Color32 = Color32::from_rgb(52, 152, 219);

pub fn banner_stroke() -> Stroke {
    Stroke::new(1.0, BANNER_STROKE)
}

pub fn section_fill(visuals: &Visuals) -> Color32 {
    if visuals.dark_mode {
        SECTION_FILL_DARK
    } else {
        SECTION_FILL_LIGHT
    }
}

pub fn preview_color(preview: &GradePreview, visuals: &Visuals) -> Color32 {
    match preview {
        GradePreview::Converted(_) => SUCCESS,
        GradePreview::Invalid | GradePreview::Error => ERROR,
        GradePreview::Neutral | GradePreview::Pending => visuals.weak_text_color(),
    }
}
