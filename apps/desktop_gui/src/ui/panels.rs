//! Course table, error banner and results region.

use client_core::{render::AlternativeSection, session::CourseRow, ResultView};
use eframe::egui;
use shared::domain::AcademicYear;

use crate::controller::orchestration::RowIntent;
use crate::ui::theme;

const YEAR_PLACEHOLDER: &str = "Select Academic Year";

/// Draws the course rows and returns the edits made this frame.
pub fn show_course_table(ui: &mut egui::Ui, rows: &[CourseRow]) -> Vec<RowIntent> {
    let mut intents = Vec::new();

    egui::Grid::new("course_table")
        .num_columns(6)
        .spacing([10.0, 6.0])
        .striped(true)
        .show(ui, |ui| {
            for header in ["Course", "Grade", "Credits", "Academic Year", "GPA", ""] {
                ui.label(egui::RichText::new(header).strong());
            }
            ui.end_row();

            for row in rows {
                show_course_row(ui, row, &mut intents);
                ui.end_row();
            }
        });

    intents
}

fn show_course_row(ui: &mut egui::Ui, row: &CourseRow, intents: &mut Vec<RowIntent>) {
    let id = row.id();
    let entry = row.entry();

    let mut course = entry.course.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut course)
            .id_salt(("course", id.0))
            .hint_text("Course name")
            .desired_width(180.0),
    );
    if response.changed() {
        intents.push(RowIntent::Course(id, course));
    }

    let mut grade = entry.grade.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut grade)
            .id_salt(("grade", id.0))
            .hint_text(row.placeholder())
            .desired_width(220.0),
    );
    if response.changed() {
        intents.push(RowIntent::Grade(id, grade));
    }

    let mut credits = entry.credits.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut credits)
            .id_salt(("credits", id.0))
            .hint_text("Credits")
            .desired_width(70.0),
    );
    if response.changed() {
        intents.push(RowIntent::Credits(id, credits));
    }

    let mut year = entry.academic_year;
    egui::ComboBox::from_id_salt(("academic_year", id.0))
        .selected_text(
            year.map(AcademicYear::option_label)
                .unwrap_or_else(|| YEAR_PLACEHOLDER.to_string()),
        )
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut year, None, YEAR_PLACEHOLDER);
            for option in AcademicYear::all() {
                ui.selectable_value(&mut year, Some(option), option.option_label());
            }
        });
    if year != entry.academic_year {
        intents.push(RowIntent::Year(id, year));
    }

    let preview = row.preview();
    ui.label(
        egui::RichText::new(preview.label())
            .strong()
            .color(theme::preview_color(preview, ui.visuals())),
    );

    if ui.button("Remove").clicked() {
        intents.push(RowIntent::Remove(id));
    }
}

/// Returns `true` when the user dismissed the banner.
pub fn show_error_banner(ui: &mut egui::Ui, message: &str) -> bool {
    let mut dismissed = false;
    egui::Frame::NONE
        .fill(theme::BANNER_FILL)
        .stroke(theme::banner_stroke())
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
            });
        });
    dismissed
}

/// Draws a calculation result. `scroll_into_view` is set on the frame the
/// result first appears.
pub fn show_results(
    ui: &mut egui::Ui,
    view: &ResultView,
    calculated_at: Option<&str>,
    scroll_into_view: bool,
) {
    let fill = theme::section_fill(ui.visuals());
    let response = egui::Frame::NONE
        .fill(fill)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(14, 12))
        .show(ui, |ui| {
            ui.heading(&view.header.title);
            if let Some(scale_line) = &view.header.scale_line {
                ui.label(scale_line);
            }
            if let Some(at) = calculated_at {
                ui.label(
                    egui::RichText::new(format!("Calculated at {at}"))
                        .small()
                        .color(ui.visuals().weak_text_color()),
                );
            }
            ui.add_space(8.0);

            ui.label(egui::RichText::new(view.primary.title).strong());
            ui.label(
                egui::RichText::new(&view.primary.value)
                    .size(28.0)
                    .strong()
                    .color(theme::PRIMARY_ACCENT),
            );
            if let Some(details) = &view.primary.details {
                ui.label(details);
            }

            if !view.years.is_empty() {
                ui.add_space(8.0);
                ui.label(egui::RichText::new("Year-by-Year Breakdown").strong());
                for line in &view.years {
                    ui.label(format!("{}: {}", line.year, line.summary));
                }
            }

            for section in &view.alternatives {
                ui.add_space(8.0);
                show_alternative(ui, section);
            }

            ui.add_space(8.0);
            ui.label(egui::RichText::new("Important Notes").strong());
            for note in view.notes {
                ui.label(format!("• {note}"));
            }
        })
        .response;

    if scroll_into_view {
        response.scroll_to_me(Some(egui::Align::TOP));
    }
}

fn show_alternative(ui: &mut egui::Ui, section: &AlternativeSection) {
    ui.separator();
    ui.label(egui::RichText::new(section.title()).strong());
    ui.label(egui::RichText::new(&section.value).size(20.0).strong());
    if let Some(details) = &section.details {
        ui.label(details);
    }
    if let Some(note) = &section.note {
        ui.label(egui::RichText::new(note).italics());
    }
    ui.label(
        egui::RichText::new(section.used_by_line())
            .small()
            .color(ui.visuals().weak_text_color()),
    );
}
