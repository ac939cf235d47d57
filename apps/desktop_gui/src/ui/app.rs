//! Application shell: owns the form session and wires UI actions to the
//! backend command queue.

use std::time::{Duration, Instant};

use client_core::{FormSession, RegistryStatus};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::ScaleKey;

use crate::backend_bridge::commands::BackendCommand;
use crate::config::Settings;
use crate::controller::events::{err_label, UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::{
    apply_row_intent, dispatch_backend_command, select_scale, submit_form,
};
use crate::ui::panels;

const SCALE_PLACEHOLDER: &str = "Select a university";

pub struct GpaFormApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: FormSession,
    status: String,
    api_base_url: String,
    last_calculated_at: Option<String>,
    scroll_to_results: bool,
}

impl GpaFormApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &Settings,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            session: FormSession::new(settings.error_banner_duration),
            status: "Loading universities...".to_string(),
            api_base_url: settings.api_base_url.clone(),
            last_calculated_at: None,
            scroll_to_results: false,
        };
        dispatch_backend_command(&app.cmd_tx, BackendCommand::LoadScales, &mut app.status);
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    if err.context() == UiErrorContext::BackendStartup {
                        tracing::error!(message = err.message(), "backend startup problem");
                    }
                    self.status = format!("{}: {}", err_label(err.category()), err.message());
                }
                UiEvent::ScalesLoaded(outcome) => {
                    self.status = match &outcome {
                        Ok(scales) => format!("Loaded {} universities", scales.len()),
                        Err(message) => {
                            let err = UiError::from_message(UiErrorContext::LoadScales, message);
                            format!("{}: grading service unavailable", err_label(err.category()))
                        }
                    };
                    self.session.record_scales(outcome);
                }
                UiEvent::PreviewResolved(response) => {
                    self.session.apply_preview(response);
                }
                UiEvent::CalculationFinished { ticket, outcome } => {
                    let succeeded = outcome.is_ok();
                    let shown = self
                        .session
                        .finish_submission(ticket, outcome, Instant::now());
                    if shown && succeeded {
                        self.last_calculated_at =
                            Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
                        self.scroll_to_results = true;
                        self.status = "Calculation complete".to_string();
                    } else if shown {
                        self.status = "Calculation failed".to_string();
                    }
                }
            }
        }
    }

    fn show_scale_selector(&mut self, ui: &mut egui::Ui) {
        let registry = self.session.registry();
        let current = self.session.selected_scale().map(|scale| scale.key.clone());
        let mut choice: Option<Option<ScaleKey>> = None;

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("University").strong());
            ui.add_enabled_ui(registry.is_ready(), |ui| {
                egui::ComboBox::from_id_salt("scale_selector")
                    .width(360.0)
                    .selected_text(
                        self.session
                            .selected_scale()
                            .map(|scale| scale.selector_label())
                            .unwrap_or_else(|| SCALE_PLACEHOLDER.to_string()),
                    )
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(current.is_none(), SCALE_PLACEHOLDER)
                            .clicked()
                        {
                            choice = Some(None);
                        }
                        for scale in registry.all() {
                            let selected = current.as_ref() == Some(&scale.key);
                            if ui
                                .selectable_label(selected, scale.selector_label())
                                .clicked()
                            {
                                choice = Some(Some(scale.key.clone()));
                            }
                        }
                    });
            });
            if matches!(registry.status(), RegistryStatus::Loading) {
                ui.spinner();
                ui.label("Loading universities...");
            }
        });

        if let Some(choice) = choice {
            if choice != current {
                select_scale(
                    &mut self.session,
                    &self.cmd_tx,
                    choice.as_ref(),
                    &mut self.status,
                );
            }
        }

        if let Some(info) = self.session.scale_info() {
            ui.label(
                egui::RichText::new(info)
                    .italics()
                    .color(ui.visuals().weak_text_color()),
            );
        }
    }

    fn show_actions(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Add Course").clicked() {
                self.session.add_row();
            }

            let submitting = self.session.is_submitting();
            let calculate = ui.add_enabled(!submitting, egui::Button::new("Calculate GPA"));
            if calculate.clicked()
                && submit_form(
                    &mut self.session,
                    &self.cmd_tx,
                    &mut self.status,
                    Instant::now(),
                )
            {
                self.status = "Calculating GPA...".to_string();
            }

            if ui.button("Clear All").clicked() {
                self.session.clear_all();
                self.last_calculated_at = None;
                self.scroll_to_results = false;
                self.status = "Form cleared".to_string();
            }

            if submitting {
                ui.spinner();
                ui.label("Calculating...");
            }
        });
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("GPA Calculator");
        ui.add_space(6.0);

        if let Some(message) = self.session.banner().map(|b| b.message().to_string()) {
            if panels::show_error_banner(ui, &message) {
                self.session.dismiss_banner();
            }
            ui.add_space(6.0);
        }

        self.show_scale_selector(ui);
        ui.add_space(10.0);

        let intents = panels::show_course_table(ui, self.session.rows());
        for intent in intents {
            apply_row_intent(&mut self.session, &self.cmd_tx, intent, &mut self.status);
        }
        ui.add_space(10.0);

        self.show_actions(ui);

        if let Some(view) = self.session.result_view() {
            ui.add_space(14.0);
            panels::show_results(
                ui,
                &view,
                self.last_calculated_at.as_deref(),
                self.scroll_to_results,
            );
            self.scroll_to_results = false;
        }
    }
}

impl eframe::App for GpaFormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.session.expire_banner(Instant::now());

        egui::TopBottomPanel::bottom("status_footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(&self.status)
                        .small()
                        .color(ui.visuals().weak_text_color()),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(&self.api_base_url).small());
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| self.show_form(ui));
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
