//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{
    GradingClient, GradingService, MissingGradingService, PreviewOutcome, PreviewResponse,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::config::Settings;
use crate::controller::events::{load_failure_message, UiError, UiErrorContext, UiEvent};

/// Starts the backend worker thread. Commands are served concurrently on a
/// tokio runtime owned by that thread until the command sender is dropped.
pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let service = build_service(&settings, &ui_tx);
        let base_url = settings.api_base_url.clone();
        tracing::info!(base_url = %base_url, "backend worker ready");

        while let Ok(cmd) = cmd_rx.recv() {
            runtime.spawn(run_command(
                Arc::clone(&service),
                cmd,
                ui_tx.clone(),
                base_url.clone(),
            ));
        }
        tracing::info!("ui command queue closed; backend worker stopping");
    });
}

fn build_service(settings: &Settings, ui_tx: &Sender<UiEvent>) -> Arc<dyn GradingService> {
    match GradingClient::new(&settings.api_base_url, settings.request_timeout) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            tracing::error!(error = %err, "failed to build grading client");
            let message = err.user_message();
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                message.clone(),
            )));
            Arc::new(MissingGradingService::new(message))
        }
    }
}

/// Executes one command against the service and reports exactly one event.
pub async fn run_command(
    service: Arc<dyn GradingService>,
    cmd: BackendCommand,
    ui_tx: Sender<UiEvent>,
    base_url: String,
) {
    let event = match cmd {
        BackendCommand::LoadScales => match service.list_scales().await {
            Ok(scales) => UiEvent::ScalesLoaded(Ok(scales)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load grading scales");
                UiEvent::ScalesLoaded(Err(load_failure_message(&base_url)))
            }
        },
        BackendCommand::ConvertGrade(request) => {
            let response = service.convert_grade(&request.to_wire()).await;
            UiEvent::PreviewResolved(PreviewResponse {
                outcome: PreviewOutcome::from_response(response),
                request,
            })
        }
        BackendCommand::Calculate { ticket, request } => {
            let outcome = service
                .calculate(&request)
                .await
                .map_err(|err| err.user_message());
            UiEvent::CalculationFinished { ticket, outcome }
        }
    };

    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!("ui event queue is full; backend result discarded");
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui event receiver dropped; backend result discarded");
        }
    }
}
