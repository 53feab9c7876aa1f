//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use crossbeam_channel::{Receiver, Sender};
use lwv_client_core::WorkflowController;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the worker thread. Each command runs as its own task so a slow
/// generate never holds up stats fetches.
pub fn launch(
    controller: WorkflowController,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    let spawned = thread::Builder::new()
        .name("lwv-backend".to_string())
        .spawn(move || run_worker(controller, cmd_rx, ui_tx));
    if let Err(err) = spawned {
        tracing::error!("failed to spawn backend worker thread: {err}");
    }
}

fn run_worker(
    controller: WorkflowController,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
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

    runtime.block_on(async move {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
        while let Ok(cmd) = cmd_rx.recv() {
            let controller = controller.clone();
            let ui_tx = ui_tx.clone();
            match cmd {
                BackendCommand::Run(operation) => {
                    let kind = operation.kind();
                    tokio::spawn(async move {
                        let result = controller.run(operation).await.map_err(|err| {
                            UiError::from_workflow(UiErrorContext::for_operation(kind), &err)
                        });
                        let _ = ui_tx.try_send(UiEvent::OperationFinished { kind, result });
                    });
                }
                BackendCommand::FetchStats(ticket) => {
                    tokio::spawn(async move {
                        let result = controller
                            .fetch_stats(ticket.clone())
                            .await
                            .map_err(|err| UiError::from_workflow(UiErrorContext::Stats, &err));
                        let _ = ui_tx.try_send(UiEvent::StatsFinished { ticket, result });
                    });
                }
            }
        }
        tracing::info!("backend command queue closed; worker exiting");
    });
}
