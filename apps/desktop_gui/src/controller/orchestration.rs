//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` without blocking the UI. An undeliverable command is handed
/// back so the caller can release whatever it reserved for it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> Option<BackendCommand> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            None
        }
        Err(TrySendError::Full(cmd)) => {
            *status = "UI command queue is full; please retry".to_string();
            Some(cmd)
        }
        Err(TrySendError::Disconnected(cmd)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure)"
                    .to_string();
            Some(cmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;
    use lwv_client_core::{SessionStore, StatsTicket};
    use lwv_shared::domain::PrimitiveId;

    use super::*;

    fn ticket() -> StatsTicket {
        SessionStore::default()
            .select_primitive(Some(PrimitiveId::Int(1)))
            .expect("ticket")
    }

    #[test]
    fn full_queue_hands_command_back() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, BackendCommand::FetchStats(ticket()), &mut status)
            .is_none());

        let returned =
            dispatch_backend_command(&tx, BackendCommand::FetchStats(ticket()), &mut status);

        assert!(matches!(returned, Some(BackendCommand::FetchStats(_))));
        assert!(status.contains("full"));
    }

    #[test]
    fn disconnected_worker_is_reported() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut status = String::new();

        let returned =
            dispatch_backend_command(&tx, BackendCommand::FetchStats(ticket()), &mut status);

        assert!(returned.is_some());
        assert!(status.contains("disconnected"));
    }
}
