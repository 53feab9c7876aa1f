//! Backend commands queued from UI to backend worker.

use lwv_client_core::{PendingOperation, StatsTicket};

#[derive(Debug)]
pub enum BackendCommand {
    /// Runs an operation whose in-flight guard the UI thread already took.
    Run(PendingOperation),
    FetchStats(StatsTicket),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Run(operation) => operation.kind().as_str(),
            BackendCommand::FetchStats(_) => "fetch_stats",
        }
    }
}
