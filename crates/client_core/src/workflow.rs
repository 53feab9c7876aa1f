//! Open/save/generate state machine and selection-driven stats fetching.
//!
//! ```text
//! Idle --open-->     Loading(Open)  --ok/cancel--> Idle
//!                                   --err-------> Error
//! Idle --save-->     Loading(Save)  --any-------> Idle
//! Idle --generate--> Generating(Requesting -> RefreshingNets -> RefreshingStats)
//!                                   --ok--------> Idle
//!                                   --err-------> Error
//! Error --ack--> Idle, and any operation may begin from Error.
//! ```
//!
//! Each operation is split into [`WorkflowController::begin`], which applies
//! the in-flight guard synchronously, and [`WorkflowController::run`], which
//! performs the bridge calls.

use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use lwv_shared::{
    domain::PrimitiveId,
    error::DecodeError,
    geometry::decode_nets,
    protocol::{LoadEdbResponse, Settings, VariationStats},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    bridge::EngineBridge,
    store::{SelectionPolicy, SessionStore, StatsTicket},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Open,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateStage {
    Requesting,
    RefreshingNets,
    RefreshingStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Loading(LoadKind),
    Generating(GenerateStage),
    Error(String),
}

impl WorkflowState {
    /// Whether an open/save/generate is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Loading(_) | Self::Generating(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading(LoadKind::Open) => f.write_str("opening design"),
            Self::Loading(LoadKind::Save) => f.write_str("saving design"),
            Self::Generating(GenerateStage::Requesting) => f.write_str("generating variation"),
            Self::Generating(GenerateStage::RefreshingNets) => f.write_str("refreshing nets"),
            Self::Generating(GenerateStage::RefreshingStats) => f.write_str("refreshing stats"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("busy: {current}")]
    Busy { current: WorkflowState },
    #[error("{call} failed: {message}")]
    Bridge { call: &'static str, message: String },
    #[error("engine error: {0}")]
    Engine(String),
    #[error("engine returned malformed data: {0}")]
    Decode(#[from] DecodeError),
    #[error("engine rejected {call}")]
    Rejected { call: &'static str },
}

impl WorkflowError {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

fn bridge_failure(call: &'static str) -> impl FnOnce(anyhow::Error) -> WorkflowError {
    move |err| WorkflowError::Bridge {
        call,
        message: format!("{err:#}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Open,
    Save,
    Generate,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Save => "save",
            Self::Generate => "generate",
        }
    }
}

#[derive(Debug)]
enum Pending {
    Open,
    Save,
    Generate(Settings),
}

/// An operation that passed the in-flight guard. Only
/// [`WorkflowController::begin`] creates one, and [`WorkflowController::run`]
/// consumes it.
#[derive(Debug)]
#[must_use = "a begun operation keeps the workflow busy until it is run"]
pub struct PendingOperation(Pending);

impl PendingOperation {
    pub fn kind(&self) -> OperationKind {
        match self.0 {
            Pending::Open => OperationKind::Open,
            Pending::Save => OperationKind::Save,
            Pending::Generate(_) => OperationKind::Generate,
        }
    }

    /// Settings captured when a generate began.
    pub fn settings(&self) -> Option<&Settings> {
        match &self.0 {
            Pending::Generate(settings) => Some(settings),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsOutcome {
    /// Stats were written to the store; `present` is false for an absent
    /// result.
    Applied { present: bool },
    /// The selection moved on before the response arrived.
    Discarded,
    NotRequested,
    /// Post-generation refresh failed; the new nets are kept.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Opened { path: PathBuf, nets: usize },
    Saved { path: PathBuf },
    Generated { nets: usize, stats: StatsOutcome },
    /// The user dismissed the file dialog.
    Cancelled,
}

#[derive(Clone)]
pub struct WorkflowController {
    bridge: Arc<dyn EngineBridge>,
    store: SessionStore,
    state: Arc<Mutex<WorkflowState>>,
    /// Latest selection whose fetch was left to the running generate.
    deferred_stats: Arc<Mutex<Option<StatsTicket>>>,
}

impl WorkflowController {
    pub fn new(bridge: Arc<dyn EngineBridge>, store: SessionStore) -> Self {
        Self {
            bridge,
            store,
            state: Arc::new(Mutex::new(WorkflowState::Idle)),
            deferred_stats: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: WorkflowState) {
        *self.lock_state() = next;
    }

    pub fn state(&self) -> WorkflowState {
        self.lock_state().clone()
    }

    fn take_deferred_stats(&self) -> Option<StatsTicket> {
        self.deferred_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Leaves `Error`; any other state is unaffected.
    pub fn acknowledge_error(&self) {
        let mut state = self.lock_state();
        if matches!(*state, WorkflowState::Error(_)) {
            *state = WorkflowState::Idle;
        }
    }

    /// Applies the in-flight guard and captures what the operation needs from
    /// the store at this instant.
    pub fn begin(&self, kind: OperationKind) -> Result<PendingOperation, WorkflowError> {
        let mut state = self.lock_state();
        if state.is_busy() {
            let current = state.clone();
            warn!(
                operation = kind.as_str(),
                %current,
                "workflow: rejected, another operation is in flight"
            );
            return Err(WorkflowError::Busy { current });
        }
        let (next, pending) = match kind {
            OperationKind::Open => (WorkflowState::Loading(LoadKind::Open), Pending::Open),
            OperationKind::Save => (WorkflowState::Loading(LoadKind::Save), Pending::Save),
            OperationKind::Generate => (
                WorkflowState::Generating(GenerateStage::Requesting),
                Pending::Generate(self.store.settings()),
            ),
        };
        *state = next;
        drop(state);
        self.store.set_loading(true);
        info!(operation = kind.as_str(), "workflow: begin");
        Ok(PendingOperation(pending))
    }

    /// Releases the in-flight guard of an operation that will never run.
    pub fn abandon(&self, operation: PendingOperation) {
        warn!(
            operation = operation.kind().as_str(),
            "workflow: abandoned before running"
        );
        self.take_deferred_stats();
        self.set_state(WorkflowState::Idle);
        self.store.set_loading(false);
    }

    pub async fn run(
        &self,
        operation: PendingOperation,
    ) -> Result<OperationOutcome, WorkflowError> {
        let kind = operation.kind();
        let result = match operation.0 {
            Pending::Open => self.run_open().await,
            Pending::Save => self.run_save().await,
            Pending::Generate(settings) => {
                let result = self.run_generate(settings).await;
                if result.is_err() {
                    self.fetch_deferred_stats().await;
                }
                result
            }
        };
        self.finish(kind, &result);
        result
    }

    fn finish(&self, kind: OperationKind, result: &Result<OperationOutcome, WorkflowError>) {
        let next = match result {
            Ok(outcome) => {
                info!(operation = kind.as_str(), ?outcome, "workflow: done");
                WorkflowState::Idle
            }
            Err(err) if kind == OperationKind::Save => {
                warn!(operation = kind.as_str(), "workflow: {err}");
                WorkflowState::Idle
            }
            Err(err) => {
                warn!(operation = kind.as_str(), "workflow: {err}");
                WorkflowState::Error(err.to_string())
            }
        };
        self.set_state(next);
        self.store.set_loading(false);
    }

    pub async fn open(&self) -> Result<OperationOutcome, WorkflowError> {
        let operation = self.begin(OperationKind::Open)?;
        self.run(operation).await
    }

    pub async fn save(&self) -> Result<OperationOutcome, WorkflowError> {
        let operation = self.begin(OperationKind::Save)?;
        self.run(operation).await
    }

    pub async fn generate(&self) -> Result<OperationOutcome, WorkflowError> {
        let operation = self.begin(OperationKind::Generate)?;
        self.run(operation).await
    }

    async fn run_open(&self) -> Result<OperationOutcome, WorkflowError> {
        let Some(path) = self
            .bridge
            .open_file_dialog()
            .await
            .map_err(bridge_failure("open_file_dialog"))?
        else {
            debug!("workflow: open cancelled");
            return Ok(OperationOutcome::Cancelled);
        };
        let wire = match self
            .bridge
            .load_edb(&path)
            .await
            .map_err(bridge_failure("load_edb"))?
        {
            LoadEdbResponse::Loaded(payload) => payload.nets,
            LoadEdbResponse::Failed { error } => return Err(WorkflowError::Engine(error)),
        };
        let nets = decode_nets(wire)?;
        let count = nets.len();
        self.store.replace_nets(nets, SelectionPolicy::Clear);
        info!(path = %path.display(), nets = count, "workflow: design loaded");
        Ok(OperationOutcome::Opened { path, nets: count })
    }

    async fn run_save(&self) -> Result<OperationOutcome, WorkflowError> {
        let Some(path) = self
            .bridge
            .save_file_dialog()
            .await
            .map_err(bridge_failure("save_file_dialog"))?
        else {
            debug!("workflow: save cancelled");
            return Ok(OperationOutcome::Cancelled);
        };
        let saved = self
            .bridge
            .save_edb(&path)
            .await
            .map_err(bridge_failure("save_edb"))?;
        if !saved {
            return Err(WorkflowError::Rejected { call: "save_edb" });
        }
        Ok(OperationOutcome::Saved { path })
    }

    async fn run_generate(&self, settings: Settings) -> Result<OperationOutcome, WorkflowError> {
        debug!(?settings, "workflow: generating");
        let accepted = self
            .bridge
            .generate_variation(&settings)
            .await
            .map_err(bridge_failure("generate_variation"))?;
        if !accepted {
            return Err(WorkflowError::Rejected {
                call: "generate_variation",
            });
        }

        self.set_state(WorkflowState::Generating(GenerateStage::RefreshingNets));
        let payload = self
            .bridge
            .get_nets()
            .await
            .map_err(bridge_failure("get_nets"))?;
        let nets = decode_nets(payload.nets)?;
        let count = nets.len();
        self.store.replace_nets(nets, SelectionPolicy::Keep);

        // Enter RefreshingStats before reading the selection; selections made
        // from here on fetch on their own.
        self.set_state(WorkflowState::Generating(GenerateStage::RefreshingStats));
        self.take_deferred_stats();
        let stats = match self.store.stats_ticket() {
            None => StatsOutcome::NotRequested,
            Some(ticket) => match self.apply_stats(&ticket).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(primitive_id = %ticket.primitive_id(), "workflow: stats refresh: {err}");
                    StatsOutcome::Failed(err.to_string())
                }
            },
        };
        Ok(OperationOutcome::Generated { nets: count, stats })
    }

    /// A generate that failed before refreshing stats still owes the fetch
    /// for any selection made while it ran. Failures here leave the
    /// generate's own error in charge.
    async fn fetch_deferred_stats(&self) {
        let Some(ticket) = self.take_deferred_stats() else {
            return;
        };
        match self.apply_stats(&ticket).await {
            Ok(outcome) => debug!(
                primitive_id = %ticket.primitive_id(),
                ?outcome,
                "workflow: deferred stats fetched"
            ),
            Err(err) => warn!(
                primitive_id = %ticket.primitive_id(),
                "workflow: deferred stats: {err}"
            ),
        }
    }

    /// Changes the selection. Returns the ticket to fetch stats with, or
    /// `None` when nothing needs fetching: no selection, an unchanged one, or
    /// a generate that will refresh stats itself.
    pub fn select_primitive(&self, id: Option<PrimitiveId>) -> Option<StatsTicket> {
        let ticket = self.store.select_primitive(id)?;
        let deferred = matches!(
            self.state(),
            WorkflowState::Generating(GenerateStage::Requesting | GenerateStage::RefreshingNets)
        );
        if deferred {
            debug!(
                primitive_id = %ticket.primitive_id(),
                "workflow: stats fetch deferred to generate"
            );
            *self
                .deferred_stats
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(ticket);
            return None;
        }
        Some(ticket)
    }

    /// Fetches stats for `ticket` and stores them if the selection has not
    /// moved on. A failed fetch for a current selection surfaces as `Error`
    /// when nothing else is in flight; a failed stale fetch is ignored.
    pub async fn fetch_stats(&self, ticket: StatsTicket) -> Result<StatsOutcome, WorkflowError> {
        match self.apply_stats(&ticket).await {
            Ok(outcome) => Ok(outcome),
            Err(_) if !self.store.is_current(&ticket) => {
                debug!(
                    primitive_id = %ticket.primitive_id(),
                    "workflow: stale stats failure ignored"
                );
                Ok(StatsOutcome::Discarded)
            }
            Err(err) => {
                warn!(primitive_id = %ticket.primitive_id(), "workflow: {err}");
                let mut state = self.lock_state();
                if *state == WorkflowState::Idle {
                    *state = WorkflowState::Error(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// [`Self::select_primitive`] followed by [`Self::fetch_stats`].
    pub async fn select_and_fetch(
        &self,
        id: Option<PrimitiveId>,
    ) -> Result<StatsOutcome, WorkflowError> {
        match self.select_primitive(id) {
            Some(ticket) => self.fetch_stats(ticket).await,
            None => Ok(StatsOutcome::NotRequested),
        }
    }

    async fn apply_stats(&self, ticket: &StatsTicket) -> Result<StatsOutcome, WorkflowError> {
        let id = ticket.primitive_id();
        let wire = self
            .bridge
            .get_primitive_stats(id)
            .await
            .map_err(bridge_failure("get_primitive_stats"))?;
        let stats = match wire {
            Some(wire) => VariationStats::from_wire(id.clone(), wire)?,
            None => None,
        };
        let present = stats.is_some();
        if self.store.set_stats(ticket, stats) {
            debug!(primitive_id = %id, present, "workflow: stats applied");
            Ok(StatsOutcome::Applied { present })
        } else {
            debug!(primitive_id = %id, "workflow: stale stats discarded");
            Ok(StatsOutcome::Discarded)
        }
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
