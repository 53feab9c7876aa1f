//! Client-side state and orchestration for the line width variation viewer.

pub mod bridge;
pub mod store;
pub mod workflow;

pub use bridge::{EngineBridge, FixedPaths, HttpBridge, MissingEngineBridge, PathPrompt};
pub use store::{SelectionPolicy, SessionSnapshot, SessionStore, StatsTicket};
pub use workflow::{
    GenerateStage, LoadKind, OperationKind, OperationOutcome, PendingOperation, StatsOutcome,
    WorkflowController, WorkflowError, WorkflowState,
};
