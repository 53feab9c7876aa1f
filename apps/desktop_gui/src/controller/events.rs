//! UI/backend events and error modeling for desktop GUI controller.

use lwv_client_core::{OperationKind, OperationOutcome, StatsOutcome, StatsTicket, WorkflowError};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    OperationFinished {
        kind: OperationKind,
        result: Result<OperationOutcome, UiError>,
    },
    StatsFinished {
        ticket: StatsTicket,
        result: Result<StatsOutcome, UiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Decode,
    Engine,
    Unknown,
}

impl UiErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            UiErrorCategory::Transport => "Engine connection",
            UiErrorCategory::Decode => "Invalid engine data",
            UiErrorCategory::Engine => "Engine",
            UiErrorCategory::Unknown => "Unexpected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Open,
    Save,
    Generate,
    Stats,
}

impl UiErrorContext {
    pub fn for_operation(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Open => UiErrorContext::Open,
            OperationKind::Save => UiErrorContext::Save,
            OperationKind::Generate => UiErrorContext::Generate,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "Starting the engine worker",
            UiErrorContext::Open => "Opening the design",
            UiErrorContext::Save => "Saving the design",
            UiErrorContext::Generate => "Generating variation",
            UiErrorContext::Stats => "Loading statistics",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("malformed")
            || lower.contains("unreadable body")
            || lower.contains("decode")
            || lower.contains("length mismatch")
        {
            UiErrorCategory::Decode
        } else if lower.contains("connection")
            || lower.contains("connect")
            || lower.contains("timed out")
            || lower.contains("dns")
            || lower.contains("unavailable")
            || lower.contains("disconnect")
            || lower.contains("error sending request")
        {
            UiErrorCategory::Transport
        } else if lower.contains("engine error") || lower.contains("rejected") {
            UiErrorCategory::Engine
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_workflow(context: UiErrorContext, err: &WorkflowError) -> Self {
        let message = err.to_string();
        let category = match err {
            WorkflowError::Decode(_) => UiErrorCategory::Decode,
            WorkflowError::Engine(_) | WorkflowError::Rejected { .. } => UiErrorCategory::Engine,
            WorkflowError::Bridge { .. } | WorkflowError::Busy { .. } => {
                return Self::from_message(context, message);
            }
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Banner text: what failed, then why.
    pub fn summary(&self) -> String {
        format!(
            "{} failed ({}): {}",
            self.context.action(),
            self.category.label(),
            self.message
        )
    }
}
