use thiserror::Error;

/// Failures that end a run.
///
/// Neither is fatal to the process: after the run stops the host can inspect
/// the sequence and start a new run.
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("no handler registered for command '{0}'")]
    UnknownCommand(String),

    #[error("handler for command '{command}' failed: {source}")]
    HandlerFailure {
        command: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl InterpreterError {
    pub fn handler_failure(command: impl Into<String>, source: anyhow::Error) -> Self {
        InterpreterError::HandlerFailure {
            command: command.into(),
            source: source.into(),
        }
    }

    /// The command that caused the failure
    pub fn command(&self) -> &str {
        match self {
            InterpreterError::UnknownCommand(command) => command,
            InterpreterError::HandlerFailure { command, .. } => command,
        }
    }
}
