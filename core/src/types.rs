use serde::{Deserialize, Serialize};

/// Run state of a program, owned by the host and transitioned by the
/// interpreter and by user controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    #[default]
    Stopped,
    Running,
    PauseRequested,
    Paused,
    StopRequested,
}

impl RunState {
    /// Structural edits are only accepted while nothing is in flight.
    pub fn editing_allowed(&self) -> bool {
        matches!(self, RunState::Stopped | RunState::Paused)
    }

    /// True while a run exists, including a paused one.
    pub fn is_active(&self) -> bool {
        !matches!(self, RunState::Stopped | RunState::StopRequested)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Stopped => "stopped",
            RunState::Running => "running",
            RunState::PauseRequested => "pauseRequested",
            RunState::Paused => "paused",
            RunState::StopRequested => "stopRequested",
        };
        write!(f, "{}", name)
    }
}
