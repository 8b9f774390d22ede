//! Host boundary
//!
//! The host owns the current sequence snapshot and the run state. The
//! interpreter reads both at the start of every loop iteration and hands back
//! replacement snapshots; it never holds on to one between steps.

use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::program::ProgramSequence;
use crate::types::RunState;

#[async_trait]
pub trait Host: Send + Sync {
    /// Current sequence snapshot
    async fn sequence(&self) -> ProgramSequence;

    async fn run_state(&self) -> RunState;

    async fn set_run_state(&self, state: RunState);

    /// Replace the sequence. Returns once the update is applied.
    async fn publish_sequence(&self, sequence: ProgramSequence);
}

#[derive(Debug, Default)]
struct HostState {
    sequence: ProgramSequence,
    run_state: RunState,
}

/// In-process host holding the sequence and run state behind a lock.
///
/// Applies the user-facing run controls: play toggles between running and
/// pausing, stop while paused stops at once, and edits are refused while a
/// step may be in flight.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: RwLock<HostState>,
}

impl MemoryHost {
    pub fn new(sequence: ProgramSequence) -> Self {
        Self {
            state: RwLock::new(HostState {
                sequence,
                run_state: RunState::Stopped,
            }),
        }
    }

    pub fn snapshot(&self) -> ProgramSequence {
        self.read().sequence.clone()
    }

    pub fn current_run_state(&self) -> RunState {
        self.read().run_state
    }

    /// Play/pause control. Returns the new run state.
    ///
    /// Starting from stopped rewinds the program and arms its loops; the
    /// caller then drives the interpreter with `start_run`.
    pub fn play(&self) -> RunState {
        let mut state = self.write();
        let next = match state.run_state {
            RunState::Running => RunState::PauseRequested,
            RunState::PauseRequested | RunState::Paused => RunState::Running,
            RunState::Stopped | RunState::StopRequested => {
                state.sequence = state.sequence.initiate_program_run();
                RunState::Running
            }
        };
        debug!(from = %state.run_state, to = %next, "play");
        state.run_state = next;
        next
    }

    /// Request a stop. Returns the new run state.
    pub fn stop(&self) -> RunState {
        let mut state = self.write();
        state.run_state = resolve_transition(state.run_state, RunState::StopRequested);
        state.run_state
    }

    /// Apply `edit` to the sequence if editing is currently allowed.
    ///
    /// Returns whether the edit was applied.
    pub fn edit<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&ProgramSequence) -> ProgramSequence,
    {
        let mut state = self.write();
        if !state.run_state.editing_allowed() {
            debug!(run_state = %state.run_state, "edit refused");
            return false;
        }
        state.sequence = edit(&state.sequence);
        true
    }

    fn read(&self) -> RwLockReadGuard<'_, HostState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HostState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A stop requested while paused or stopped has no run loop left to observe it.
fn resolve_transition(current: RunState, requested: RunState) -> RunState {
    match (current, requested) {
        (RunState::Paused | RunState::Stopped, RunState::StopRequested) => RunState::Stopped,
        (_, requested) => requested,
    }
}

#[async_trait]
impl Host for MemoryHost {
    async fn sequence(&self) -> ProgramSequence {
        self.snapshot()
    }

    async fn run_state(&self) -> RunState {
        self.current_run_state()
    }

    async fn set_run_state(&self, run_state: RunState) {
        let mut state = self.write();
        state.run_state = resolve_transition(state.run_state, run_state);
    }

    async fn publish_sequence(&self, sequence: ProgramSequence) {
        self.write().sequence = sequence;
    }
}
