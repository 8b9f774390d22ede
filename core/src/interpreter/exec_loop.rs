//! Run loop and step dispatch
//!
//! ## Function Organization
//! 1. start_run() - Top-level driver (reads run state, calls step repeatedly)
//! 2. step() - Executes the block under the counter
//! 3. do_command() - Fans a command out to its handlers

use futures::future::try_join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::errors::InterpreterError;
use super::host::Host;
use super::Interpreter;
use crate::program::{Block, ProgramSequence};
use crate::types::RunState;

/* ===================== Public API ===================== */

impl<H: Host> Interpreter<H> {
    /// Run until the program ends, a pause or stop is observed, or a step fails.
    ///
    /// Returns immediately if a run loop is already active. On failure the
    /// run state is set to stopped before the error is returned.
    pub async fn start_run(&self) -> Result<(), InterpreterError> {
        let Some(_guard) = RunGuard::acquire(&self.is_running) else {
            debug!("run loop already active");
            return Ok(());
        };

        loop {
            let run_state = self.host.run_state().await;
            match run_state {
                RunState::Running => {
                    let sequence = self.host.sequence().await;
                    if sequence.at_end() {
                        info!("program finished");
                        self.host.set_run_state(RunState::Stopped).await;
                        return Ok(());
                    }
                    if let Err(err) = self.step(&sequence).await {
                        warn!(error = %err, "step failed, stopping run");
                        self.host.set_run_state(RunState::Stopped).await;
                        return Err(err);
                    }
                }
                RunState::PauseRequested => {
                    info!("run paused");
                    self.host.set_run_state(RunState::Paused).await;
                    return Ok(());
                }
                RunState::StopRequested => {
                    info!("run stopped");
                    self.host.set_run_state(RunState::Stopped).await;
                    return Ok(());
                }
                RunState::Stopped | RunState::Paused => {
                    debug!(%run_state, "nothing to run");
                    return Ok(());
                }
            }
        }
    }

    /// Execute the block under the counter of `sequence` and publish the result.
    ///
    /// A sequence already at its end is left alone. On failure nothing is
    /// published, so the counter stays on the failing block.
    pub async fn step(&self, sequence: &ProgramSequence) -> Result<(), InterpreterError> {
        let Some(block) = sequence.current_step() else {
            return Ok(());
        };
        let program_counter = sequence.program_counter();
        debug!(program_counter, ?block, "step");

        let next = match block {
            Block::LoopStart { .. } => sequence.increment_program_counter(),
            Block::LoopEnd { .. } => {
                let next = sequence.advance_program_counter(false);
                if sequence.loop_body_is_empty(program_counter) {
                    tokio::time::sleep(Duration::from_millis(self.step_time())).await;
                }
                next
            }
            Block::Movement { command } => {
                self.do_command(command).await?;
                sequence.increment_program_counter()
            }
        };

        self.host.publish_sequence(next).await;
        Ok(())
    }

    /// Run every handler registered for `command` concurrently.
    ///
    /// Independent of any sequence; stepping a movement block goes through here.
    pub async fn do_command(&self, command: &str) -> Result<(), InterpreterError> {
        let handlers = self.handlers.handlers_for(command);
        if handlers.is_empty() {
            warn!(command, "no handler registered");
            return Err(InterpreterError::UnknownCommand(command.to_string()));
        }

        let step_time_ms = self.step_time();
        try_join_all(handlers.iter().map(|handler| handler(step_time_ms)))
            .await
            .map_err(|source| InterpreterError::handler_failure(command, source))?;
        Ok(())
    }
}

/* ===================== Reentrancy ===================== */

/// Holds the run flag for the lifetime of one run loop
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
