//! # Execution Engine
//!
//! Drives a program one block at a time against a [`Host`]:
//!
//! - `LoopStart` enters the loop body
//! - `LoopEnd` repeats or leaves the loop (`advance_program_counter`)
//! - any other block runs every handler registered for its command
//!
//! Only one run loop is active per interpreter. Pause and stop are
//! cooperative: they take effect between steps, never inside one.

pub mod errors;
pub mod exec_loop;
pub mod handlers;
pub mod host;

#[cfg(test)]
mod tests;

pub use errors::InterpreterError;
pub use handlers::{CommandHandler, HandlerRegistry};
pub use host::{Host, MemoryHost};

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Step-by-step program interpreter
pub struct Interpreter<H: Host> {
    host: Arc<H>,
    handlers: HandlerRegistry,
    step_time_ms: AtomicU64,
    /// Set while a run loop is active
    is_running: AtomicBool,
}

impl<H: Host> Interpreter<H> {
    pub fn new(step_time_ms: u64, host: Arc<H>) -> Self {
        Self {
            host,
            handlers: HandlerRegistry::new(),
            step_time_ms: AtomicU64::new(step_time_ms),
            is_running: AtomicBool::new(false),
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Step duration handed to handlers and used for empty-loop pacing
    pub fn step_time(&self) -> u64 {
        self.step_time_ms.load(Ordering::Relaxed)
    }

    /// Takes effect from the next step
    pub fn set_step_time(&self, step_time_ms: u64) {
        self.step_time_ms.store(step_time_ms, Ordering::Relaxed);
    }

    pub fn register_handler<F, Fut>(&self, command: &str, namespace: &str, handler: F)
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.handlers.register(command, namespace, handler);
    }

    pub fn unregister_handler(&self, command: &str, namespace: &str) -> bool {
        self.handlers.unregister(command, namespace)
    }

    pub fn has_handler(&self, command: &str) -> bool {
        self.handlers.has_handler(command)
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }
}
