//! Command handler registry
//!
//! Handlers are keyed by command name and then by namespace, so several
//! subsystems (the actor, audio, ...) can each react to the same command.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A registered handler. Receives the step duration in milliseconds.
pub type CommandHandler =
    Arc<dyn Fn(u64) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

type HandlerTable = HashMap<String, HashMap<String, CommandHandler>>;

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HandlerTable>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `command` under `namespace`, replacing any
    /// handler already registered for that pair.
    pub fn register<F, Fut>(&self, command: &str, namespace: &str, handler: F)
    where
        F: Fn(u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler: CommandHandler = Arc::new(move |step_time_ms| handler(step_time_ms).boxed());
        self.write()
            .entry(command.to_string())
            .or_default()
            .insert(namespace.to_string(), handler);
    }

    /// Returns true if a handler was removed.
    pub fn unregister(&self, command: &str, namespace: &str) -> bool {
        let mut table = self.write();
        let Some(namespaces) = table.get_mut(command) else {
            return false;
        };
        let removed = namespaces.remove(namespace).is_some();
        if namespaces.is_empty() {
            table.remove(command);
        }
        removed
    }

    pub fn has_handler(&self, command: &str) -> bool {
        self.read()
            .get(command)
            .is_some_and(|namespaces| !namespaces.is_empty())
    }

    /// Snapshot of every handler for `command`, taken so the lock is not held
    /// while the handlers run.
    pub fn handlers_for(&self, command: &str) -> Vec<CommandHandler> {
        self.read()
            .get(command)
            .map(|namespaces| namespaces.values().cloned().collect())
            .unwrap_or_default()
    }

    // A handler panicking mid-registration leaves the table usable.
    fn read(&self) -> RwLockReadGuard<'_, HandlerTable> {
        self.handlers.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HandlerTable> {
        self.handlers.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
