//! Test helpers for interpreter tests
//!
//! A host that records what the interpreter publishes, plus handler builders

use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::interpreter::{Host, Interpreter, MemoryHost};
use crate::program::{Block, ProgramBlock, ProgramSequence};
use crate::types::RunState;

/// Delegates to a `MemoryHost` and records every published counter and
/// every run-state request
#[derive(Default)]
pub struct RecordingHost {
    pub inner: MemoryHost,
    published: Mutex<Vec<usize>>,
    run_states: Mutex<Vec<RunState>>,
}

impl RecordingHost {
    pub fn new(sequence: ProgramSequence) -> Self {
        Self {
            inner: MemoryHost::new(sequence),
            ..Self::default()
        }
    }

    pub fn published_counters(&self) -> Vec<usize> {
        self.published.lock().unwrap().clone()
    }

    pub fn requested_run_states(&self) -> Vec<RunState> {
        self.run_states.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn sequence(&self) -> ProgramSequence {
        self.inner.sequence().await
    }

    async fn run_state(&self) -> RunState {
        self.inner.run_state().await
    }

    async fn set_run_state(&self, state: RunState) {
        self.run_states.lock().unwrap().push(state);
        self.inner.set_run_state(state).await;
    }

    async fn publish_sequence(&self, sequence: ProgramSequence) {
        self.published.lock().unwrap().push(sequence.program_counter());
        self.inner.publish_sequence(sequence).await;
    }
}

pub fn program(blocks: Vec<Block>) -> ProgramSequence {
    let loop_counter = blocks.iter().filter(|b| matches!(b, Block::LoopStart { .. })).count() as u32;
    ProgramSequence::new(
        blocks.into_iter().map(ProgramBlock::new).collect(),
        0,
        loop_counter,
        Default::default(),
    )
}

/// Interpreter over a recording host holding `blocks`
pub fn interpreter(blocks: Vec<Block>, step_time_ms: u64) -> Interpreter<RecordingHost> {
    Interpreter::new(step_time_ms, Arc::new(RecordingHost::new(program(blocks))))
}

/// Handler that counts its invocations
pub fn counting(
    calls: &Arc<AtomicUsize>,
) -> impl Fn(u64) -> std::future::Ready<anyhow::Result<()>> + Send + Sync + 'static {
    let calls = calls.clone();
    move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(anyhow::Ok(()))
    }
}

/// Handler that waits for the step duration, like a real animation would
pub fn pacing(
) -> impl Fn(u64) -> futures::future::BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static {
    ok_after(|step_time_ms| tokio::time::sleep(std::time::Duration::from_millis(step_time_ms)))
}

/// Register a counting handler for every command in `commands`
pub fn register_counting<H: Host>(
    interpreter: &Interpreter<H>,
    commands: &[&str],
) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    for command in commands {
        interpreter.register_handler(command, "test", counting(&calls));
    }
    calls
}

/// Wrap a future-producing closure so it resolves to `Ok(())`
pub fn ok_after<F, Fut>(f: F) -> impl Fn(u64) -> futures::future::BoxFuture<'static, anyhow::Result<()>>
       + Send
       + Sync
       + 'static
where
    F: Fn(u64) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    use futures::FutureExt;
    move |step_time_ms| {
        let fut = f(step_time_ms);
        async move {
            fut.await;
            anyhow::Ok(())
        }
        .boxed()
    }
}
