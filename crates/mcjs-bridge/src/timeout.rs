use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::context::{CallbackHandle, ScriptEnvironment, ScriptValue};
use crate::error::{panic_message, HandlerError};

/// Runs single callback invocations under an optional deadline
///
/// With a deadline each invocation runs on its own short-lived worker thread.
/// A worker that overruns is abandoned: the caller gets
/// [`HandlerError::Timeout`] and the environment is asked to interrupt, but
/// the worker may keep running until the script yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutGuard {
    deadline: Option<Duration>,
}

impl TimeoutGuard {
    pub fn new(deadline: Option<Duration>) -> Self {
        Self { deadline }
    }

    pub fn unbounded() -> Self {
        Self { deadline: None }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn run_bounded(
        &self,
        environment: &Arc<dyn ScriptEnvironment>,
        callback: CallbackHandle,
        args: Vec<ScriptValue>,
    ) -> Result<(), HandlerError> {
        let Some(deadline) = self.deadline else {
            return Self::invoke(environment.as_ref(), &callback, &args);
        };

        // Capacity 1 so an abandoned worker never blocks on send
        let (tx, rx) = mpsc::sync_channel(1);
        let worker_env = environment.clone();
        thread::Builder::new()
            .name(format!("mcjs-handler-{}", callback.0))
            .spawn(move || {
                let result = Self::invoke(worker_env.as_ref(), &callback, &args);
                let _ = tx.send(result);
            })
            .map_err(|e| HandlerError::WorkerSpawn(e.to_string()))?;

        match rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                environment.interrupt();
                Err(HandlerError::Timeout { deadline })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(HandlerError::Panicked(
                "handler worker exited without a result".to_string(),
            )),
        }
    }

    fn invoke(
        environment: &dyn ScriptEnvironment,
        callback: &CallbackHandle,
        args: &[ScriptValue],
    ) -> Result<(), HandlerError> {
        match catch_unwind(AssertUnwindSafe(|| environment.invoke(callback, args))) {
            Ok(result) => result.map_err(HandlerError::from),
            Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

impl Default for TimeoutGuard {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(5)))
    }
}
