use mcjs_events::{EventPriority, EventRef};
use tracing::{debug, error, info, warn};

use crate::context::{ScriptValue, SubscriptionContext};
use crate::error::HandlerError;
use crate::registry::{HandlerEntry, MatchedSubscription};
use crate::timeout::TimeoutGuard;

/// Summary of one fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub invoked: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl FanoutReport {
    pub fn succeeded(&self) -> usize {
        self.invoked - self.failed - self.timed_out
    }
}

/// Invokes matched handlers in tier order
pub struct FanoutExecutor {
    guard: TimeoutGuard,
    debug_mode: bool,
}

impl FanoutExecutor {
    pub fn new(guard: TimeoutGuard, debug_mode: bool) -> Self {
        Self { guard, debug_mode }
    }

    /// Run every matched handler once, `Lowest` tier first, then registration order
    ///
    /// Failures and timeouts are logged and never stop the remaining handlers.
    pub fn execute(&self, event: &EventRef, matched: Vec<MatchedSubscription>) -> FanoutReport {
        let mut ordered: Vec<(SubscriptionContext, HandlerEntry)> = matched
            .into_iter()
            .flat_map(|m| {
                let context = m.context;
                m.entries.into_iter().map(move |e| (context.clone(), e))
            })
            .collect();
        ordered.sort_by_key(|(_, entry)| (entry.priority, entry.sequence));

        let type_name = event.event_type().qualified_name();
        let mut report = FanoutReport::default();

        for (context, entry) in ordered {
            if self.debug_mode {
                info!(target: "bridge", "Executing {} handler {} of '{}' for {}",
                    entry.priority, entry.callback, context.module(), type_name);
            }

            let cancelled_before = event.is_cancelled();
            let result = self.guard.run_bounded(
                context.environment(),
                entry.callback,
                vec![ScriptValue::Event(event.clone())],
            );
            report.invoked += 1;

            match result {
                Ok(()) => {}
                Err(HandlerError::Timeout { deadline }) => {
                    report.timed_out += 1;
                    warn!(target: "bridge", "Handler {} of '{}' for {} exceeded {:?} and was abandoned",
                        entry.callback, context.module(), type_name, deadline);
                }
                Err(e) => {
                    report.failed += 1;
                    error!(target: "bridge", "Error in handler {} of '{}' for {}: {}",
                        entry.callback, context.module(), type_name, e);
                }
            }

            if entry.priority == EventPriority::Monitor && event.is_cancelled() != cancelled_before {
                warn!(target: "bridge", "MONITOR handler of '{}' changed the cancelled state of {}",
                    context.module(), type_name);
            }
        }

        debug!(target: "bridge", "Fan-out for {} finished: {:?}", type_name, report);
        report
    }
}
