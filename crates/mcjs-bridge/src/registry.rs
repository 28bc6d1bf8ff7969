use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use mcjs_events::{EventPriority, EventTypeDescriptor};

use crate::context::{CallbackHandle, ModuleId, SubscriptionContext};

/// One subscribed callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerEntry {
    pub callback: CallbackHandle,
    pub priority: EventPriority,
    /// Registry-wide insertion order
    pub sequence: u64,
}

/// Handlers one context holds for one registered type
#[derive(Debug, Clone)]
pub struct MatchedSubscription {
    pub registered_type: EventTypeDescriptor,
    pub context: SubscriptionContext,
    pub entries: Vec<HandlerEntry>,
}

type ContextHandlers = HashMap<SubscriptionContext, Vec<HandlerEntry>>;

/// Concurrent store of type -> context -> handlers
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<EventTypeDescriptor, ContextHandlers>>,
    next_sequence: AtomicU64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler, creating the type and context lists as needed
    pub fn subscribe(
        &self,
        event_type: &EventTypeDescriptor,
        context: &SubscriptionContext,
        callback: CallbackHandle,
        priority: EventPriority,
    ) -> HandlerEntry {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        // Sequence is taken under the write lock so it matches list order
        let entry = HandlerEntry {
            callback,
            priority,
            sequence: self.next_sequence.fetch_add(1, Ordering::SeqCst),
        };
        handlers
            .entry(event_type.clone())
            .or_default()
            .entry(context.clone())
            .or_default()
            .push(entry);
        entry
    }

    /// Every subscription whose registered type includes `fired_type`
    ///
    /// Taken under one read lock, so it reflects a single point in time.
    pub fn snapshot_for(&self, fired_type: &EventTypeDescriptor) -> Vec<MatchedSubscription> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        fired_type
            .lineage()
            .filter_map(|ancestor| handlers.get_key_value(ancestor))
            .flat_map(|(registered_type, contexts)| {
                contexts
                    .iter()
                    .filter(|(_, entries)| !entries.is_empty())
                    .map(move |(context, entries)| MatchedSubscription {
                        registered_type: registered_type.clone(),
                        context: context.clone(),
                        entries: entries.clone(),
                    })
            })
            .collect()
    }

    /// Remove every handler a module registered; returns how many were removed
    pub fn remove_module(&self, module: &ModuleId) -> usize {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = 0;
        for contexts in handlers.values_mut() {
            contexts.retain(|context, entries| {
                if context.module() == module {
                    removed += entries.len();
                    false
                } else {
                    true
                }
            });
        }
        handlers.retain(|_, contexts| !contexts.is_empty());
        removed
    }

    pub fn clear(&self) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Total number of handler entries
    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flat_map(|contexts| contexts.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handler_count() == 0
    }
}
