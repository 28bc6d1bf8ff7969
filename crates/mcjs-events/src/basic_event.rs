use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::descriptor::EventTypeDescriptor;
use crate::host::HostEvent;

/// A generic event carrying string fields
///
/// Hosts without a dedicated payload type for an event fire one of these.
#[derive(Debug)]
pub struct BasicEvent {
    event_type: EventTypeDescriptor,
    cancellable: bool,
    cancelled: AtomicBool,
    fields: BTreeMap<String, String>,
}

impl BasicEvent {
    pub fn new(event_type: EventTypeDescriptor) -> Self {
        Self {
            event_type,
            cancellable: true,
            cancelled: AtomicBool::new(false),
            fields: BTreeMap::new(),
        }
    }

    /// Mark the event as one that cannot be suppressed
    pub fn not_cancellable(mut self) -> Self {
        self.cancellable = false;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

impl HostEvent for BasicEvent {
    fn event_type(&self) -> &EventTypeDescriptor {
        &self.event_type
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn set_cancelled(&self, cancelled: bool) {
        if self.cancellable {
            self.cancelled.store(cancelled, Ordering::SeqCst);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
