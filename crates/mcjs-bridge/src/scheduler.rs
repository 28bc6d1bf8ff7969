use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Unique identifier for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    run_at: Instant,
    task: T,
}

/// Deferred one-shot tasks driven by the host's tick loop
///
/// Nothing runs on its own: tasks become due and are handed back from
/// [`TaskScheduler::tick`].
#[derive(Debug)]
pub struct TaskScheduler<T> {
    tasks: HashMap<TaskId, ScheduledTask<T>>,
    next_id: u64,
}

impl<T> TaskScheduler<T> {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `task` to become due after `delay`
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        self.schedule_at(Instant::now() + delay, task)
    }

    pub fn schedule_at(&mut self, run_at: Instant, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, ScheduledTask { run_at, task });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        self.tasks.remove(&id).map(|t| t.task)
    }

    /// Remove and return every task due at `now`, in scheduling order
    pub fn tick(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, t)| now >= t.run_at)
            .map(|(id, _)| *id)
            .collect();
        due.sort();

        due.into_iter()
            .filter_map(|id| self.tasks.remove(&id))
            .map(|t| t.task)
            .collect()
    }

    /// Remove every pending task
    pub fn drain(&mut self) -> Vec<T> {
        let mut pending: Vec<_> = self.tasks.drain().collect();
        pending.sort_by_key(|(id, _)| *id);
        pending.into_iter().map(|(_, t)| t.task).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }
}

impl<T> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
