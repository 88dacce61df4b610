use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::task::Task;

/// FIFO hand-off between request handlers and the engine thread.
///
/// Producers never block beyond the short critical section. The engine peeks
/// with [`TaskQueue::has_pending`] while a program runs and only dequeues once
/// that program has unwound.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> TaskQueue {
        TaskQueue::default()
    }

    pub fn enqueue(&self, task: Task) {
        self.lock().push_back(task);
    }

    /// Enqueue `task` only if nothing else is waiting. Returns whether it was
    /// enqueued.
    pub fn enqueue_if_empty(&self, task: Task) -> bool {
        let mut tasks = self.lock();
        if tasks.is_empty() {
            tasks.push_back(task);
            true
        } else {
            false
        }
    }

    pub fn try_dequeue(&self) -> Option<Task> {
        self.lock().pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Task>> {
        // A panicking producer cannot leave a VecDeque half-written.
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
