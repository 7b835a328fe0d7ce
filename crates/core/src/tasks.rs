//! Named task queues fed from outside the synchronization thread.
//!
//! The queue map is the only structure in the session shared across threads.
//! Producer threads (timers, workers pushing live data) clone the
//! [`TaskQueues`] handle and enqueue; the synchronization thread drains all
//! queues at the start of each cycle. A coarse mutex around the whole map is
//! sufficient at session scale.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::app::ApplicationInstance;

/// A deferred unit of work, executed on the synchronization thread with
/// exclusive access to the session.
pub type Task = Box<dyn FnOnce(&mut ApplicationInstance) + Send + 'static>;

/// Opaque token naming one task queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskQueueHandle(u64);

#[derive(Default)]
struct QueueMap {
	next: u64,
	queues: BTreeMap<u64, VecDeque<Task>>,
}

/// Cloneable handle to the session's task queues.
#[derive(Clone, Default)]
pub struct TaskQueues {
	inner: Arc<Mutex<QueueMap>>,
}

impl TaskQueues {
	/// Creates an empty queue set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a new queue and returns its handle.
	pub fn create(&self) -> TaskQueueHandle {
		let mut map = self.inner.lock();
		let handle = TaskQueueHandle(map.next);
		map.next += 1;
		map.queues.insert(handle.0, VecDeque::new());
		handle
	}

	/// Enqueues `task` on `queue`.
	///
	/// Returns `false` when the queue was removed; the task is dropped.
	pub fn enqueue(&self, queue: TaskQueueHandle, task: Task) -> bool {
		let mut map = self.inner.lock();
		match map.queues.get_mut(&queue.0) {
			Some(tasks) => {
				tasks.push_back(task);
				true
			}
			None => {
				debug!(?queue, "dropping task enqueued on removed queue");
				false
			}
		}
	}

	/// Removes `queue`, discarding any undrained tasks. Returns how many
	/// tasks were discarded.
	pub fn remove(&self, queue: TaskQueueHandle) -> usize {
		let mut map = self.inner.lock();
		map.queues.remove(&queue.0).map_or(0, |tasks| tasks.len())
	}

	/// Pops the next task, scanning queues in creation order.
	///
	/// FIFO order holds within a queue; across queues no order is
	/// guaranteed (creation-order scanning is an implementation detail).
	pub fn pop_next(&self) -> Option<Task> {
		let mut map = self.inner.lock();
		for tasks in map.queues.values_mut() {
			if let Some(task) = tasks.pop_front() {
				return Some(task);
			}
		}
		None
	}

	/// Whether any queue holds a task.
	pub fn has_pending(&self) -> bool {
		self.inner.lock().queues.values().any(|tasks| !tasks.is_empty())
	}

	/// Number of tasks waiting in `queue`, if it exists.
	pub fn len(&self, queue: TaskQueueHandle) -> Option<usize> {
		self.inner.lock().queues.get(&queue.0).map(VecDeque::len)
	}
}
