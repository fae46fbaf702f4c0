//! One-shot timers keyed per `(user, slot)`.
//!
//! Scheduling under a key that already has a pending timer replaces it: the
//! earlier callback never runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::profile::UserId;

pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub user: UserId,
    pub slot: &'static str,
}

impl TimerKey {
    pub const FOCUS_SLOT: &'static str = "focus";

    pub fn focus(user: UserId) -> Self {
        Self {
            user,
            slot: Self::FOCUS_SLOT,
        }
    }
}

/// Timer capability.
pub trait Timer: Send + Sync {
    /// Run `callback` once after `after`, replacing any pending timer for `key`.
    fn schedule(&self, key: TimerKey, after: Duration, callback: TimerCallback);

    fn is_pending(&self, key: &TimerKey) -> bool;

    /// Number of timers that have not fired yet.
    fn pending(&self) -> usize;
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

type TaskTable = HashMap<TimerKey, (u64, JoinHandle<()>)>;

/// Timer backed by sleeping tokio tasks. Rescheduling aborts the previous task.
pub struct TokioTimer {
    handle: Handle,
    next_id: AtomicU64,
    tasks: Arc<Mutex<TaskTable>>,
}

impl TokioTimer {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(0),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Timer for TokioTimer {
    fn schedule(&self, key: TimerKey, after: Duration, callback: TimerCallback) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // Held across spawn so the task cannot look itself up before it is registered.
        let mut table = lock(&self.tasks);
        let join = self.handle.spawn(async move {
            tokio::time::sleep(after).await;
            {
                let mut table = lock(&tasks);
                match table.get(&key) {
                    Some((current, _)) if *current == id => {
                        table.remove(&key);
                    }
                    _ => return,
                }
            }
            callback();
        });
        if let Some((_, previous)) = table.insert(key, (id, join)) {
            previous.abort();
            tracing::debug!(user = key.user, slot = key.slot, "pending timer replaced");
        }
    }

    fn is_pending(&self, key: &TimerKey) -> bool {
        lock(&self.tasks).contains_key(key)
    }

    fn pending(&self) -> usize {
        lock(&self.tasks).len()
    }
}

/// Timer that only fires when told to.
#[derive(Default)]
pub struct ManualTimer {
    slots: Mutex<HashMap<TimerKey, (Duration, TimerCallback)>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay the pending timer for `key` was scheduled with.
    pub fn delay(&self, key: &TimerKey) -> Option<Duration> {
        lock(&self.slots).get(key).map(|(after, _)| *after)
    }

    /// Run the pending callback for `key`. Returns false when none is pending.
    pub fn fire(&self, key: &TimerKey) -> bool {
        let entry = lock(&self.slots).remove(key);
        match entry {
            Some((_, callback)) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, key: TimerKey, after: Duration, callback: TimerCallback) {
        lock(&self.slots).insert(key, (after, callback));
    }

    fn is_pending(&self, key: &TimerKey) -> bool {
        lock(&self.slots).contains_key(key)
    }

    fn pending(&self) -> usize {
        lock(&self.slots).len()
    }
}
