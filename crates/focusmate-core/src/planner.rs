//! Turns elaborated task lines into task records.
//!
//! The dialog engine collects one [`TaskDraft`] per input line; the planner
//! builds the final [`Task`]s, splits them by recurrence and prices the batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DialogError;
use crate::profile::{Recurrence, Task, TimeSpec, UserProfile};
use crate::rewards::{RewardLedger, TASK_POINTS};

/// A task line being elaborated by the task-entry dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Set together with `created_at` when the time is allocated.
    pub time: Option<TimeSpec>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            recurrence: Recurrence::None,
            time: None,
            created_at: None,
        }
    }

    pub fn allocate(&mut self, time: TimeSpec, now: DateTime<Utc>) {
        self.time = Some(time);
        self.created_at = Some(now);
    }
}

/// Planned tasks, split by destination list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskBatch {
    pub one_time: Vec<Task>,
    pub recurring: Vec<Task>,
    pub points: u64,
}

impl TaskBatch {
    pub fn len(&self) -> usize {
        self.one_time.len() + self.recurring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-time tasks first, then recurring ones.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.one_time.iter().chain(self.recurring.iter())
    }

    /// Append to the profile's lists and award the batch points.
    pub fn commit(self, profile: &mut UserProfile) -> u64 {
        let points = self.points;
        profile.tasks.extend(self.one_time);
        profile.recurring_tasks.extend(self.recurring);
        RewardLedger::add_points(profile, points as i64);
        points
    }
}

pub struct TaskPlanner;

impl TaskPlanner {
    pub fn plan(drafts: &[TaskDraft]) -> Result<TaskBatch, DialogError> {
        let mut batch = TaskBatch::default();
        for draft in drafts {
            let (Some(time), Some(created_at)) = (draft.time.clone(), draft.created_at) else {
                return Err(DialogError::IncompleteDraft {
                    task: draft.text.clone(),
                });
            };
            let task = Task {
                text: draft.text.clone(),
                category: draft.category.clone(),
                recurrence: draft.recurrence,
                time,
                completed: false,
                created_at,
            };
            if task.recurrence.is_recurring() {
                batch.recurring.push(task);
            } else {
                batch.one_time.push(task);
            }
        }
        batch.points = TASK_POINTS * drafts.len() as u64;
        Ok(batch)
    }
}
