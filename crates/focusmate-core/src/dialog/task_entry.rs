use chrono::{DateTime, Utc};

use super::{split_lines, unexpected, Choice, DialogStage, DialogState, Inbound, Transition};
use crate::error::DialogError;
use crate::planner::{TaskDraft, TaskPlanner};
use crate::profile::{Recurrence, TimeSpec, UserProfile, FALLBACK_CATEGORY};
use crate::reply::{ChoiceOption, Reply};

/// Buffers of an in-progress task-entry dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub stage: DialogStage,
    /// Raw lines of the batch being elaborated.
    pub pending: Vec<String>,
    /// Zero-based index into `pending` of the task being elaborated.
    pub index: usize,
    /// One draft per task elaborated so far, including the current one.
    pub drafts: Vec<TaskDraft>,
}

impl TaskEntry {
    pub(super) fn new() -> Self {
        Self {
            stage: DialogStage::TaskInput,
            pending: Vec::new(),
            index: 0,
            drafts: Vec::new(),
        }
    }

    fn current_task(&self) -> Result<&str, DialogError> {
        self.pending
            .get(self.index)
            .map(String::as_str)
            .ok_or(DialogError::TaskIndexOutOfRange {
                index: self.index,
                len: self.pending.len(),
            })
    }

    fn current_draft(&mut self) -> Result<&mut TaskDraft, DialogError> {
        let (index, len) = (self.index, self.pending.len());
        self.drafts
            .get_mut(index)
            .ok_or(DialogError::TaskIndexOutOfRange { index, len })
    }

    fn at(mut self, stage: DialogStage) -> DialogState {
        self.stage = stage;
        DialogState::TaskEntry(self)
    }
}

pub(super) fn step(
    mut entry: TaskEntry,
    profile: &mut UserProfile,
    input: Inbound,
    now: DateTime<Utc>,
) -> Result<Transition, DialogError> {
    let user = profile.user_id;
    match (entry.stage, input) {
        (DialogStage::TaskInput, Inbound::Text(text)) => {
            let lines = split_lines(&text);
            if lines.is_empty() {
                return Err(DialogError::NoPendingTasks);
            }
            entry.pending = lines;
            entry.index = 0;
            entry.drafts.clear();
            let reply = category_prompt(&entry, profile)?;
            Ok(Transition::to(user, entry.at(DialogStage::CategorySelect), reply))
        }
        (DialogStage::CategorySelect, input) => {
            let task = entry.current_task()?.to_string();
            if entry.drafts.len() != entry.index {
                return Err(DialogError::TaskIndexOutOfRange {
                    index: entry.index,
                    len: entry.drafts.len(),
                });
            }
            let category = match &input {
                Inbound::Choice(Choice::Category(name)) => profile.resolve_category(name),
                Inbound::Text(text) => profile.resolve_category(text.trim()),
                Inbound::Choice(_) => FALLBACK_CATEGORY.to_string(),
            };
            entry.drafts.push(TaskDraft::new(task.as_str(), category));
            let reply = Reply::RecurrencePrompt {
                task,
                options: recurrence_options(),
            };
            Ok(Transition::to(user, entry.at(DialogStage::RecurringSelect), reply))
        }
        (DialogStage::RecurringSelect, input) => {
            let recurrence = match &input {
                Inbound::Choice(Choice::Recurrence(r)) => *r,
                Inbound::Text(text) => Recurrence::from_keyword(text),
                Inbound::Choice(_) => Recurrence::None,
            };
            let task = entry.current_task()?.to_string();
            entry.current_draft()?.recurrence = recurrence;
            Ok(Transition::to(
                user,
                entry.at(DialogStage::TimeAllocation),
                Reply::TimePrompt { task },
            ))
        }
        (DialogStage::TimeAllocation, Inbound::Text(text)) => {
            entry.current_task()?;
            entry.current_draft()?.allocate(TimeSpec::new(text), now);
            entry.index += 1;

            if entry.index < entry.pending.len() {
                let reply = category_prompt(&entry, profile)?;
                return Ok(Transition::to(user, entry.at(DialogStage::CategorySelect), reply));
            }

            let batch = TaskPlanner::plan(&entry.drafts)?;
            let tasks: Vec<_> = batch.tasks().cloned().collect();
            let points = batch.commit(profile);
            tracing::info!(user, tasks = tasks.len(), points, "task batch committed");
            Ok(Transition::finish(user, Reply::TasksCommitted { tasks, points }))
        }
        (stage, input) => Err(unexpected(stage, &input)),
    }
}

fn category_prompt(entry: &TaskEntry, profile: &UserProfile) -> Result<Reply, DialogError> {
    let mut options: Vec<ChoiceOption> = profile
        .categories
        .iter()
        .map(|c| ChoiceOption::new(c.as_str(), Choice::Category(c.clone())))
        .collect();
    options.push(ChoiceOption::new("skip", Choice::SkipCategory));
    Ok(Reply::CategoryPrompt {
        position: entry.index + 1,
        total: entry.pending.len(),
        task: entry.current_task()?.to_string(),
        options,
    })
}

fn recurrence_options() -> Vec<ChoiceOption> {
    [Recurrence::Daily, Recurrence::Weekly, Recurrence::None]
        .into_iter()
        .map(|r| ChoiceOption::new(r.keyword(), Choice::Recurrence(r)))
        .collect()
}
