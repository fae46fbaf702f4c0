//! Per-user multi-step conversations.
//!
//! Two machines share one arena keyed by user id:
//!
//! ```text
//! Onboarding: LanguageSelect -> GoalsInput -> HabitsInput -> (done)
//! Task entry: TaskInput -> CategorySelect -> RecurringSelect -> TimeAllocation
//!                              ^---------------- next task ------------|
//! ```
//!
//! A step never touches the arena directly. [`DialogEngine::advance`] works on
//! a copy of the current state and a working copy of the profile and returns a
//! [`Transition`]; the caller saves the profile and then hands the transition
//! to [`DialogEngine::commit`]. A failed step leaves both untouched.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DialogError;
use crate::focus::FocusKind;
use crate::profile::{Language, Recurrence, UserId, UserProfile};
use crate::reply::{ChoiceOption, Reply};

mod onboarding;
mod task_entry;

pub use task_entry::TaskEntry;

/// Stable token picked from a prompt, independent of display language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Choice {
    Language(Language),
    /// A category name exactly as stored on the profile.
    Category(String),
    SkipCategory,
    /// `Recurrence::None` is the one-time option.
    Recurrence(Recurrence),
    Habit(String),
    Focus(FocusKind),
}

/// One inbound user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Choice(Choice),
}

impl Inbound {
    pub fn text(s: impl Into<String>) -> Self {
        Inbound::Text(s.into())
    }

    fn describe(&self) -> String {
        match self {
            Inbound::Text(t) => format!("text {t:?}"),
            Inbound::Choice(c) => format!("choice {c:?}"),
        }
    }
}

/// Flat view of where a dialog currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStage {
    LanguageSelect,
    GoalsInput,
    HabitsInput,
    TaskInput,
    CategorySelect,
    RecurringSelect,
    TimeAllocation,
}

impl DialogStage {
    /// Stages that take free text which may span several lines.
    pub fn takes_lines(self) -> bool {
        matches!(
            self,
            DialogStage::GoalsInput | DialogStage::HabitsInput | DialogStage::TaskInput
        )
    }
}

/// In-progress dialog for one user. Dropped when the dialog terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Onboarding(DialogStage),
    TaskEntry(TaskEntry),
}

impl DialogState {
    pub fn stage(&self) -> DialogStage {
        match self {
            DialogState::Onboarding(stage) => *stage,
            DialogState::TaskEntry(entry) => entry.stage,
        }
    }
}

/// Result of one dialog step, not yet applied to the arena.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Transition {
    user: UserId,
    /// `None` terminates the dialog.
    next: Option<DialogState>,
    pub reply: Reply,
}

impl Transition {
    pub(crate) fn to(user: UserId, next: DialogState, reply: Reply) -> Self {
        Self {
            user,
            next: Some(next),
            reply,
        }
    }

    pub(crate) fn finish(user: UserId, reply: Reply) -> Self {
        Self {
            user,
            next: None,
            reply,
        }
    }

    pub fn terminates(&self) -> bool {
        self.next.is_none()
    }
}

/// Line-split, trim, drop empty lines.
pub fn split_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
pub struct DialogEngine {
    states: Mutex<HashMap<UserId, DialogState>>,
}

impl DialogEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, user: UserId) -> Option<DialogStage> {
        self.states().get(&user).map(DialogState::stage)
    }

    pub fn is_active(&self, user: UserId) -> bool {
        self.states().contains_key(&user)
    }

    /// Snapshot of a user's dialog state.
    pub fn state(&self, user: UserId) -> Option<DialogState> {
        self.states().get(&user).cloned()
    }

    /// Start onboarding, replacing any dialog in progress.
    ///
    /// Asks for a language first when the profile has none.
    pub fn begin_onboarding(&self, profile: &UserProfile) -> Reply {
        let (stage, reply) = match profile.language {
            None => (DialogStage::LanguageSelect, language_prompt()),
            Some(language) => (DialogStage::GoalsInput, Reply::Welcome { language }),
        };
        self.replace(profile.user_id, DialogState::Onboarding(stage));
        reply
    }

    /// Start task entry, replacing any dialog in progress.
    pub fn begin_task_entry(&self, user: UserId) -> Reply {
        self.replace(user, DialogState::TaskEntry(TaskEntry::new()));
        Reply::TaskPrompt
    }

    pub fn abandon(&self, user: UserId) {
        if self.states().remove(&user).is_some() {
            tracing::debug!(user, "dialog abandoned");
        }
    }

    /// Compute the next step for the profile's user.
    ///
    /// Mutates only the given profile; the arena changes on [`commit`](Self::commit).
    pub fn advance(
        &self,
        profile: &mut UserProfile,
        input: Inbound,
        now: DateTime<Utc>,
    ) -> Result<Transition, DialogError> {
        let user = profile.user_id;
        let current = self
            .state(user)
            .ok_or(DialogError::NoActiveDialog { user })?;
        let stage = current.stage();

        let result = match current {
            DialogState::Onboarding(stage) => onboarding::step(stage, profile, input, now),
            DialogState::TaskEntry(entry) => task_entry::step(entry, profile, input, now),
        };
        match &result {
            Ok(t) => tracing::debug!(
                user,
                from = ?stage,
                to = ?t.next.as_ref().map(DialogState::stage),
                "dialog step"
            ),
            Err(e) => tracing::warn!(user, stage = ?stage, error = %e, "dialog input rejected"),
        }
        result
    }

    /// Store the transition's next state (or drop the dialog) and hand back its reply.
    pub fn commit(&self, transition: Transition) -> Reply {
        let Transition { user, next, reply } = transition;
        let mut states = self.states();
        match next {
            Some(state) => {
                states.insert(user, state);
            }
            None => {
                states.remove(&user);
            }
        }
        reply
    }

    fn replace(&self, user: UserId, state: DialogState) {
        if let Some(previous) = self.states().insert(user, state) {
            tracing::debug!(user, stage = ?previous.stage(), "in-progress dialog replaced");
        }
    }

    fn states(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, DialogState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn language_prompt() -> Reply {
    Reply::LanguagePrompt {
        options: Language::ALL
            .iter()
            .map(|l| ChoiceOption::new(l.native_name(), Choice::Language(*l)))
            .collect(),
    }
}

pub(crate) fn unexpected(stage: DialogStage, input: &Inbound) -> DialogError {
    DialogError::UnexpectedInput {
        stage,
        input: input.describe(),
    }
}
