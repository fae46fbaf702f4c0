//! Structured responses.
//!
//! Every command and dialog step answers with a [`Reply`]. Replies carry data
//! and stable choice tokens only; wording and translation belong to the front
//! end that renders them.

use crate::dialog::Choice;
use crate::focus::FocusKind;
use crate::habits::CheckOff;
use crate::profile::{FocusSettings, Language, Task};
use crate::report::Document;
use crate::status::StatusSummary;

/// One selectable option of a prompt.
///
/// `label` is either user data (a category or habit name) or a stable key
/// such as `skip` or `daily`; it is never translated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub choice: Choice,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, choice: Choice) -> Self {
        Self {
            label: label.into(),
            choice,
        }
    }
}

/// Delivered when a focus session elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    WorkComplete,
    BreakOver,
}

/// Entry in the help listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHelp {
    pub command: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Pick a language.
    LanguagePrompt { options: Vec<ChoiceOption> },
    /// Onboarding greeting; asks for up to three goals next.
    Welcome { language: Language },
    /// Goals stored; asks for habits next.
    GoalsSet { goals: Vec<String> },
    /// Onboarding finished.
    SetupComplete { habits: usize },
    LanguageChanged { language: Language },

    /// Ask for task lines.
    TaskPrompt,
    /// `position` is 1-based.
    CategoryPrompt {
        position: usize,
        total: usize,
        task: String,
        options: Vec<ChoiceOption>,
    },
    RecurrencePrompt { task: String, options: Vec<ChoiceOption> },
    TimePrompt { task: String },
    TasksCommitted { tasks: Vec<Task>, points: u64 },

    HabitBoard { options: Vec<ChoiceOption> },
    AllHabitsDone,
    NoHabits,
    HabitChecked(CheckOff),

    FocusMenu {
        completed: u32,
        settings: FocusSettings,
        options: Vec<ChoiceOption>,
    },
    FocusStarted { kind: FocusKind, minutes: u32, points: u64 },
    Notification(Notification),

    Status(StatusSummary),
    Report(Document),
    Help(Vec<CommandHelp>),
}

impl Reply {
    /// Options the front end should offer, if this reply is a prompt.
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            Reply::LanguagePrompt { options }
            | Reply::CategoryPrompt { options, .. }
            | Reply::RecurrencePrompt { options, .. }
            | Reply::HabitBoard { options }
            | Reply::FocusMenu { options, .. } => options,
            _ => &[],
        }
    }
}
