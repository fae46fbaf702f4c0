//! Command router.
//!
//! One method per user-visible command. Every method runs under the user's
//! lock from [`UserLocks`], loads the profile, mutates a working copy and saves
//! it once. Nothing is saved when a step fails.

use std::sync::{Arc, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};

use crate::dialog::{language_prompt, Choice, DialogEngine, DialogStage, Inbound};
use crate::error::{DialogError, Result};
use crate::focus::{FocusKind, FocusScheduler, FocusSession, Timer};
use crate::habits::{CheckOff, HabitLedger};
use crate::profile::{Language, UserId, UserProfile};
use crate::report::{ProfileSnapshot, ReportRenderer};
use crate::reply::{ChoiceOption, CommandHelp, Reply};
use crate::status::StatusSummary;
use crate::storage::{Config, ProfileStore, UserLocks};
use crate::transport::Transport;

/// Commands listed by [`Assistant::show_help`].
pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        command: "start",
        summary: "set up language, monthly goals and daily habits",
    },
    CommandHelp {
        command: "language",
        summary: "change the interface language",
    },
    CommandHelp {
        command: "add",
        summary: "add tasks with a category, recurrence and time",
    },
    CommandHelp {
        command: "habits",
        summary: "check off today's habits",
    },
    CommandHelp {
        command: "pomodoro",
        summary: "start a focus session or a break",
    },
    CommandHelp {
        command: "status",
        summary: "today's progress",
    },
    CommandHelp {
        command: "export",
        summary: "download a progress report",
    },
    CommandHelp {
        command: "help",
        summary: "show this list",
    },
];

pub struct Assistant {
    store: Arc<dyn ProfileStore>,
    locks: Arc<UserLocks>,
    dialogs: DialogEngine,
    habits: HabitLedger,
    focus: FocusScheduler,
    renderer: Box<dyn ReportRenderer>,
}

impl Assistant {
    pub fn new(
        config: &Config,
        store: Arc<dyn ProfileStore>,
        transport: Arc<dyn Transport>,
        timer: Arc<dyn Timer>,
        renderer: Box<dyn ReportRenderer>,
    ) -> Self {
        let locks = Arc::new(UserLocks::new());
        Self {
            store,
            focus: FocusScheduler::new(Arc::clone(&locks), timer, transport),
            locks,
            dialogs: DialogEngine::new(),
            habits: HabitLedger::new(config.achievement_policy()),
            renderer,
        }
    }

    // ── Dialogs ──────────────────────────────────────────────────────

    /// Begin onboarding, discarding any dialog in progress.
    pub fn start_onboarding(&self, user: UserId) -> Result<Reply> {
        self.serialized(user, || {
            let profile = self.store.get(user)?;
            Ok(self.dialogs.begin_onboarding(&profile))
        })
    }

    /// Begin task entry, discarding any dialog in progress.
    pub fn add_tasks(&self, user: UserId) -> Result<Reply> {
        self.serialized(user, || Ok(self.dialogs.begin_task_entry(user)))
    }

    pub fn abandon_dialog(&self, user: UserId) {
        let slot = self.locks.slot(user);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        self.dialogs.abandon(user);
    }

    pub fn dialog_stage(&self, user: UserId) -> Option<DialogStage> {
        self.dialogs.stage(user)
    }

    /// Route one inbound message.
    ///
    /// With a dialog in progress the message is a dialog step. Otherwise
    /// only standalone choices are accepted: a habit, a focus kind or a
    /// language.
    pub fn handle(&self, user: UserId, input: Inbound, now: DateTime<Utc>) -> Result<Reply> {
        self.serialized(user, || {
            if self.dialogs.is_active(user) {
                let mut profile = self.store.get(user)?;
                let transition = self.dialogs.advance(&mut profile, input, now)?;
                self.store.save(user, &profile)?;
                return Ok(self.dialogs.commit(transition));
            }

            match input {
                Inbound::Choice(Choice::Habit(name)) => {
                    self.check_off_locked(user, &name, now.date_naive())
                }
                Inbound::Choice(Choice::Focus(kind)) => self.start_focus_locked(user, kind, now),
                Inbound::Choice(Choice::Language(language)) => {
                    self.set_language_locked(user, language)
                }
                _ => {
                    tracing::warn!(user, "message outside any dialog");
                    Err(DialogError::NoActiveDialog { user }.into())
                }
            }
        })
    }

    // ── Standalone commands ──────────────────────────────────────────

    pub fn language_menu(&self) -> Reply {
        language_prompt()
    }

    pub fn set_language(&self, user: UserId, language: Language) -> Result<Reply> {
        self.serialized(user, || self.set_language_locked(user, language))
    }

    /// Habits still open today as a pick list.
    pub fn show_habits(&self, user: UserId, today: NaiveDate) -> Result<Reply> {
        let profile = self.profile(user)?;
        if profile.habits.is_empty() {
            return Ok(Reply::NoHabits);
        }
        let pending = HabitLedger::pending_on(&profile, today);
        if pending.is_empty() {
            return Ok(Reply::AllHabitsDone);
        }
        Ok(Reply::HabitBoard {
            options: pending
                .into_iter()
                .map(|name| ChoiceOption::new(name.as_str(), Choice::Habit(name.clone())))
                .collect(),
        })
    }

    pub fn check_off_habit(&self, user: UserId, name: &str, today: NaiveDate) -> Result<Reply> {
        self.serialized(user, || self.check_off_locked(user, name, today))
    }

    pub fn show_focus_menu(&self, user: UserId) -> Result<Reply> {
        let profile = self.profile(user)?;
        Ok(Reply::FocusMenu {
            completed: profile.focus_sessions,
            settings: profile.focus,
            options: FocusKind::ALL
                .into_iter()
                .map(|k| ChoiceOption::new(k.keyword(), Choice::Focus(k)))
                .collect(),
        })
    }

    pub fn start_focus(&self, user: UserId, kind: FocusKind, now: DateTime<Utc>) -> Result<Reply> {
        self.serialized(user, || self.start_focus_locked(user, kind, now))
    }

    /// The user's focus session that has not fired yet.
    pub fn pending_focus(&self, user: UserId) -> Option<FocusSession> {
        self.focus.pending(user)
    }

    pub fn show_status(&self, user: UserId, today: NaiveDate) -> Result<Reply> {
        let profile = self.profile(user)?;
        Ok(Reply::Status(StatusSummary::from_profile(&profile, today)))
    }

    /// Render a report from a snapshot. The profile is never written.
    pub fn export_report(&self, user: UserId, today: NaiveDate) -> Result<Reply> {
        let snapshot = ProfileSnapshot::new(&self.profile(user)?, today);
        let document = self.renderer.render(&snapshot).map_err(|e| {
            tracing::warn!(user, error = %e, "report export failed");
            e
        })?;
        tracing::info!(user, file = %document.file_name, bytes = document.bytes.len(), "report exported");
        Ok(Reply::Report(document))
    }

    pub fn show_help(&self) -> Reply {
        Reply::Help(COMMANDS.to_vec())
    }

    /// Consistent copy of the stored profile.
    pub fn profile(&self, user: UserId) -> Result<UserProfile> {
        self.serialized(user, || Ok(self.store.get(user)?))
    }

    // ── Internals (caller holds the user's lock) ────────────────────

    fn serialized<T>(&self, user: UserId, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let slot = self.locks.slot(user);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    fn set_language_locked(&self, user: UserId, language: Language) -> Result<Reply> {
        let mut profile = self.store.get(user)?;
        profile.set_language(language);
        self.store.save(user, &profile)?;
        tracing::info!(user, language = language.code(), "language changed");
        Ok(Reply::LanguageChanged { language })
    }

    fn check_off_locked(&self, user: UserId, name: &str, today: NaiveDate) -> Result<Reply> {
        let mut profile = self.store.get(user)?;
        let outcome = self.habits.check_off(&mut profile, name, today);
        match &outcome {
            CheckOff::Checked(check) => {
                self.store.save(user, &profile)?;
                tracing::info!(
                    user,
                    habit = %check.habit,
                    streak = check.streak,
                    points = check.points,
                    "habit checked"
                );
            }
            CheckOff::AlreadyChecked { .. } => {}
            CheckOff::NotFound { habit } => tracing::debug!(user, habit = %habit, "habit not found"),
        }
        Ok(Reply::HabitChecked(outcome))
    }

    fn start_focus_locked(&self, user: UserId, kind: FocusKind, now: DateTime<Utc>) -> Result<Reply> {
        let mut profile = self.store.get(user)?;
        let start = self.focus.begin(&mut profile, kind, now);
        self.store.save(user, &profile)?;

        let reply = Reply::FocusStarted {
            kind,
            minutes: start.session.minutes,
            points: start.points,
        };
        self.focus.arm(user, start.session);
        Ok(reply)
    }
}
