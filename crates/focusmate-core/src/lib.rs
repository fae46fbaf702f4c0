//! # Focusmate Core Library
//!
//! Core logic of a chat-driven productivity assistant: onboarding, task
//! entry, daily habits, Pomodoro focus sessions and points. The crate is
//! transport-agnostic; front ends feed it [`Inbound`] messages and render the
//! structured [`Reply`] values it returns.
//!
//! ## Architecture
//!
//! - **Dialogs**: per-user onboarding and task-entry state machines that
//!   dispatch on stable choice tokens, never on display text
//! - **Ledgers**: habit streaks, task batches and points as operations over a
//!   profile working copy
//! - **Focus**: one pending session per user, superseded by the next start
//! - **Storage**: a [`ProfileStore`] (in-memory or SQLite) plus TOML configuration
//!
//! ## Key Components
//!
//! - [`Assistant`]: command router, serializes work per user
//! - [`DialogEngine`]: dialog arena and step function
//! - [`FocusScheduler`]: session start and completion
//! - [`Config`]: application configuration management

pub mod assistant;
pub mod dialog;
pub mod error;
pub mod focus;
pub mod habits;
pub mod planner;
pub mod profile;
pub mod reply;
pub mod report;
pub mod rewards;
pub mod status;
pub mod storage;
pub mod transport;

pub use assistant::{Assistant, COMMANDS};
pub use dialog::{Choice, DialogEngine, DialogStage, DialogState, Inbound, Transition};
pub use error::{
    ConfigError, CoreError, DialogError, ReportError, Result, StoreError, TimeSpecError,
    TransportError,
};
pub use focus::{
    FocusKind, FocusScheduler, FocusSession, FocusStart, ManualTimer, Timer, TimerKey, TokioTimer,
};
pub use habits::{AchievementPolicy, CheckOff, HabitCheck, HabitLedger};
pub use planner::{TaskBatch, TaskDraft, TaskPlanner};
pub use profile::{
    FocusSettings, Goal, Habit, Language, Recurrence, Task, TimeSpec, TimeSpecKind, UserId,
    UserProfile,
};
pub use reply::{ChoiceOption, CommandHelp, Notification, Reply};
pub use report::{Document, ProfileSnapshot, ReportRenderer, TextReportRenderer};
pub use rewards::RewardLedger;
pub use status::StatusSummary;
pub use storage::{Config, MemoryProfileStore, ProfileStore, SqliteProfileStore, UserLocks};
pub use transport::{MemoryTransport, Transport};
