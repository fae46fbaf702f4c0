//! Pomodoro-style focus sessions.
//!
//! Starting a session is split in two so the caller can persist the profile
//! in between:
//!
//! ```text
//! begin(profile, kind)  -> counter/points applied to the working copy
//! store.save(profile)
//! arm(user, session)    -> session recorded, completion timer scheduled
//! ```
//!
//! ## Supersession
//!
//! Each start takes a fresh epoch and overwrites the user's session slot.
//! A firing completes only if its epoch is still the one in the slot, so at
//! most one notification is delivered per user no matter how the timer
//! handles replacement. The timer key is also shared, so [`TokioTimer`]
//! aborts the earlier sleep outright.

mod timer;

pub use timer::{ManualTimer, Timer, TimerCallback, TimerKey, TokioTimer};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::{FocusSettings, UserId, UserProfile};
use crate::reply::{Notification, Reply};
use crate::rewards::{RewardLedger, FOCUS_WORK_POINTS};
use crate::storage::UserLocks;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl FocusKind {
    pub const ALL: [FocusKind; 3] = [FocusKind::Work, FocusKind::ShortBreak, FocusKind::LongBreak];

    pub fn minutes(self, settings: &FocusSettings) -> u32 {
        match self {
            FocusKind::Work => settings.work,
            FocusKind::ShortBreak => settings.short_break,
            FocusKind::LongBreak => settings.long_break,
        }
    }

    /// Stable label, also accepted by [`FocusKind::from_keyword`].
    pub fn keyword(self) -> &'static str {
        match self {
            FocusKind::Work => "work",
            FocusKind::ShortBreak => "short_break",
            FocusKind::LongBreak => "long_break",
        }
    }

    pub fn from_keyword(input: &str) -> Option<Self> {
        let key = input.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "work" => Some(FocusKind::Work),
            "short_break" | "short" => Some(FocusKind::ShortBreak),
            "long_break" | "long" => Some(FocusKind::LongBreak),
            _ => None,
        }
    }

    pub fn notification(self) -> Notification {
        match self {
            FocusKind::Work => Notification::WorkComplete,
            FocusKind::ShortBreak | FocusKind::LongBreak => Notification::BreakOver,
        }
    }
}

/// A started, not yet fired session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSession {
    pub id: Uuid,
    pub kind: FocusKind,
    pub minutes: u32,
    pub epoch: u64,
    pub started_at: DateTime<Utc>,
}

impl FocusSession {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.minutes) * 60)
    }
}

/// Outcome of [`FocusScheduler::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusStart {
    pub session: FocusSession,
    /// Points awarded at start.
    pub points: u64,
}

#[derive(Clone)]
pub struct FocusScheduler {
    locks: Arc<UserLocks>,
    timer: Arc<dyn Timer>,
    transport: Arc<dyn Transport>,
    sessions: Arc<Mutex<HashMap<UserId, FocusSession>>>,
    epoch: Arc<AtomicU64>,
}

impl FocusScheduler {
    pub fn new(locks: Arc<UserLocks>, timer: Arc<dyn Timer>, transport: Arc<dyn Transport>) -> Self {
        Self {
            locks,
            timer,
            transport,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Apply a start to the profile's working copy.
    ///
    /// A work session bumps the session counter and awards its points now,
    /// not on completion. Breaks award nothing.
    pub fn begin(&self, profile: &mut UserProfile, kind: FocusKind, now: DateTime<Utc>) -> FocusStart {
        let points = if kind == FocusKind::Work {
            profile.focus_sessions = profile.focus_sessions.saturating_add(1);
            RewardLedger::add_points(profile, FOCUS_WORK_POINTS as i64);
            FOCUS_WORK_POINTS
        } else {
            0
        };
        let session = FocusSession {
            id: Uuid::new_v4(),
            kind,
            minutes: kind.minutes(&profile.focus),
            epoch: self.epoch.fetch_add(1, Ordering::SeqCst) + 1,
            started_at: now,
        };
        FocusStart { session, points }
    }

    /// Record the session and schedule its completion, superseding any
    /// pending session of the same user.
    pub fn arm(&self, user: UserId, session: FocusSession) {
        let after = session.duration();
        let (kind, epoch, id) = (session.kind, session.epoch, session.id);
        if let Some(previous) = self.sessions().insert(user, session) {
            tracing::info!(user, superseded = %previous.id, "pending focus session superseded");
        }

        let scheduler = self.clone();
        self.timer.schedule(
            TimerKey::focus(user),
            after,
            Box::new(move || {
                scheduler.complete(user, kind, epoch);
            }),
        );
        tracing::info!(user, kind = kind.keyword(), session = %id, ?after, "focus session started");
    }

    /// Timer entry point. Returns whether a notification was attempted.
    ///
    /// Does nothing when `epoch` has been superseded. Delivery failures are
    /// logged and dropped.
    pub fn complete(&self, user: UserId, kind: FocusKind, epoch: u64) -> bool {
        let slot = self.locks.slot(user);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        {
            let mut sessions = self.sessions();
            match sessions.get(&user) {
                Some(current) if current.epoch == epoch => {
                    sessions.remove(&user);
                }
                _ => {
                    tracing::debug!(user, epoch, "stale focus firing ignored");
                    return false;
                }
            }
        }

        tracing::info!(user, kind = kind.keyword(), "focus session complete");
        if let Err(e) = self
            .transport
            .deliver(user, Reply::Notification(kind.notification()))
        {
            tracing::warn!(user, error = %e, "focus notification dropped");
        }
        true
    }

    /// The user's pending session, if any.
    pub fn pending(&self, user: UserId) -> Option<FocusSession> {
        self.sessions().get(&user).cloned()
    }

    pub fn timer(&self) -> &Arc<dyn Timer> {
        &self.timer
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<UserId, FocusSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
