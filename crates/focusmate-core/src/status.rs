//! Daily progress summary.

use chrono::NaiveDate;

use crate::habits::HabitLedger;
use crate::profile::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSummary {
    /// Open tasks flagged done plus archived completed tasks.
    pub tasks_completed: usize,
    pub tasks_total: usize,
    pub habits_done: usize,
    pub habits_total: usize,
    pub focus_sessions: u32,
    pub points: u64,
    /// Every habit checked today, and there is at least one.
    pub great_day: bool,
}

impl StatusSummary {
    pub fn from_profile(profile: &UserProfile, today: NaiveDate) -> Self {
        let done_open = profile.tasks.iter().filter(|t| t.completed).count();
        let habits_done = HabitLedger::done_on(profile, today);
        let habits_total = profile.habits.len();
        Self {
            tasks_completed: done_open + profile.completed_tasks.len(),
            tasks_total: profile.tasks.len() + profile.completed_tasks.len(),
            habits_done,
            habits_total,
            focus_sessions: profile.focus_sessions,
            points: profile.points,
            great_day: habits_total > 0 && habits_done == habits_total,
        }
    }
}
