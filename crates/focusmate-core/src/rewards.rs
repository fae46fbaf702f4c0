//! Points and achievements.
//!
//! Stateless helpers over a profile. Points never go below zero;
//! achievements are append-only and this layer does not deduplicate them.

use crate::profile::UserProfile;

/// Points per task committed from a task-entry dialog.
pub const TASK_POINTS: u64 = 5;
/// Points for starting a work session.
pub const FOCUS_WORK_POINTS: u64 = 10;
/// Base points for a habit check-off.
pub const HABIT_BASE_POINTS: u64 = 5;
/// Extra points per completed week of streak.
pub const HABIT_WEEK_BONUS: u64 = 5;

/// Streak of exactly 7 days.
pub const ACHIEVEMENT_WEEK: &str = "week";
/// Streak of exactly 30 days.
pub const ACHIEVEMENT_MONTH: &str = "month";

pub struct RewardLedger;

impl RewardLedger {
    /// Apply `delta` to the running total, clamping at zero. Returns the new total.
    pub fn add_points(profile: &mut UserProfile, delta: i64) -> u64 {
        profile.points = if delta >= 0 {
            profile.points.saturating_add(delta.unsigned_abs())
        } else {
            profile.points.saturating_sub(delta.unsigned_abs())
        };
        profile.points
    }

    pub fn grant_achievement(profile: &mut UserProfile, label: &str) {
        profile.achievements.push(label.to_string());
    }

    pub fn has_achievement(profile: &UserProfile, label: &str) -> bool {
        profile.achievements.iter().any(|a| a == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FocusSettings;

    #[test]
    fn points_accumulate_and_clamp_at_zero() {
        let mut profile = UserProfile::new(1, FocusSettings::default());
        assert_eq!(RewardLedger::add_points(&mut profile, 15), 15);
        assert_eq!(RewardLedger::add_points(&mut profile, -5), 10);
        assert_eq!(RewardLedger::add_points(&mut profile, -100), 0);
        assert_eq!(profile.points, 0);
        assert_eq!(RewardLedger::add_points(&mut profile, i64::MIN), 0);
    }

    #[test]
    fn achievements_are_append_only() {
        let mut profile = UserProfile::new(1, FocusSettings::default());
        RewardLedger::grant_achievement(&mut profile, ACHIEVEMENT_WEEK);
        RewardLedger::grant_achievement(&mut profile, ACHIEVEMENT_WEEK);
        assert_eq!(profile.achievements, vec!["week", "week"]);
        assert!(RewardLedger::has_achievement(&profile, ACHIEVEMENT_WEEK));
        assert!(!RewardLedger::has_achievement(&profile, ACHIEVEMENT_MONTH));
    }
}
