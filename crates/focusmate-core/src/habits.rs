//! Daily habit check-off, streaks, and the points they earn.
//!
//! A habit can be checked once per calendar day. Skipped days do not reset
//! the streak here; any rollover policy lives outside this ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::profile::UserProfile;
use crate::rewards::{
    RewardLedger, ACHIEVEMENT_MONTH, ACHIEVEMENT_WEEK, HABIT_BASE_POINTS, HABIT_WEEK_BONUS,
};

/// Whether a streak milestone achievement may be earned more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementPolicy {
    /// Granted every time a streak lands on the milestone.
    #[default]
    PerCrossing,
    /// Granted once per profile.
    Once,
}

/// A successful check-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitCheck {
    pub habit: String,
    pub streak: u32,
    pub best_streak: u32,
    pub points: u64,
    /// `streak` is a multiple of seven.
    pub milestone: bool,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOff {
    Checked(HabitCheck),
    /// Already checked on that day; nothing changed.
    AlreadyChecked { habit: String, streak: u32 },
    NotFound { habit: String },
}

#[derive(Debug, Clone, Default)]
pub struct HabitLedger {
    policy: AchievementPolicy,
}

impl HabitLedger {
    pub fn new(policy: AchievementPolicy) -> Self {
        Self { policy }
    }

    pub fn points_for_streak(streak: u32) -> u64 {
        HABIT_BASE_POINTS + u64::from(streak / 7) * HABIT_WEEK_BONUS
    }

    pub fn check_off(&self, profile: &mut UserProfile, name: &str, today: NaiveDate) -> CheckOff {
        let Some(habit) = profile.habits.iter_mut().find(|h| h.name == name) else {
            return CheckOff::NotFound {
                habit: name.to_string(),
            };
        };

        if !habit.tracking.insert(today) {
            return CheckOff::AlreadyChecked {
                habit: habit.name.clone(),
                streak: habit.streak,
            };
        }
        habit.streak += 1;
        habit.best_streak = habit.best_streak.max(habit.streak);

        let streak = habit.streak;
        let best_streak = habit.best_streak;
        let habit_name = habit.name.clone();

        let points = Self::points_for_streak(streak);
        RewardLedger::add_points(profile, points as i64);

        let label = match streak {
            7 => Some(ACHIEVEMENT_WEEK),
            30 => Some(ACHIEVEMENT_MONTH),
            _ => None,
        };
        let mut achievements = Vec::new();
        if let Some(label) = label {
            let earned_before = RewardLedger::has_achievement(profile, label);
            if self.policy == AchievementPolicy::PerCrossing || !earned_before {
                RewardLedger::grant_achievement(profile, label);
                achievements.push(label.to_string());
            }
        }

        tracing::debug!(habit = %habit_name, streak, points, "habit checked");

        CheckOff::Checked(HabitCheck {
            habit: habit_name,
            streak,
            best_streak,
            points,
            milestone: streak % 7 == 0,
            achievements,
        })
    }

    /// Habit names not yet checked on `today`, in profile order.
    pub fn pending_on(profile: &UserProfile, today: NaiveDate) -> Vec<String> {
        profile
            .habits
            .iter()
            .filter(|h| !h.is_checked_on(today))
            .map(|h| h.name.clone())
            .collect()
    }

    pub fn done_on(profile: &UserProfile, today: NaiveDate) -> usize {
        profile.habits.iter().filter(|h| h.is_checked_on(today)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{FocusSettings, Habit};
    use chrono::Duration;
    use proptest::prelude::*;

    fn profile_with(habits: &[&str]) -> UserProfile {
        let mut profile = UserProfile::new(1, FocusSettings::default());
        profile.habits = habits.iter().map(|h| Habit::new(*h)).collect();
        profile
    }

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
    }

    fn checked(result: CheckOff) -> HabitCheck {
        match result {
            CheckOff::Checked(check) => check,
            other => panic!("expected Checked, got {other:?}"),
        }
    }

    #[test]
    fn first_check_awards_five_points() {
        let ledger = HabitLedger::default();
        let mut profile = profile_with(&["Read"]);
        let check = checked(ledger.check_off(&mut profile, "Read", day(0)));
        assert_eq!(check.streak, 1);
        assert_eq!(check.best_streak, 1);
        assert_eq!(check.points, 5);
        assert!(!check.milestone);
        assert_eq!(profile.points, 5);
        assert!(profile.habits[0].is_checked_on(day(0)));
    }

    #[test]
    fn second_check_same_day_is_a_noop() {
        let ledger = HabitLedger::default();
        let mut profile = profile_with(&["Read"]);
        ledger.check_off(&mut profile, "Read", day(0));
        let before = profile.clone();

        let result = ledger.check_off(&mut profile, "Read", day(0));
        assert_eq!(
            result,
            CheckOff::AlreadyChecked {
                habit: "Read".into(),
                streak: 1
            }
        );
        assert_eq!(profile, before);
    }

    #[test]
    fn missing_habit_is_reported_without_mutation() {
        let ledger = HabitLedger::default();
        let mut profile = profile_with(&["Read"]);
        let before = profile.clone();
        assert_eq!(
            ledger.check_off(&mut profile, "read", day(0)),
            CheckOff::NotFound { habit: "read".into() }
        );
        assert_eq!(profile, before);
    }

    #[test]
    fn points_scale_with_completed_weeks() {
        assert_eq!(HabitLedger::points_for_streak(1), 5);
        assert_eq!(HabitLedger::points_for_streak(6), 5);
        assert_eq!(HabitLedger::points_for_streak(7), 10);
        assert_eq!(HabitLedger::points_for_streak(14), 15);
        assert_eq!(HabitLedger::points_for_streak(30), 25);
    }

    #[test]
    fn week_and_month_achievements_fire_on_exact_streaks() {
        let ledger = HabitLedger::default();
        let mut profile = profile_with(&["Run"]);
        for n in 0..30 {
            let check = checked(ledger.check_off(&mut profile, "Run", day(n)));
            let streak = (n + 1) as u32;
            assert_eq!(check.milestone, streak % 7 == 0);
            match streak {
                7 => assert_eq!(check.achievements, vec![ACHIEVEMENT_WEEK]),
                30 => assert_eq!(check.achievements, vec![ACHIEVEMENT_MONTH]),
                _ => assert!(check.achievements.is_empty()),
            }
        }
        assert_eq!(profile.achievements, vec![ACHIEVEMENT_WEEK, ACHIEVEMENT_MONTH]);
    }

    #[test]
    fn skipped_days_do_not_reset_streak() {
        let ledger = HabitLedger::default();
        let mut profile = profile_with(&["Run"]);
        ledger.check_off(&mut profile, "Run", day(0));
        let check = checked(ledger.check_off(&mut profile, "Run", day(5)));
        assert_eq!(check.streak, 2);
    }

    #[test]
    fn per_crossing_policy_regrants_after_external_reset() {
        let ledger = HabitLedger::new(AchievementPolicy::PerCrossing);
        let mut profile = profile_with(&["Run"]);
        for n in 0..7 {
            ledger.check_off(&mut profile, "Run", day(n));
        }
        profile.habits[0].streak = 0;
        for n in 10..17 {
            ledger.check_off(&mut profile, "Run", day(n));
        }
        assert_eq!(profile.achievements, vec![ACHIEVEMENT_WEEK, ACHIEVEMENT_WEEK]);
        assert_eq!(profile.habits[0].best_streak, 7);
    }

    #[test]
    fn once_policy_grants_a_milestone_only_once() {
        let ledger = HabitLedger::new(AchievementPolicy::Once);
        let mut profile = profile_with(&["Run"]);
        for n in 0..7 {
            ledger.check_off(&mut profile, "Run", day(n));
        }
        profile.habits[0].streak = 0;
        let mut last = None;
        for n in 10..17 {
            last = Some(checked(ledger.check_off(&mut profile, "Run", day(n))));
        }
        let last = last.unwrap();
        assert!(last.milestone);
        assert!(last.achievements.is_empty());
        assert_eq!(profile.achievements, vec![ACHIEVEMENT_WEEK]);
    }

    #[test]
    fn pending_and_done_counts() {
        let ledger = HabitLedger::default();
        let mut profile = profile_with(&["Read", "Run", "Water"]);
        ledger.check_off(&mut profile, "Run", day(0));
        assert_eq!(HabitLedger::pending_on(&profile, day(0)), vec!["Read", "Water"]);
        assert_eq!(HabitLedger::done_on(&profile, day(0)), 1);
        assert_eq!(HabitLedger::done_on(&profile, day(1)), 0);
    }

    proptest! {
        #[test]
        fn best_streak_never_trails_streak(offsets in proptest::collection::vec(0i64..60, 1..80)) {
            let ledger = HabitLedger::default();
            let mut profile = profile_with(&["Read"]);
            let mut last_best = 0;
            for offset in offsets {
                ledger.check_off(&mut profile, "Read", day(offset));
                let habit = &profile.habits[0];
                prop_assert!(habit.best_streak >= habit.streak);
                prop_assert!(habit.best_streak >= last_best);
                prop_assert_eq!(habit.streak as usize, habit.tracking.len());
                last_best = habit.best_streak;
            }
        }
    }
}
