//! Per-user profile state.
//!
//! A [`UserProfile`] is created lazily the first time a user id is seen and
//! lives for as long as its store does. Every component mutates it, always
//! through a working copy that is saved in one step.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

mod task;

pub use task::{Recurrence, Task, TimeSpec, TimeSpecKind};

/// Chat-transport user identifier.
pub type UserId = i64;

/// Category recorded when the user skips or names an unknown category.
pub const FALLBACK_CATEGORY: &str = "General";

/// Goals kept from one onboarding batch.
pub const MAX_GOALS: usize = 3;

/// Interface language. Picking one installs its default category set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }

    /// Display name in the language itself.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "العربية",
        }
    }

    pub fn default_categories(self) -> Vec<String> {
        let names: [&str; 3] = match self {
            Language::En => ["Work", "Personal", "Health"],
            Language::Ar => ["عمل", "شخصي", "صحة"],
        };
        names.iter().map(|s| s.to_string()).collect()
    }
}

/// Focus/break durations in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSettings {
    pub work: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            work: 25,
            short_break: 5,
            long_break: 15,
        }
    }
}

/// A monthly goal entered during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// 0..=100
    pub progress: u8,
    pub milestones: Vec<String>,
}

impl Goal {
    pub fn new(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            created_at,
            progress: 0,
            milestones: Vec::new(),
        }
    }
}

/// A daily habit with its check-off history.
///
/// `best_streak >= streak` holds after every mutation made by the habit ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub name: String,
    /// Calendar days on which the habit was checked.
    pub tracking: BTreeSet<NaiveDate>,
    pub streak: u32,
    pub best_streak: u32,
}

impl Habit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracking: BTreeSet::new(),
            streak: 0,
            best_streak: 0,
        }
    }

    pub fn is_checked_on(&self, day: NaiveDate) -> bool {
        self.tracking.contains(&day)
    }
}

/// Everything the assistant knows about one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    /// `None` until the user picks one; onboarding asks first in that case.
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub recurring_tasks: Vec<Task>,
    #[serde(default)]
    pub completed_tasks: Vec<Task>,
    /// Ordered, no duplicates.
    pub categories: Vec<String>,
    pub focus: FocusSettings,
    #[serde(default)]
    pub focus_sessions: u32,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl UserProfile {
    /// Fresh profile: no language yet, English categories, the given focus durations.
    pub fn new(user_id: UserId, focus: FocusSettings) -> Self {
        Self {
            user_id,
            language: None,
            goals: Vec::new(),
            habits: Vec::new(),
            tasks: Vec::new(),
            recurring_tasks: Vec::new(),
            completed_tasks: Vec::new(),
            categories: Language::En.default_categories(),
            focus,
            focus_sessions: 0,
            points: 0,
            achievements: Vec::new(),
        }
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = Some(language);
        self.categories = language.default_categories();
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// The category itself when configured, otherwise [`FALLBACK_CATEGORY`].
    pub fn resolve_category(&self, candidate: &str) -> String {
        if self.has_category(candidate) {
            candidate.to_string()
        } else {
            FALLBACK_CATEGORY.to_string()
        }
    }

    pub fn habit(&self, name: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_has_no_language_and_english_categories() {
        let profile = UserProfile::new(7, FocusSettings::default());
        assert_eq!(profile.language, None);
        assert_eq!(profile.categories, vec!["Work", "Personal", "Health"]);
        assert_eq!(profile.points, 0);
        assert_eq!(profile.focus.work, 25);
    }

    #[test]
    fn set_language_installs_category_set() {
        let mut profile = UserProfile::new(7, FocusSettings::default());
        profile.set_language(Language::Ar);
        assert_eq!(profile.language, Some(Language::Ar));
        assert_eq!(profile.categories, vec!["عمل", "شخصي", "صحة"]);

        profile.set_language(Language::En);
        assert!(profile.has_category("Health"));
        assert!(!profile.has_category("صحة"));
    }

    #[test]
    fn unknown_category_resolves_to_fallback() {
        let profile = UserProfile::new(1, FocusSettings::default());
        assert_eq!(profile.resolve_category("Personal"), "Personal");
        assert_eq!(profile.resolve_category("personal"), FALLBACK_CATEGORY);
        assert_eq!(profile.resolve_category("Errands"), FALLBACK_CATEGORY);
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code(" EN "), Some(Language::En));
        assert_eq!(Language::from_code("ar"), Some(Language::Ar));
        assert_eq!(Language::from_code("fr"), None);
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn profile_json_roundtrip_preserves_every_field() {
        let now = Utc::now();
        let mut profile = UserProfile::new(42, FocusSettings { work: 50, short_break: 10, long_break: 30 });
        profile.set_language(Language::En);
        profile.goals.push(Goal::new("Ship v1", now));
        let mut habit = Habit::new("Read");
        habit.tracking.insert(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        habit.streak = 1;
        habit.best_streak = 4;
        profile.habits.push(habit);
        profile.tasks.push(Task {
            text: "Buy milk".into(),
            category: "Personal".into(),
            recurrence: Recurrence::None,
            time: TimeSpec::new("09:00"),
            completed: false,
            created_at: now,
        });
        profile.recurring_tasks.push(Task {
            text: "Stretch".into(),
            category: "Health".into(),
            recurrence: Recurrence::Daily,
            time: TimeSpec::new("15"),
            completed: false,
            created_at: now,
        });
        profile.focus_sessions = 3;
        profile.points = 95;
        profile.achievements.push("week".into());

        let json = serde_json::to_string(&profile).unwrap();
        let decoded: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, profile);
    }
}
