use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimeSpecError;

/// Whether a task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// One-time task.
    #[default]
    None,
    Daily,
    Weekly,
}

impl Recurrence {
    pub fn is_recurring(self) -> bool {
        !matches!(self, Recurrence::None)
    }

    /// Stable keyword used at the presentation boundary.
    pub fn keyword(self) -> &'static str {
        match self {
            Recurrence::None => "one_time",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
        }
    }

    /// `daily` / `weekly` (any case); everything else is one-time.
    pub fn from_keyword(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "daily" => Recurrence::Daily,
            "weekly" => Recurrence::Weekly,
            _ => Recurrence::None,
        }
    }
}

/// Time allocation exactly as the user typed it.
///
/// Either a clock time or a minute count is expected, but nothing is
/// validated on entry. Consumers that need a value call [`TimeSpec::interpret`]
/// and treat failures as a data-quality issue on their side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSpec(String);

/// A time specification that could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpecKind {
    /// `HH:MM`
    Clock(NaiveTime),
    /// Bare duration in minutes.
    Minutes(u32),
}

impl TimeSpec {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn interpret(&self) -> Result<TimeSpecKind, TimeSpecError> {
        let raw = self.0.trim();
        if let Ok(minutes) = raw.parse::<u32>() {
            return Ok(TimeSpecKind::Minutes(minutes));
        }
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map(TimeSpecKind::Clock)
            .map_err(|_| TimeSpecError::Unrecognized(self.0.clone()))
    }
}

impl std::fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A one-time or recurring task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    /// One of the profile's categories, or the fallback label.
    pub category: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    pub time: TimeSpec,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
