//! Progress report export.
//!
//! A renderer only ever sees a [`ProfileSnapshot`], a detached copy of the
//! profile, so a failed export cannot leave anything half-written.

use std::fmt::Write as _;

use chrono::NaiveDate;
use indoc::formatdoc;

use crate::error::ReportError;
use crate::profile::{Task, TimeSpecKind, UserProfile};

/// Rendered report, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Read-only input of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub profile: UserProfile,
    pub generated_on: NaiveDate,
}

impl ProfileSnapshot {
    pub fn new(profile: &UserProfile, generated_on: NaiveDate) -> Self {
        Self {
            profile: profile.clone(),
            generated_on,
        }
    }
}

pub trait ReportRenderer: Send + Sync {
    fn render(&self, snapshot: &ProfileSnapshot) -> Result<Document, ReportError>;
}

/// Plain UTF-8 text report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

impl TextReportRenderer {
    fn time_label(task: &Task) -> String {
        match task.time.interpret() {
            Ok(TimeSpecKind::Clock(t)) => format!("at {}", t.format("%H:%M")),
            Ok(TimeSpecKind::Minutes(m)) => format!("{m} min"),
            Err(_) => task.time.as_str().to_string(),
        }
    }

    fn task_lines(out: &mut String, tasks: &[Task]) -> Result<(), ReportError> {
        if tasks.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for task in tasks {
            let mark = if task.completed { "x" } else { " " };
            writeln!(
                out,
                "  [{mark}] {} ({}, {}, {})",
                task.text,
                task.category,
                task.recurrence.keyword(),
                Self::time_label(task)
            )?;
        }
        Ok(())
    }
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, snapshot: &ProfileSnapshot) -> Result<Document, ReportError> {
        let p = &snapshot.profile;
        let language = p.language.map_or("-", |l| l.code());

        let mut out = formatdoc! {"
            Focusmate progress report
            User: {user}
            Date: {date}
            Language: {language}

            Points: {points}
            Focus sessions: {sessions}
            Achievements: {achievements}
            ",
            user = p.user_id,
            date = snapshot.generated_on,
            points = p.points,
            sessions = p.focus_sessions,
            achievements = if p.achievements.is_empty() {
                "-".to_string()
            } else {
                p.achievements.join(", ")
            },
        };

        writeln!(out, "\nGoals")?;
        if p.goals.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for goal in &p.goals {
            writeln!(out, "  - {} [{}%]", goal.text, goal.progress)?;
        }

        writeln!(out, "\nHabits")?;
        if p.habits.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for habit in &p.habits {
            let today = if habit.is_checked_on(snapshot.generated_on) { "done today" } else { "open" };
            writeln!(
                out,
                "  - {}: streak {}, best {}, {} days tracked, {today}",
                habit.name,
                habit.streak,
                habit.best_streak,
                habit.tracking.len()
            )?;
        }

        writeln!(out, "\nTasks")?;
        Self::task_lines(&mut out, &p.tasks)?;
        writeln!(out, "\nRecurring tasks")?;
        Self::task_lines(&mut out, &p.recurring_tasks)?;
        if !p.completed_tasks.is_empty() {
            writeln!(out, "\nCompleted tasks")?;
            Self::task_lines(&mut out, &p.completed_tasks)?;
        }

        Ok(Document {
            file_name: format!(
                "focusmate-report-{}-{}.txt",
                p.user_id,
                snapshot.generated_on.format("%Y%m%d")
            ),
            mime: "text/plain; charset=utf-8",
            bytes: out.into_bytes(),
        })
    }
}
