//! English console rendering of assistant replies.

use std::fmt::Write as _;

use focusmate_core::{
    CheckOff, Choice, ChoiceOption, FocusKind, Language, Notification, Recurrence, Reply,
    StatusSummary,
};

fn language_name(language: Language) -> &'static str {
    match language {
        Language::En => "English",
        Language::Ar => "Arabic",
    }
}

fn focus_name(kind: FocusKind) -> &'static str {
    match kind {
        FocusKind::Work => "Work session",
        FocusKind::ShortBreak => "Short break",
        FocusKind::LongBreak => "Long break",
    }
}

/// Display text for one option. User data is shown as stored.
pub fn option_label(option: &ChoiceOption) -> String {
    match &option.choice {
        Choice::Language(Language::En) => "English".to_string(),
        Choice::Language(l) => format!("{} ({})", l.native_name(), language_name(*l)),
        Choice::SkipCategory => "Skip".to_string(),
        Choice::Recurrence(Recurrence::Daily) => "Daily".to_string(),
        Choice::Recurrence(Recurrence::Weekly) => "Weekly".to_string(),
        Choice::Recurrence(Recurrence::None) => "One-time".to_string(),
        Choice::Focus(kind) => focus_name(*kind).to_string(),
        Choice::Category(_) | Choice::Habit(_) => option.label.clone(),
    }
}

fn numbered(out: &mut String, options: &[ChoiceOption]) {
    for (i, option) in options.iter().enumerate() {
        let _ = write!(out, "\n  {}. {}", i + 1, option_label(option));
    }
}

fn status(s: &StatusSummary) -> String {
    let mut out = format!(
        "Today's progress\n  Tasks: {}/{}\n  Habits: {}/{}\n  Pomodoros: {}\n  Points: {}",
        s.tasks_completed, s.tasks_total, s.habits_done, s.habits_total, s.focus_sessions, s.points
    );
    if s.great_day {
        out.push_str("\nGreat day! Every habit is done.");
    }
    out
}

fn check_off(outcome: &CheckOff) -> String {
    match outcome {
        CheckOff::Checked(check) => {
            let mut out = format!(
                "Checked '{}'. Streak: {} days (best {}). +{} points.",
                check.habit, check.streak, check.best_streak, check.points
            );
            if check.milestone {
                let _ = write!(out, "\nMilestone: {} days in a row!", check.streak);
            }
            for achievement in &check.achievements {
                let _ = write!(out, "\nAchievement unlocked: {achievement}");
            }
            out
        }
        CheckOff::AlreadyChecked { habit, streak } => {
            format!("'{habit}' is already checked today. Streak: {streak} days.")
        }
        CheckOff::NotFound { habit } => format!("No habit named '{habit}'."),
    }
}

pub fn render(reply: &Reply) -> String {
    let mut out = match reply {
        Reply::LanguagePrompt { .. } => "Choose your language:".to_string(),
        Reply::Welcome { language } => format!(
            "Welcome! Language set to {}.\nWhat are up to three goals for this month? One per line, blank line to finish.",
            language_name(*language)
        ),
        Reply::GoalsSet { goals } => {
            let mut out = String::from("Goals saved:");
            for goal in goals {
                let _ = write!(out, "\n  - {goal}");
            }
            out.push_str("\nWhich daily habits do you want to track? One per line, blank line to finish.");
            out
        }
        Reply::SetupComplete { habits } => {
            format!("All set! Tracking {habits} habits. Type /help to see what I can do.")
        }
        Reply::LanguageChanged { language } => {
            format!("Language changed to {}.", language_name(*language))
        }
        Reply::TaskPrompt => {
            "Which tasks do you want to add? One per line, blank line to finish.".to_string()
        }
        Reply::CategoryPrompt {
            position,
            total,
            task,
            ..
        } => format!("Task {position}/{total}: {task}\nPick a category:"),
        Reply::RecurrencePrompt { task, .. } => format!("How often does '{task}' repeat?"),
        Reply::TimePrompt { task } => {
            format!("When, or for how long, for '{task}'? (e.g. 09:00 or 30)")
        }
        Reply::TasksCommitted { tasks, points } => {
            let mut out = format!("Added {} tasks. +{points} points.", tasks.len());
            for task in tasks {
                let _ = write!(
                    out,
                    "\n  - {} [{}, {}, {}]",
                    task.text,
                    task.category,
                    task.recurrence.keyword(),
                    task.time
                );
            }
            out
        }
        Reply::HabitBoard { .. } => "Which habit did you complete today?".to_string(),
        Reply::AllHabitsDone => "Every habit is done for today. Well done!".to_string(),
        Reply::NoHabits => "You have no habits yet. Use /start to set some up.".to_string(),
        Reply::HabitChecked(outcome) => check_off(outcome),
        Reply::FocusMenu {
            completed,
            settings,
            ..
        } => format!(
            "Pomodoros so far: {completed}\nWork {} min, short break {} min, long break {} min.\nWhat now?",
            settings.work, settings.short_break, settings.long_break
        ),
        Reply::FocusStarted {
            kind,
            minutes,
            points,
        } => {
            let mut out = format!("{} started: {minutes} minutes.", focus_name(*kind));
            if *points > 0 {
                let _ = write!(out, " +{points} points.");
            }
            out
        }
        Reply::Notification(Notification::WorkComplete) => {
            "Time's up! Work session complete. Take a break.".to_string()
        }
        Reply::Notification(Notification::BreakOver) => {
            "Break over. Ready for the next session?".to_string()
        }
        Reply::Status(s) => status(s),
        Reply::Report(doc) => format!("Report ready: {} ({} bytes)", doc.file_name, doc.bytes.len()),
        Reply::Help(commands) => {
            let mut out = String::from("Commands:");
            for c in commands {
                let _ = write!(out, "\n  /{:<10} {}", c.command, c.summary);
            }
            out.push_str("\n  /cancel     leave the current dialog\n  /quit       exit");
            out
        }
    };
    numbered(&mut out, reply.options());
    out
}
