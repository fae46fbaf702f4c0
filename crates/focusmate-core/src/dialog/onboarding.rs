use chrono::{DateTime, Utc};

use super::{split_lines, unexpected, Choice, DialogStage, DialogState, Inbound, Transition};
use crate::error::DialogError;
use crate::profile::{Goal, Habit, UserProfile, MAX_GOALS};
use crate::reply::Reply;

pub(super) fn step(
    stage: DialogStage,
    profile: &mut UserProfile,
    input: Inbound,
    now: DateTime<Utc>,
) -> Result<Transition, DialogError> {
    let user = profile.user_id;
    match (stage, input) {
        (DialogStage::LanguageSelect, Inbound::Choice(Choice::Language(language))) => {
            profile.set_language(language);
            Ok(Transition::to(
                user,
                DialogState::Onboarding(DialogStage::GoalsInput),
                Reply::Welcome { language },
            ))
        }
        (DialogStage::GoalsInput, Inbound::Text(text)) => {
            let goals: Vec<String> = split_lines(&text).into_iter().take(MAX_GOALS).collect();
            profile.goals = goals.iter().map(|g| Goal::new(g.as_str(), now)).collect();
            Ok(Transition::to(
                user,
                DialogState::Onboarding(DialogStage::HabitsInput),
                Reply::GoalsSet { goals },
            ))
        }
        (DialogStage::HabitsInput, Inbound::Text(text)) => {
            profile.habits = split_lines(&text).into_iter().map(Habit::new).collect();
            tracing::info!(
                user,
                goals = profile.goals.len(),
                habits = profile.habits.len(),
                "onboarding complete"
            );
            Ok(Transition::finish(
                user,
                Reply::SetupComplete {
                    habits: profile.habits.len(),
                },
            ))
        }
        (stage, input) => Err(unexpected(stage, &input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{FocusSettings, Language};

    fn run(
        stage: DialogStage,
        profile: &mut UserProfile,
        input: Inbound,
    ) -> Result<Transition, DialogError> {
        step(stage, profile, input, Utc::now())
    }

    #[test]
    fn language_choice_installs_categories() {
        let mut profile = UserProfile::new(1, FocusSettings::default());
        let t = run(
            DialogStage::LanguageSelect,
            &mut profile,
            Inbound::Choice(Choice::Language(Language::Ar)),
        )
        .unwrap();
        assert_eq!(t.reply, Reply::Welcome { language: Language::Ar });
        assert_eq!(t.next, Some(DialogState::Onboarding(DialogStage::GoalsInput)));
        assert_eq!(profile.categories, Language::Ar.default_categories());
    }

    #[test]
    fn language_stage_rejects_free_text() {
        let mut profile = UserProfile::new(1, FocusSettings::default());
        let err = run(DialogStage::LanguageSelect, &mut profile, Inbound::text("English")).unwrap_err();
        assert!(matches!(
            err,
            DialogError::UnexpectedInput {
                stage: DialogStage::LanguageSelect,
                ..
            }
        ));
        assert_eq!(profile.language, None);
    }

    #[test]
    fn only_first_three_goals_are_kept() {
        let mut profile = UserProfile::new(1, FocusSettings::default());
        let t = run(
            DialogStage::GoalsInput,
            &mut profile,
            Inbound::text("Run a 10k\n\n Learn Rust \nSave money\nRead 12 books"),
        )
        .unwrap();
        assert_eq!(
            t.reply,
            Reply::GoalsSet {
                goals: vec!["Run a 10k".into(), "Learn Rust".into(), "Save money".into()]
            }
        );
        assert_eq!(profile.goals.len(), 3);
        assert!(profile.goals.iter().all(|g| g.progress == 0 && g.milestones.is_empty()));
    }

    #[test]
    fn habits_have_no_cap_and_finish_onboarding() {
        let mut profile = UserProfile::new(1, FocusSettings::default());
        let text = (1..=5).map(|i| format!("Habit {i}")).collect::<Vec<_>>().join("\n");
        let t = run(DialogStage::HabitsInput, &mut profile, Inbound::Text(text)).unwrap();
        assert!(t.terminates());
        assert_eq!(t.reply, Reply::SetupComplete { habits: 5 });
        assert!(profile.habits.iter().all(|h| h.streak == 0 && h.best_streak == 0));
    }
}
