//! Multiple choice with exactly one correct answer.
//!
//! A choice that was already answered wrong cannot be picked again. Once
//! every incorrect choice has been tried the correct one is revealed.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::interaction::{
    is_permutation_of, presentation_order, AnswerTracker, Interaction, Phase, Transition,
};
use crate::scoring;
use crate::settings::BlockSettings;
use crate::types::Timestamp;

use super::{
    not_blank, validation_error, ContentMigration, PluginCategory, PluginMetadata, PluginSpec,
    MULTIPLE_CHOICE_SINGLE,
};

/// One selectable answer, shared with the multiple-answer variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub choice_state: String,
    pub is_correct: bool,
}

pub(crate) fn choices_not_blank(choices: &[Choice]) -> Result<(), ValidationError> {
    if choices.iter().any(|c| c.choice_state.trim().is_empty()) {
        return Err(validation_error("blank_choice", "choices must not be blank"));
    }
    Ok(())
}

fn exactly_one_correct(choices: &[Choice]) -> Result<(), ValidationError> {
    choices_not_blank(choices)?;
    if choices.iter().filter(|c| c.is_correct).count() != 1 {
        return Err(validation_error(
            "exactly_one_correct",
            "exactly one choice must be marked correct",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MultipleChoiceSingleContent {
    #[validate(custom(function = "not_blank"))]
    pub question: String,
    #[validate(
        length(min = 2, max = 10, message = "between 2 and 10 choices are required"),
        custom(function = "exactly_one_correct")
    )]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl MultipleChoiceSingleContent {
    fn correct_index(&self) -> Option<usize> {
        self.choices.iter().position(|c| c.is_correct)
    }
}

pub(crate) fn choice_at(choices: &[Choice], index: usize) -> Result<&Choice, CoreError> {
    choices.get(index).ok_or_else(|| {
        CoreError::Validation(format!(
            "choice_index {index} is out of range (0..{})",
            choices.len()
        ))
    })
}

fn is_correct_at(choices: &[Choice], index: usize) -> Option<bool> {
    choices.get(index).map(|c| c.is_correct)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MultipleChoiceSingleAction {
    Select { choice_index: usize },
    CheckAnswer,
    TryAgain,
    RevealCorrectAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceSingleState {
    /// Authored index of the selected choice.
    pub selected: Option<usize>,
    /// Authored indices in display order.
    pub display_order: Vec<usize>,
    pub tracker: AnswerTracker<usize>,
}

impl MultipleChoiceSingleState {
    fn already_wrong(&self, index: usize) -> bool {
        self.tracker.wrong_attempts.iter().any(|a| a.answer == index)
    }
}

impl Interaction for MultipleChoiceSingleState {
    type Content = MultipleChoiceSingleContent;
    type Action = MultipleChoiceSingleAction;

    fn start(content: &Self::Content, settings: &BlockSettings, rng: &mut dyn RngCore) -> Self {
        Self {
            selected: None,
            display_order: presentation_order(content.choices.len(), settings.randomization, rng),
            tracker: AnswerTracker::default(),
        }
    }

    fn apply(
        &mut self,
        content: &Self::Content,
        action: Self::Action,
        now: Timestamp,
    ) -> Result<Transition, CoreError> {
        let transition = match action {
            MultipleChoiceSingleAction::Select { choice_index } => {
                choice_at(&content.choices, choice_index)?;
                if !self.tracker.can_check()
                    || self.selected == Some(choice_index)
                    || self.already_wrong(choice_index)
                {
                    Transition::Unchanged
                } else {
                    self.selected = Some(choice_index);
                    Transition::Changed
                }
            }
            MultipleChoiceSingleAction::CheckAnswer => match self.selected {
                Some(index) if self.tracker.can_check() => {
                    let is_correct = choice_at(&content.choices, index)?.is_correct;
                    self.tracker.record(index, is_correct, now);
                    let incorrect_total = (content.choices.len() as u32).saturating_sub(1);
                    if !is_correct && self.tracker.wrong_count() >= incorrect_total {
                        let _ = self.tracker.reveal();
                        self.selected = content.correct_index();
                    }
                    Transition::Changed
                }
                _ => Transition::Unchanged,
            },
            MultipleChoiceSingleAction::TryAgain => {
                let transition = self.tracker.try_again();
                if transition.changed() {
                    self.selected = None;
                }
                transition
            }
            MultipleChoiceSingleAction::RevealCorrectAnswer => {
                let transition = self.tracker.reveal();
                if transition.changed() {
                    self.selected = content.correct_index();
                }
                transition
            }
        };
        Ok(transition)
    }

    fn phase(&self) -> Phase {
        self.tracker.phase
    }

    fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    fn attempts(&self) -> u32 {
        self.tracker.attempt_count()
    }

    fn score(&self, _content: &Self::Content) -> Option<u8> {
        self.tracker.phase.is_terminal().then(|| {
            scoring::choice_score(
                self.tracker.wrong_count(),
                scoring::SINGLE_CHOICE_PENALTY,
                self.tracker.has_revealed_correct_answer,
            )
        })
    }

    /// Every stored index must still name a choice, and earlier answers must
    /// still be graded the same way.
    fn is_consistent_with(&self, content: &Self::Content) -> bool {
        let choices = &content.choices;
        is_permutation_of(&self.display_order, choices.len())
            && self.selected.map_or(true, |i| i < choices.len())
            && self
                .tracker
                .wrong_attempts
                .iter()
                .all(|a| is_correct_at(choices, a.answer) == Some(false))
            && self
                .tracker
                .correct_attempt
                .as_ref()
                .map_or(true, |a| is_correct_at(choices, a.answer) == Some(true))
    }

    /// Choices the learner may no longer pick.
    fn feedback(&self, _content: &Self::Content) -> Option<Value> {
        if self.tracker.wrong_attempts.is_empty() {
            return None;
        }
        let disabled: Vec<usize> = self.tracker.wrong_attempts.iter().map(|a| a.answer).collect();
        Some(serde_json::json!({ "disabled_choices": disabled }))
    }
}

/// Early blocks stored plain strings plus a `correct_index`.
fn migrate_string_choices(mut value: Value) -> Value {
    let Some(obj) = value.as_object_mut() else {
        return value;
    };
    let Some(correct_index) = obj.get("correct_index").and_then(Value::as_u64) else {
        return value;
    };
    let legacy: Option<Vec<String>> = obj.get("choices").and_then(|choices| {
        choices
            .as_array()?
            .iter()
            .map(|c| c.as_str().map(str::to_string))
            .collect()
    });
    if let Some(texts) = legacy {
        let choices: Vec<Value> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                serde_json::json!({ "choice_state": text, "is_correct": i as u64 == correct_index })
            })
            .collect();
        obj.insert("choices".into(), Value::Array(choices));
        obj.remove("correct_index");
    }
    value
}

static MIGRATIONS: &[ContentMigration] = &[ContentMigration {
    name: "string_choices_to_objects",
    migrate: migrate_string_choices,
}];

pub struct MultipleChoiceSinglePlugin;

impl PluginSpec for MultipleChoiceSinglePlugin {
    const PLUGIN_TYPE: &'static str = MULTIPLE_CHOICE_SINGLE;

    type Content = MultipleChoiceSingleContent;
    type Interaction = MultipleChoiceSingleState;

    fn metadata() -> PluginMetadata {
        PluginMetadata {
            plugin_type: MULTIPLE_CHOICE_SINGLE,
            name: "Multiple Choice (Single Answer)",
            description: "Pick the one correct answer",
            category: PluginCategory::Quiz,
            scored: true,
        }
    }

    fn default_content() -> Self::Content {
        MultipleChoiceSingleContent {
            question: "Type your question here".into(),
            choices: vec![
                Choice {
                    choice_state: "Correct answer".into(),
                    is_correct: true,
                },
                Choice {
                    choice_state: "Wrong answer".into(),
                    is_correct: false,
                },
            ],
            explanation: None,
            hint: None,
        }
    }

    fn migrations() -> &'static [ContentMigration] {
        MIGRATIONS
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::settings::Randomization;

    fn content() -> MultipleChoiceSingleContent {
        MultipleChoiceSingleContent {
            question: "Which is a prime?".into(),
            choices: ["4", "6", "7", "9"]
                .iter()
                .map(|t| Choice {
                    choice_state: (*t).into(),
                    is_correct: *t == "7",
                })
                .collect(),
            explanation: None,
            hint: None,
        }
    }

    fn fresh() -> MultipleChoiceSingleState {
        MultipleChoiceSingleState::start(&content(), &BlockSettings::default(), &mut rand::rng())
    }

    fn pick(state: &mut MultipleChoiceSingleState, index: usize) {
        let c = content();
        let _ = state
            .apply(&c, MultipleChoiceSingleAction::Select { choice_index: index }, Utc::now())
            .unwrap();
        let _ = state
            .apply(&c, MultipleChoiceSingleAction::CheckAnswer, Utc::now())
            .unwrap();
    }

    #[test]
    fn correct_first_try() {
        let mut state = fresh();
        pick(&mut state, 2);
        assert_eq!(state.score(&content()), Some(100));
    }

    #[test]
    fn out_of_range_choice_rejected() {
        let mut state = fresh();
        let result = state.apply(
            &content(),
            MultipleChoiceSingleAction::Select { choice_index: 9 },
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn wrong_choice_cannot_be_reselected() {
        let mut state = fresh();
        pick(&mut state, 0);
        let _ = state
            .apply(&content(), MultipleChoiceSingleAction::TryAgain, Utc::now())
            .unwrap();
        let transition = state
            .apply(
                &content(),
                MultipleChoiceSingleAction::Select { choice_index: 0 },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(transition, Transition::Unchanged);
        assert_eq!(
            state.feedback(&content()).unwrap()["disabled_choices"],
            json!([0])
        );
    }

    #[test]
    fn exhausting_wrong_choices_reveals() {
        let mut state = fresh();
        for wrong in [0, 1, 3] {
            pick(&mut state, wrong);
            let _ = state
                .apply(&content(), MultipleChoiceSingleAction::TryAgain, Utc::now())
                .unwrap();
        }
        assert_eq!(state.phase(), Phase::Revealed);
        assert_eq!(state.selected, Some(2));
        assert_eq!(state.score(&content()), Some(0));
    }

    #[test]
    fn penalty_per_wrong_attempt() {
        let mut state = fresh();
        pick(&mut state, 0);
        let _ = state
            .apply(&content(), MultipleChoiceSingleAction::TryAgain, Utc::now())
            .unwrap();
        pick(&mut state, 2);
        assert_eq!(state.score(&content()), Some(75));
    }

    #[test]
    fn shuffle_keeps_all_choices() {
        let settings = BlockSettings {
            randomization: Randomization::Shuffle,
            ..BlockSettings::default()
        };
        let state = MultipleChoiceSingleState::start(&content(), &settings, &mut rand::rng());
        let mut order = state.display_order.clone();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn validation_requires_exactly_one_correct() {
        let mut c = content();
        c.choices[0].is_correct = true;
        assert!(c.validate().is_err());

        let mut c = content();
        c.choices.truncate(1);
        assert!(c.validate().is_err());

        assert!(content().validate().is_ok());
    }

    #[test]
    fn state_from_longer_content_is_inconsistent() {
        let mut state = fresh();
        let _ = state
            .apply(
                &content(),
                MultipleChoiceSingleAction::Select { choice_index: 3 },
                Utc::now(),
            )
            .unwrap();
        assert!(state.is_consistent_with(&content()));

        let mut shorter = content();
        shorter.choices.truncate(3);
        assert!(!state.is_consistent_with(&shorter));

        let err = state
            .apply(&shorter, MultipleChoiceSingleAction::CheckAnswer, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn regraded_wrong_answer_is_inconsistent() {
        let mut state = fresh();
        pick(&mut state, 0);

        let mut regraded = content();
        regraded.choices[0].is_correct = true;
        regraded.choices[2].is_correct = false;
        assert!(!state.is_consistent_with(&regraded));
    }

    #[test]
    fn legacy_string_choices_migrate() {
        let migrated = migrate_string_choices(json!({
            "question": "Q",
            "choices": ["a", "b"],
            "correct_index": 1
        }));
        assert_eq!(
            migrated["choices"],
            json!([
                { "choice_state": "a", "is_correct": false },
                { "choice_state": "b", "is_correct": true }
            ])
        );
        assert!(migrated.get("correct_index").is_none());
    }
}
