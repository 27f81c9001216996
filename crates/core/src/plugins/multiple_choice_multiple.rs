//! Multiple choice with several correct answers.
//!
//! The learner toggles choices and checks the whole selection. On a wrong
//! check, "try again" keeps the correct picks and drops the wrong ones.

use std::collections::BTreeSet;

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

use super::multiple_choice_single::{choice_at, choices_not_blank, Choice};
use super::{
    not_blank, validation_error, PluginCategory, PluginMetadata, PluginSpec,
    MULTIPLE_CHOICE_MULTIPLE,
};

fn several_correct(choices: &[Choice]) -> Result<(), ValidationError> {
    choices_not_blank(choices)?;
    let correct = choices.iter().filter(|c| c.is_correct).count();
    if correct < 2 {
        return Err(validation_error(
            "too_few_correct",
            "at least two choices must be marked correct",
        ));
    }
    if correct == choices.len() {
        return Err(validation_error(
            "all_correct",
            "at least one choice must be incorrect",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MultipleChoiceMultipleContent {
    #[validate(custom(function = "not_blank"))]
    pub question: String,
    #[validate(
        length(min = 3, max = 10, message = "between 3 and 10 choices are required"),
        custom(function = "several_correct")
    )]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl MultipleChoiceMultipleContent {
    fn correct_set(&self) -> BTreeSet<usize> {
        self.choices
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_correct)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MultipleChoiceMultipleAction {
    Toggle { choice_index: usize },
    CheckAnswer,
    TryAgain,
    RevealCorrectAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceMultipleState {
    pub selected: BTreeSet<usize>,
    pub display_order: Vec<usize>,
    pub tracker: AnswerTracker<BTreeSet<usize>>,
}

impl Interaction for MultipleChoiceMultipleState {
    type Content = MultipleChoiceMultipleContent;
    type Action = MultipleChoiceMultipleAction;

    fn start(content: &Self::Content, settings: &BlockSettings, rng: &mut dyn RngCore) -> Self {
        Self {
            selected: BTreeSet::new(),
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
            MultipleChoiceMultipleAction::Toggle { choice_index } => {
                choice_at(&content.choices, choice_index)?;
                if !self.tracker.can_check() {
                    Transition::Unchanged
                } else {
                    if !self.selected.remove(&choice_index) {
                        self.selected.insert(choice_index);
                    }
                    Transition::Changed
                }
            }
            MultipleChoiceMultipleAction::CheckAnswer => {
                if !self.tracker.can_check() || self.selected.is_empty() {
                    return Ok(Transition::Unchanged);
                }
                let is_correct = self.selected == content.correct_set();
                self.tracker.record(self.selected.clone(), is_correct, now);
                Transition::Changed
            }
            MultipleChoiceMultipleAction::TryAgain => {
                let transition = self.tracker.try_again();
                if transition.changed() {
                    self.selected
                        .retain(|i| content.choices.get(*i).is_some_and(|c| c.is_correct));
                }
                transition
            }
            MultipleChoiceMultipleAction::RevealCorrectAnswer => {
                let transition = self.tracker.reveal();
                if transition.changed() {
                    self.selected = content.correct_set();
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
        !self.selected.is_empty()
    }

    fn attempts(&self) -> u32 {
        self.tracker.attempt_count()
    }

    fn score(&self, _content: &Self::Content) -> Option<u8> {
        self.tracker.phase.is_terminal().then(|| {
            scoring::choice_score(
                self.tracker.wrong_count(),
                scoring::MULTIPLE_CHOICE_PENALTY,
                self.tracker.has_revealed_correct_answer,
            )
        })
    }

    fn is_consistent_with(&self, content: &Self::Content) -> bool {
        let len = content.choices.len();
        let in_range = |set: &BTreeSet<usize>| set.iter().all(|i| *i < len);
        is_permutation_of(&self.display_order, len)
            && in_range(&self.selected)
            && self.tracker.wrong_attempts.iter().all(|a| in_range(&a.answer))
            && self
                .tracker
                .correct_attempt
                .as_ref()
                .map_or(true, |a| a.answer == content.correct_set())
    }

    /// Counts for the last wrong check, without naming the right choices.
    fn feedback(&self, content: &Self::Content) -> Option<Value> {
        if self.tracker.phase != Phase::Incorrect {
            return None;
        }
        let last = self.tracker.wrong_attempts.last()?;
        let correct = content.correct_set();
        let correct_selected = last.answer.intersection(&correct).count();
        let incorrect_selected = last.answer.len() - correct_selected;
        Some(serde_json::json!({
            "correct_selected": correct_selected,
            "incorrect_selected": incorrect_selected,
            "remaining_correct": correct.len() - correct_selected,
        }))
    }
}

pub struct MultipleChoiceMultiplePlugin;

impl PluginSpec for MultipleChoiceMultiplePlugin {
    const PLUGIN_TYPE: &'static str = MULTIPLE_CHOICE_MULTIPLE;

    type Content = MultipleChoiceMultipleContent;
    type Interaction = MultipleChoiceMultipleState;

    fn metadata() -> PluginMetadata {
        PluginMetadata {
            plugin_type: MULTIPLE_CHOICE_MULTIPLE,
            name: "Multiple Choice (Multiple Answers)",
            description: "Select every correct answer",
            category: PluginCategory::Quiz,
            scored: true,
        }
    }

    fn default_content() -> Self::Content {
        let choice = |text: &str, is_correct| Choice {
            choice_state: text.into(),
            is_correct,
        };
        MultipleChoiceMultipleContent {
            question: "Type your question here".into(),
            choices: vec![
                choice("First correct answer", true),
                choice("Second correct answer", true),
                choice("Wrong answer", false),
            ],
            explanation: None,
            hint: None,
        }
    }
}
