//! True or false question.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::CoreError;
use crate::interaction::{AnswerTracker, Interaction, Phase, Transition};
use crate::scoring;
use crate::settings::BlockSettings;
use crate::types::Timestamp;

use super::{not_blank, ContentMigration, PluginCategory, PluginMetadata, PluginSpec, TRUE_OR_FALSE};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrueOrFalseContent {
    #[validate(custom(function = "not_blank"))]
    pub question: String,
    pub correct_answer: bool,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrueOrFalseAction {
    Select { answer: bool },
    CheckAnswer,
    TryAgain,
    RevealCorrectAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueOrFalseState {
    pub selected: Option<bool>,
    pub tracker: AnswerTracker<bool>,
}

impl Interaction for TrueOrFalseState {
    type Content = TrueOrFalseContent;
    type Action = TrueOrFalseAction;

    fn start(_content: &Self::Content, _settings: &BlockSettings, _rng: &mut dyn RngCore) -> Self {
        Self {
            selected: None,
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
            TrueOrFalseAction::Select { answer } => {
                if !self.tracker.can_check() || self.selected == Some(answer) {
                    Transition::Unchanged
                } else {
                    self.selected = Some(answer);
                    Transition::Changed
                }
            }
            TrueOrFalseAction::CheckAnswer => match self.selected {
                Some(answer) if self.tracker.can_check() => {
                    self.tracker
                        .record(answer, answer == content.correct_answer, now);
                    Transition::Changed
                }
                _ => Transition::Unchanged,
            },
            TrueOrFalseAction::TryAgain => {
                let transition = self.tracker.try_again();
                if transition.changed() {
                    self.selected = None;
                }
                transition
            }
            TrueOrFalseAction::RevealCorrectAnswer => {
                let transition = self.tracker.reveal();
                if transition.changed() {
                    self.selected = Some(content.correct_answer);
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
                scoring::TRUE_OR_FALSE_PENALTY,
                self.tracker.has_revealed_correct_answer,
            )
        })
    }
}

/// Early blocks stored the answer as the string `"true"` / `"false"`.
fn migrate_string_answer(mut value: Value) -> Value {
    if let Some(answer) = value.get_mut("correct_answer") {
        let parsed = answer.as_str().and_then(|text| match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Some(true),
            t if t.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        });
        // Anything else is left as-is and fails deserialization.
        if let Some(parsed) = parsed {
            *answer = Value::Bool(parsed);
        }
    }
    value
}

static MIGRATIONS: &[ContentMigration] = &[ContentMigration {
    name: "string_answer_to_bool",
    migrate: migrate_string_answer,
}];

pub struct TrueOrFalsePlugin;

impl PluginSpec for TrueOrFalsePlugin {
    const PLUGIN_TYPE: &'static str = TRUE_OR_FALSE;

    type Content = TrueOrFalseContent;
    type Interaction = TrueOrFalseState;

    fn metadata() -> PluginMetadata {
        PluginMetadata {
            plugin_type: TRUE_OR_FALSE,
            name: "True or False",
            description: "Decide whether a statement is true",
            category: PluginCategory::Quiz,
            scored: true,
        }
    }

    fn default_content() -> Self::Content {
        TrueOrFalseContent {
            question: "Type your statement here".into(),
            correct_answer: true,
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

    fn content() -> TrueOrFalseContent {
        TrueOrFalseContent {
            question: "The Nile flows north.".into(),
            correct_answer: true,
            explanation: None,
            hint: None,
        }
    }

    fn fresh() -> TrueOrFalseState {
        TrueOrFalseState::start(&content(), &BlockSettings::default(), &mut rand::rng())
    }

    fn act(state: &mut TrueOrFalseState, action: TrueOrFalseAction) -> Transition {
        state.apply(&content(), action, Utc::now()).unwrap()
    }

    #[test]
    fn check_without_selection_is_noop() {
        let mut state = fresh();
        assert_eq!(act(&mut state, TrueOrFalseAction::CheckAnswer), Transition::Unchanged);
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn correct_first_try() {
        let mut state = fresh();
        let _ = act(&mut state, TrueOrFalseAction::Select { answer: true });
        assert!(state.flags().show_check_button);
        let _ = act(&mut state, TrueOrFalseAction::CheckAnswer);
        assert_eq!(state.score(&content()), Some(100));
        assert!(state.flags().show_continue_button);
    }

    #[test]
    fn wrong_then_try_again_clears_selection() {
        let mut state = fresh();
        let _ = act(&mut state, TrueOrFalseAction::Select { answer: false });
        let _ = act(&mut state, TrueOrFalseAction::CheckAnswer);
        assert!(state.flags().show_try_again_button);
        assert_eq!(state.score(&content()), None);

        let _ = act(&mut state, TrueOrFalseAction::TryAgain);
        assert_eq!(state.selected, None);
        let _ = act(&mut state, TrueOrFalseAction::Select { answer: true });
        let _ = act(&mut state, TrueOrFalseAction::CheckAnswer);
        assert_eq!(state.score(&content()), Some(50));
    }

    #[test]
    fn selection_ignored_while_incorrect() {
        let mut state = fresh();
        let _ = act(&mut state, TrueOrFalseAction::Select { answer: false });
        let _ = act(&mut state, TrueOrFalseAction::CheckAnswer);
        assert_eq!(
            act(&mut state, TrueOrFalseAction::Select { answer: true }),
            Transition::Unchanged
        );
    }

    #[test]
    fn reveal_scores_zero_and_shows_answer() {
        let mut state = fresh();
        let _ = act(&mut state, TrueOrFalseAction::RevealCorrectAnswer);
        assert_eq!(state.selected, Some(true));
        assert_eq!(state.score(&content()), Some(0));
        assert!(!state.flags().can_interact);
    }

    #[test]
    fn string_answer_migrates_to_bool() {
        let migrated = migrate_string_answer(json!({ "question": "Q", "correct_answer": "False" }));
        assert_eq!(migrated["correct_answer"], json!(false));
        let untouched = migrate_string_answer(json!({ "question": "Q", "correct_answer": true }));
        assert_eq!(untouched["correct_answer"], json!(true));
    }

    #[test]
    fn unrecognized_string_answer_is_rejected() {
        let raw = json!({ "question": "Q", "correct_answer": "banana" });
        let migrated = migrate_string_answer(raw.clone());
        assert_eq!(migrated["correct_answer"], json!("banana"));

        let plugin = crate::plugins::create_plugin::<TrueOrFalsePlugin>();
        let result = plugin.builder.prepare_content(raw);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
