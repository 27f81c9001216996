//! Fill in the blank: the learner types a short answer.
//!
//! Answers are compared after collapsing whitespace, case-insensitively
//! unless the block is case sensitive. After five wrong attempts the correct
//! answer is revealed automatically.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::CoreError;
use crate::interaction::{AnswerTracker, Interaction, Phase, Transition};
use crate::scoring;
use crate::settings::BlockSettings;
use crate::types::Timestamp;

use super::{
    not_blank, rename_key, ContentMigration, PluginCategory, PluginMetadata, PluginSpec,
    FILL_IN_THE_BLANK,
};

/// Wrong attempts after which the answer is revealed.
pub const MAX_WRONG_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FillInTheBlankContent {
    #[validate(custom(function = "not_blank"))]
    pub question: String,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub correct_answer: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FillInTheBlankAction {
    Input { value: String },
    CheckAnswer,
    TryAgain,
    RevealCorrectAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillInTheBlankState {
    pub input: String,
    pub tracker: AnswerTracker<String>,
}

// ---------------------------------------------------------------------------
// Letter feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    Correct,
    Incorrect,
    /// The answer is longer than the learner's input at this position.
    Missing,
    /// The learner typed past the end of the answer.
    Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterFeedback {
    /// The learner's letter, `None` where it is missing.
    pub letter: Option<char>,
    pub status: LetterStatus,
}

/// Per-position comparison of `user_answer` against `correct_answer`.
///
/// Whitespace is stripped from both before comparing, so the result has
/// `max(len(user), len(correct))` entries counted in characters.
pub fn letter_feedback(
    user_answer: &str,
    correct_answer: &str,
    case_sensitive: bool,
) -> Vec<LetterFeedback> {
    let user: Vec<char> = user_answer.chars().filter(|c| !c.is_whitespace()).collect();
    let correct: Vec<char> = correct_answer
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let same = |a: char, b: char| {
        if case_sensitive {
            a == b
        } else {
            a.to_lowercase().eq(b.to_lowercase())
        }
    };

    (0..user.len().max(correct.len()))
        .map(|i| match (user.get(i), correct.get(i)) {
            (Some(&u), Some(&c)) => LetterFeedback {
                letter: Some(u),
                status: if same(u, c) {
                    LetterStatus::Correct
                } else {
                    LetterStatus::Incorrect
                },
            },
            (Some(&u), None) => LetterFeedback {
                letter: Some(u),
                status: LetterStatus::Extra,
            },
            (None, _) => LetterFeedback {
                letter: None,
                status: LetterStatus::Missing,
            },
        })
        .collect()
}

/// Collapse runs of whitespace and fold case unless `case_sensitive`.
pub fn normalize_answer(answer: &str, case_sensitive: bool) -> String {
    let collapsed = answer.split_whitespace().collect::<Vec<_>>().join(" ");
    if case_sensitive {
        collapsed
    } else {
        collapsed.to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

impl Interaction for FillInTheBlankState {
    type Content = FillInTheBlankContent;
    type Action = FillInTheBlankAction;

    fn start(_content: &Self::Content, _settings: &BlockSettings, _rng: &mut dyn RngCore) -> Self {
        Self {
            input: String::new(),
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
            FillInTheBlankAction::Input { value } => {
                if !self.tracker.can_check() || self.input == value {
                    Transition::Unchanged
                } else {
                    self.input = value;
                    Transition::Changed
                }
            }
            FillInTheBlankAction::CheckAnswer => {
                if !self.tracker.can_check() || self.input.trim().is_empty() {
                    return Ok(Transition::Unchanged);
                }
                let answer = self.input.trim().to_string();
                let is_correct = normalize_answer(&answer, content.case_sensitive)
                    == normalize_answer(&content.correct_answer, content.case_sensitive);
                self.tracker.record(answer, is_correct, now);
                if !is_correct && self.tracker.wrong_count() >= MAX_WRONG_ATTEMPTS {
                    let _ = self.tracker.reveal();
                }
                Transition::Changed
            }
            FillInTheBlankAction::TryAgain => self.tracker.try_again(),
            FillInTheBlankAction::RevealCorrectAnswer => self.tracker.reveal(),
        };
        Ok(transition)
    }

    fn phase(&self) -> Phase {
        self.tracker.phase
    }

    fn has_selection(&self) -> bool {
        !self.input.trim().is_empty()
    }

    fn attempts(&self) -> u32 {
        self.tracker.attempt_count()
    }

    fn score(&self, _content: &Self::Content) -> Option<u8> {
        match self.tracker.phase {
            Phase::Correct | Phase::Revealed => Some(scoring::fill_in_blank_score(
                self.tracker.wrong_count(),
                self.tracker.has_revealed_correct_answer,
            )),
            _ => None,
        }
    }

    /// Letter-by-letter comparison of the last wrong answer.
    fn feedback(&self, content: &Self::Content) -> Option<Value> {
        if self.tracker.phase != Phase::Incorrect {
            return None;
        }
        let last = self.tracker.wrong_attempts.last()?;
        let letters =
            letter_feedback(&last.answer, &content.correct_answer, content.case_sensitive);
        Some(serde_json::json!({
            "letters": letters,
            "remaining_attempts": MAX_WRONG_ATTEMPTS.saturating_sub(self.tracker.wrong_count()),
        }))
    }
}

// ---------------------------------------------------------------------------
// Plugin declaration
// ---------------------------------------------------------------------------

fn migrate_answer_key(value: Value) -> Value {
    rename_key(value, "answer", "correct_answer")
}

static MIGRATIONS: &[ContentMigration] = &[ContentMigration {
    name: "answer_to_correct_answer",
    migrate: migrate_answer_key,
}];

pub struct FillInTheBlankPlugin;

impl PluginSpec for FillInTheBlankPlugin {
    const PLUGIN_TYPE: &'static str = FILL_IN_THE_BLANK;

    type Content = FillInTheBlankContent;
    type Interaction = FillInTheBlankState;

    fn metadata() -> PluginMetadata {
        PluginMetadata {
            plugin_type: FILL_IN_THE_BLANK,
            name: "Fill in the Blank",
            description: "Type the missing word or phrase",
            category: PluginCategory::Quiz,
            scored: true,
        }
    }

    fn default_content() -> Self::Content {
        FillInTheBlankContent {
            question: "Type your question here".into(),
            correct_answer: "answer".into(),
            hint: None,
            explanation: None,
            case_sensitive: false,
        }
    }

    fn migrations() -> &'static [ContentMigration] {
        MIGRATIONS
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn content() -> FillInTheBlankContent {
        FillInTheBlankContent {
            question: "Largest city in Kenya?".into(),
            correct_answer: "Nairobi".into(),
            hint: None,
            explanation: None,
            case_sensitive: false,
        }
    }

    fn fresh() -> FillInTheBlankState {
        FillInTheBlankState::start(&content(), &BlockSettings::default(), &mut rand::rng())
    }

    fn submit(state: &mut FillInTheBlankState, answer: &str) {
        let c = content();
        let _ = state
            .apply(&c, FillInTheBlankAction::Input { value: answer.into() }, Utc::now())
            .unwrap();
        let _ = state
            .apply(&c, FillInTheBlankAction::CheckAnswer, Utc::now())
            .unwrap();
    }

    #[test]
    fn correct_first_try_scores_full() {
        let mut state = fresh();
        submit(&mut state, "  nairobi ");
        assert_eq!(state.phase(), Phase::Correct);
        assert_eq!(state.score(&content()), Some(100));
        assert!(state.flags().show_continue_button);
        assert!(!state.flags().can_interact);
    }

    #[test]
    fn empty_input_check_is_noop() {
        let mut state = fresh();
        let before = state.clone();
        let transition = state
            .apply(&content(), FillInTheBlankAction::CheckAnswer, Utc::now())
            .unwrap();
        assert_eq!(transition, Transition::Unchanged);
        assert_eq!(state, before);

        let _ = state
            .apply(
                &content(),
                FillInTheBlankAction::Input { value: "   ".into() },
                Utc::now(),
            )
            .unwrap();
        let before = state.clone();
        let transition = state
            .apply(&content(), FillInTheBlankAction::CheckAnswer, Utc::now())
            .unwrap();
        assert_eq!(transition, Transition::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn five_wrong_answers_auto_reveal() {
        let mut state = fresh();
        for attempt in 1..=MAX_WRONG_ATTEMPTS {
            submit(&mut state, "Mombasa");
            if attempt < MAX_WRONG_ATTEMPTS {
                assert_eq!(state.phase(), Phase::Incorrect);
                let _ = state
                    .apply(&content(), FillInTheBlankAction::TryAgain, Utc::now())
                    .unwrap();
            }
        }
        assert_eq!(state.phase(), Phase::Revealed);
        assert!(state.tracker.has_revealed_correct_answer);
        assert!(state.flags().has_revealed_correct_answer);
        assert_eq!(state.score(&content()), Some(0));
    }

    #[test]
    fn wrong_then_right_is_penalized() {
        let mut state = fresh();
        submit(&mut state, "Kisumu");
        let _ = state
            .apply(&content(), FillInTheBlankAction::TryAgain, Utc::now())
            .unwrap();
        submit(&mut state, "Nairobi");
        assert_eq!(state.score(&content()), Some(80));
        assert_eq!(state.attempts(), 2);
    }

    #[test]
    fn reveal_blocks_interaction_until_reset() {
        let mut state = fresh();
        let _ = state
            .apply(&content(), FillInTheBlankAction::RevealCorrectAnswer, Utc::now())
            .unwrap();
        assert!(!state.flags().can_interact);

        let transition = state
            .apply(
                &content(),
                FillInTheBlankAction::Input { value: "Nairobi".into() },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(transition, Transition::Unchanged);
        let _ = state
            .apply(&content(), FillInTheBlankAction::TryAgain, Utc::now())
            .unwrap();
        assert!(!state.flags().can_interact);
        assert_eq!(state.score(&content()), Some(0));
    }

    #[test]
    fn case_sensitive_block_rejects_wrong_case() {
        let mut c = content();
        c.case_sensitive = true;
        let mut state = FillInTheBlankState::start(&c, &BlockSettings::default(), &mut rand::rng());
        let _ = state
            .apply(&c, FillInTheBlankAction::Input { value: "nairobi".into() }, Utc::now())
            .unwrap();
        let _ = state.apply(&c, FillInTheBlankAction::CheckAnswer, Utc::now()).unwrap();
        assert_eq!(state.phase(), Phase::Incorrect);
    }

    #[test]
    fn feedback_shows_letters_after_wrong_attempt() {
        let mut state = fresh();
        submit(&mut state, "Nairobo");
        let feedback = state.feedback(&content()).unwrap();
        assert_eq!(feedback["letters"].as_array().unwrap().len(), 7);
        assert_eq!(feedback["remaining_attempts"], 4);
    }

    #[test]
    fn letter_feedback_length_is_max_without_spaces() {
        let feedback = letter_feedback("new york city", "NewYork", false);
        assert_eq!(feedback.len(), 11);
        assert!(feedback[..7]
            .iter()
            .all(|f| f.status == LetterStatus::Correct));
        assert_matches!(feedback[7].status, LetterStatus::Extra);
    }

    #[test]
    fn letter_feedback_marks_missing_letters() {
        let feedback = letter_feedback("Nai", "Nairobi", false);
        assert_eq!(feedback.len(), 7);
        assert_eq!(feedback[3].letter, None);
        assert_matches!(feedback[6].status, LetterStatus::Missing);
    }

    #[test]
    fn letter_feedback_case_handling() {
        let insensitive = letter_feedback("NAIROBI", "nairobi", false);
        assert!(insensitive.iter().all(|f| f.status == LetterStatus::Correct));

        let sensitive = letter_feedback("NAIROBI", "nairobi", true);
        assert!(sensitive.iter().all(|f| f.status == LetterStatus::Incorrect));
    }

    #[test]
    fn content_validation() {
        assert!(content().validate().is_ok());
        let mut blank = content();
        blank.correct_answer = " ".into();
        assert!(blank.validate().is_err());
    }
}
