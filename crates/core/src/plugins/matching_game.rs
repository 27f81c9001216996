//! Match each left item to its right-hand partner.
//!
//! There is no check button: picking a right item while a left item is
//! selected checks that pair on the spot. Wrong pairs cost points but do
//! not lock the board.

use std::collections::HashSet;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::interaction::{
    is_permutation_of, presentation_order, AnswerTracker, Attempt, Interaction, InteractionFlags,
    Phase, Transition,
};
use crate::scoring;
use crate::settings::BlockSettings;
use crate::types::Timestamp;

use super::{not_blank, validation_error, PluginCategory, PluginMetadata, PluginSpec, MATCHING_GAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub id: String,
    pub left_content: String,
    pub right_content: String,
}

fn valid_pairs(pairs: &[MatchingPair]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for pair in pairs {
        if pair.id.trim().is_empty()
            || pair.left_content.trim().is_empty()
            || pair.right_content.trim().is_empty()
        {
            return Err(validation_error(
                "blank_pair",
                "pair ids and both sides must not be blank",
            ));
        }
        if !seen.insert(pair.id.as_str()) {
            return Err(validation_error("duplicate_pair_id", "pair ids must be unique"));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchingGameContent {
    #[validate(custom(function = "not_blank"))]
    pub question: String,
    #[validate(
        length(min = 2, max = 10, message = "between 2 and 10 pairs are required"),
        custom(function = "valid_pairs")
    )]
    pub pairs: Vec<MatchingPair>,
}

impl MatchingGameContent {
    fn contains(&self, pair_id: &str) -> bool {
        self.pairs.iter().any(|p| p.id == pair_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchingGameAction {
    SelectLeft { pair_id: String },
    SelectRight { pair_id: String },
    RevealCorrectAnswer,
}

/// A left item paired with a right item, identified by their pair ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub left_id: String,
    pub right_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingGameState {
    pub selected_left: Option<String>,
    pub matched_pair_ids: Vec<String>,
    /// Indices into `pairs` for the left column.
    pub left_order: Vec<usize>,
    /// Indices into `pairs` for the right column, shuffled independently.
    pub right_order: Vec<usize>,
    /// Wrong pairings plus the final correct one.
    pub tracker: AnswerTracker<Pairing>,
}

impl MatchingGameState {
    fn is_matched(&self, pair_id: &str) -> bool {
        self.matched_pair_ids.iter().any(|id| id == pair_id)
    }

    fn check_known(content: &MatchingGameContent, pair_id: &str) -> Result<(), CoreError> {
        if content.contains(pair_id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!("Unknown pair_id '{pair_id}'")))
        }
    }
}

impl Interaction for MatchingGameState {
    type Content = MatchingGameContent;
    type Action = MatchingGameAction;

    fn start(content: &Self::Content, settings: &BlockSettings, rng: &mut dyn RngCore) -> Self {
        let len = content.pairs.len();
        Self {
            selected_left: None,
            matched_pair_ids: Vec::new(),
            left_order: presentation_order(len, settings.randomization, rng),
            right_order: presentation_order(len, settings.randomization, rng),
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
            MatchingGameAction::SelectLeft { pair_id } => {
                Self::check_known(content, &pair_id)?;
                if !self.tracker.can_check()
                    || self.is_matched(&pair_id)
                    || self.selected_left.as_deref() == Some(pair_id.as_str())
                {
                    Transition::Unchanged
                } else {
                    self.selected_left = Some(pair_id);
                    Transition::Changed
                }
            }
            MatchingGameAction::SelectRight { pair_id } => {
                Self::check_known(content, &pair_id)?;
                if !self.tracker.can_check() || self.is_matched(&pair_id) {
                    return Ok(Transition::Unchanged);
                }
                let Some(left_id) = self.selected_left.take() else {
                    return Ok(Transition::Unchanged);
                };
                let pairing = Pairing {
                    right_id: pair_id,
                    left_id,
                };
                if pairing.left_id == pairing.right_id {
                    self.matched_pair_ids.push(pairing.left_id.clone());
                    if self.matched_pair_ids.len() == content.pairs.len() {
                        self.tracker.record(pairing, true, now);
                    }
                } else {
                    // Wrong pairs only clear the selection; play continues.
                    self.tracker.wrong_attempts.push(Attempt {
                        answer: pairing,
                        timestamp: now,
                    });
                }
                Transition::Changed
            }
            MatchingGameAction::RevealCorrectAnswer => {
                let transition = self.tracker.reveal();
                if transition.changed() {
                    self.selected_left = None;
                    self.matched_pair_ids = content.pairs.iter().map(|p| p.id.clone()).collect();
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
        self.selected_left.is_some()
    }

    fn attempts(&self) -> u32 {
        let matched = if self.tracker.has_revealed_correct_answer {
            0
        } else {
            self.matched_pair_ids.len() as u32
        };
        self.tracker.wrong_count() + matched
    }

    fn score(&self, content: &Self::Content) -> Option<u8> {
        match self.tracker.phase {
            Phase::Revealed => Some(0),
            Phase::Correct => Some(scoring::matching_game_score(
                self.matched_pair_ids.len() as u32,
                content.pairs.len() as u32,
                self.tracker.wrong_count(),
            )),
            Phase::Answering | Phase::Incorrect => None,
        }
    }

    /// Matches must name current pairs, and a finished game must still
    /// cover every pair.
    fn is_consistent_with(&self, content: &Self::Content) -> bool {
        let len = content.pairs.len();
        let unique: HashSet<&str> = self.matched_pair_ids.iter().map(String::as_str).collect();
        is_permutation_of(&self.left_order, len)
            && is_permutation_of(&self.right_order, len)
            && unique.len() == self.matched_pair_ids.len()
            && unique.iter().all(|id| content.contains(id))
            && self
                .selected_left
                .as_deref()
                .map_or(true, |id| content.contains(id) && !unique.contains(id))
            && (self.tracker.phase != Phase::Correct || unique.len() == len)
    }

    fn feedback(&self, content: &Self::Content) -> Option<Value> {
        if self.tracker.phase.is_terminal() {
            return None;
        }
        let last_wrong = self.tracker.wrong_attempts.last().map(|a| &a.answer);
        Some(serde_json::json!({
            "matched_pair_ids": self.matched_pair_ids,
            "remaining_pairs": content.pairs.len().saturating_sub(self.matched_pair_ids.len()),
            "wrong_attempts": self.tracker.wrong_count(),
            "last_wrong_pairing": last_wrong,
        }))
    }

    fn flags(&self) -> InteractionFlags {
        // Pairs are checked on selection, so no check button.
        InteractionFlags::for_phase(self.phase(), false)
    }
}

pub struct MatchingGamePlugin;

impl PluginSpec for MatchingGamePlugin {
    const PLUGIN_TYPE: &'static str = MATCHING_GAME;
    const SUPPORTS_CHECK: bool = false;

    type Content = MatchingGameContent;
    type Interaction = MatchingGameState;

    fn metadata() -> PluginMetadata {
        PluginMetadata {
            plugin_type: MATCHING_GAME,
            name: "Matching Game",
            description: "Pair up related items",
            category: PluginCategory::Game,
            scored: true,
        }
    }

    fn default_content() -> Self::Content {
        let pair = |id: &str, left: &str, right: &str| MatchingPair {
            id: id.into(),
            left_content: left.into(),
            right_content: right.into(),
        };
        MatchingGameContent {
            question: "Match the items".into(),
            pairs: vec![
                pair("1", "Left item 1", "Right item 1"),
                pair("2", "Left item 2", "Right item 2"),
            ],
        }
    }
}
