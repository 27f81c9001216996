//! Runtime interaction machines for quiz blocks.
//!
//! Each plugin type owns a small state machine implementing [`Interaction`].
//! The shared pieces live here: the [`Phase`] enum, the UI flags derived from
//! it, and [`AnswerTracker`], which records attempts and handles the
//! check / try again / reveal transitions common to every quiz type.

pub mod timer;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::settings::{BlockSettings, Randomization};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Phase and flags
// ---------------------------------------------------------------------------

/// Where a block's interaction currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Learner is choosing an answer.
    #[default]
    Answering,
    /// Last check was wrong; waiting for "try again".
    Incorrect,
    /// Answered correctly. Terminal.
    Correct,
    /// Correct answer was shown. Terminal, scores 0.
    Revealed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Correct | Self::Revealed)
    }
}

/// Button and input visibility derived from the phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFlags {
    pub show_check_button: bool,
    pub show_try_again_button: bool,
    pub show_continue_button: bool,
    pub has_revealed_correct_answer: bool,
    pub can_interact: bool,
}

impl InteractionFlags {
    pub fn for_phase(phase: Phase, has_selection: bool) -> Self {
        match phase {
            Phase::Answering => Self {
                show_check_button: has_selection,
                can_interact: true,
                ..Self::default()
            },
            Phase::Incorrect => Self {
                show_try_again_button: true,
                ..Self::default()
            },
            Phase::Correct => Self {
                show_continue_button: true,
                ..Self::default()
            },
            Phase::Revealed => Self {
                show_continue_button: true,
                has_revealed_correct_answer: true,
                ..Self::default()
            },
        }
    }
}

/// Whether an action mutated the state.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
}

impl Transition {
    pub fn changed(self) -> bool {
        self == Self::Changed
    }
}

// ---------------------------------------------------------------------------
// Attempt tracking
// ---------------------------------------------------------------------------

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt<A> {
    pub answer: A,
    pub timestamp: Timestamp,
}

/// Attempt history plus phase, shared by all quiz machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerTracker<A> {
    pub phase: Phase,
    pub wrong_attempts: Vec<Attempt<A>>,
    pub correct_attempt: Option<Attempt<A>>,
    pub has_revealed_correct_answer: bool,
}

impl<A> Default for AnswerTracker<A> {
    fn default() -> Self {
        Self {
            phase: Phase::Answering,
            wrong_attempts: Vec::new(),
            correct_attempt: None,
            has_revealed_correct_answer: false,
        }
    }
}

impl<A> AnswerTracker<A> {
    /// Checking is only allowed while answering.
    pub fn can_check(&self) -> bool {
        self.phase == Phase::Answering
    }

    /// Record a checked answer and move to `Correct` or `Incorrect`.
    pub fn record(&mut self, answer: A, is_correct: bool, now: Timestamp) {
        let attempt = Attempt {
            answer,
            timestamp: now,
        };
        if is_correct {
            self.correct_attempt = Some(attempt);
            self.phase = Phase::Correct;
        } else {
            self.wrong_attempts.push(attempt);
            self.phase = Phase::Incorrect;
        }
    }

    /// Leave `Incorrect` and accept input again.
    pub fn try_again(&mut self) -> Transition {
        if self.phase != Phase::Incorrect {
            return Transition::Unchanged;
        }
        self.phase = Phase::Answering;
        Transition::Changed
    }

    /// Force the terminal `Revealed` phase.
    pub fn reveal(&mut self) -> Transition {
        if self.phase.is_terminal() {
            return Transition::Unchanged;
        }
        self.has_revealed_correct_answer = true;
        self.phase = Phase::Revealed;
        Transition::Changed
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_attempts.len() as u32
    }

    /// Total checks, wrong and correct.
    pub fn attempt_count(&self) -> u32 {
        self.wrong_count() + u32::from(self.correct_attempt.is_some())
    }
}

// ---------------------------------------------------------------------------
// Interaction trait
// ---------------------------------------------------------------------------

/// A plugin's runtime state machine.
///
/// The state is persisted as JSON in `block_progress.state`, so it must
/// round-trip through serde. Resetting is handled by the caller, which simply
/// calls [`Interaction::start`] again.
pub trait Interaction: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Validated block content this machine runs against.
    type Content;
    /// Plugin-specific actions, deserialized from `{ "type": ..., ... }`.
    type Action: DeserializeOwned;

    /// Fresh state for a learner opening the block.
    fn start(content: &Self::Content, settings: &BlockSettings, rng: &mut dyn RngCore) -> Self;

    /// Apply one action. Invalid references (e.g. an out-of-range choice)
    /// are validation errors; actions that do not apply in the current phase
    /// return [`Transition::Unchanged`].
    fn apply(
        &mut self,
        content: &Self::Content,
        action: Self::Action,
        now: Timestamp,
    ) -> Result<Transition, CoreError>;

    fn phase(&self) -> Phase;

    /// Whether there is a pending selection the learner could check.
    fn has_selection(&self) -> bool;

    /// Number of checked answers so far.
    fn attempts(&self) -> u32;

    /// Final score, available once the phase is terminal.
    fn score(&self, content: &Self::Content) -> Option<u8>;

    /// Whether persisted state still fits `content`.
    ///
    /// Authors can edit a block after learners started it. State that points
    /// at choices or pairs the content no longer has is replaced with a fresh
    /// [`Interaction::start`].
    fn is_consistent_with(&self, _content: &Self::Content) -> bool {
        true
    }

    /// Optional plugin-specific feedback for the view.
    fn feedback(&self, _content: &Self::Content) -> Option<serde_json::Value> {
        None
    }

    fn flags(&self) -> InteractionFlags {
        InteractionFlags::for_phase(self.phase(), self.has_selection())
    }
}

/// Order in which `len` items are shown to this learner.
pub fn presentation_order(
    len: usize,
    randomization: Randomization,
    rng: &mut dyn RngCore,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if randomization == Randomization::Shuffle {
        order.shuffle(rng);
    }
    order
}

/// Whether `order` contains each of `0..len` exactly once.
pub fn is_permutation_of(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    order
        .iter()
        .all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
}
