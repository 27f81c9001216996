//! Block settings shared by every plugin type.
//!
//! Settings control playback and scoring weight, not content. Missing fields
//! take their defaults so older blocks keep deserializing.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 10;
pub const DEFAULT_WEIGHT: u8 = 1;

pub const DEFAULT_AUTO_CONTINUE_DELAY_SECS: u8 = 2;

pub const MIN_TIME_LIMIT_SECS: u32 = 5;
pub const MAX_TIME_LIMIT_SECS: u32 = 3600;

/// Whether a block renders inside the lesson flow or on its own screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Inline,
    Standalone,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStyle {
    #[default]
    Single,
    Double,
}

/// Whether choices/pairs are shown in authored order or shuffled per learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Randomization {
    #[default]
    None,
    Shuffle,
}

/// Settings stored in `blocks.settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BlockSettings {
    /// Contribution of this block to the lesson score.
    #[validate(range(min = 1, max = 10, message = "weight must be between 1 and 10"))]
    pub weight: u8,
    pub playback_mode: PlaybackMode,
    pub layout_style: LayoutStyle,
    pub randomization: Randomization,
    pub auto_continue: bool,
    #[validate(range(
        min = 1,
        max = 5,
        message = "delay_before_auto_continue must be between 1 and 5 seconds"
    ))]
    pub delay_before_auto_continue: u8,
    /// Countdown for timed questions. Untimed when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(
        min = 5,
        max = 3600,
        message = "time_limit_secs must be between 5 and 3600 seconds"
    ))]
    pub time_limit_secs: Option<u32>,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            playback_mode: PlaybackMode::default(),
            layout_style: LayoutStyle::default(),
            randomization: Randomization::default(),
            auto_continue: false,
            delay_before_auto_continue: DEFAULT_AUTO_CONTINUE_DELAY_SECS,
            time_limit_secs: None,
        }
    }
}

impl BlockSettings {
    /// Parse settings from JSON and validate ranges.
    ///
    /// `None` and `null` both yield the defaults.
    pub fn parse(raw: Option<&serde_json::Value>) -> Result<Self, CoreError> {
        let settings = match raw {
            None | Some(serde_json::Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| CoreError::Validation(format!("Invalid block settings: {e}")))?,
        };
        settings.validate()?;
        Ok(settings)
    }
}
