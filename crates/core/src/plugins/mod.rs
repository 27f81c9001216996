//! Lesson block plugins.
//!
//! A plugin type is a string discriminant stored in `blocks.plugin_type`.
//! Each built-in type declares its content schema, defaults, migrations and
//! interaction machine in its own module; [`factory::create_plugin`] turns
//! that declaration into a Builder/View pair and [`registry::PluginRegistry`]
//! maps the type string to it.

pub mod factory;
pub mod fill_in_the_blank;
pub mod matching_game;
pub mod multiple_choice_multiple;
pub mod multiple_choice_single;
pub mod registry;
pub mod rich_text;
pub mod true_or_false;

use serde::Serialize;
use validator::ValidationError;

pub use factory::{
    auto_submit, create_plugin, register_plugin, ContentMigration, InteractionOutcome,
    PluginBuilder, PluginDefinition, PluginSpec, PluginView, ACTION_RESET,
};
pub use registry::PluginRegistry;

// ---------------------------------------------------------------------------
// Plugin type identifiers
// ---------------------------------------------------------------------------

pub const RICH_TEXT: &str = "rich_text";
pub const TRUE_OR_FALSE: &str = "true_or_false";
pub const MULTIPLE_CHOICE_SINGLE: &str = "multiple_choice_single";
pub const MULTIPLE_CHOICE_MULTIPLE: &str = "multiple_choice_multiple";
pub const FILL_IN_THE_BLANK: &str = "fill_in_the_blank";
pub const MATCHING_GAME: &str = "matching_game";

/// Grouping shown in the block picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginCategory {
    Text,
    Quiz,
    Game,
}

/// Static description of a plugin type.
#[derive(Debug, Clone, Serialize)]
pub struct PluginMetadata {
    pub plugin_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: PluginCategory,
    /// Whether the block contributes a graded score.
    pub scored: bool,
}

// ---------------------------------------------------------------------------
// Shared content helpers
// ---------------------------------------------------------------------------

pub(crate) fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Reject empty or whitespace-only text.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "must not be blank"));
    }
    Ok(())
}

/// Move `from` to `to` in a JSON object unless `to` is already present.
pub(crate) fn rename_key(mut value: serde_json::Value, from: &str, to: &str) -> serde_json::Value {
    if let Some(obj) = value.as_object_mut() {
        if !obj.contains_key(to) {
            if let Some(v) = obj.remove(from) {
                obj.insert(to.to_string(), v);
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rename_key_moves_legacy_field() {
        let migrated = rename_key(json!({ "answer": "Paris" }), "answer", "correct_answer");
        assert_eq!(migrated, json!({ "correct_answer": "Paris" }));
    }

    #[test]
    fn rename_key_keeps_current_field() {
        let value = json!({ "answer": "old", "correct_answer": "new" });
        let migrated = rename_key(value.clone(), "answer", "correct_answer");
        assert_eq!(migrated, value);
    }

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(not_blank("   \n").is_err());
        assert!(not_blank(" x ").is_ok());
    }
}
