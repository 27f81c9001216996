//! Rich text block. Completes when the learner continues past it.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::interaction::{Interaction, InteractionFlags, Phase, Transition};
use crate::scoring::MAX_SCORE;
use crate::settings::BlockSettings;
use crate::types::Timestamp;

use super::{
    not_blank, rename_key, ContentMigration, PluginCategory, PluginMetadata, PluginSpec, RICH_TEXT,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RichTextContent {
    /// Serialized editor document.
    #[validate(custom(function = "not_blank"))]
    pub rich_text_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextAction {
    Continue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextState {
    pub continued_at: Option<Timestamp>,
}

impl Interaction for RichTextState {
    type Content = RichTextContent;
    type Action = RichTextAction;

    fn start(_content: &Self::Content, _settings: &BlockSettings, _rng: &mut dyn RngCore) -> Self {
        Self::default()
    }

    fn apply(
        &mut self,
        _content: &Self::Content,
        action: Self::Action,
        now: Timestamp,
    ) -> Result<Transition, CoreError> {
        match action {
            RichTextAction::Continue if self.continued_at.is_none() => {
                self.continued_at = Some(now);
                Ok(Transition::Changed)
            }
            RichTextAction::Continue => Ok(Transition::Unchanged),
        }
    }

    fn phase(&self) -> Phase {
        if self.continued_at.is_some() {
            Phase::Correct
        } else {
            Phase::Answering
        }
    }

    fn has_selection(&self) -> bool {
        false
    }

    fn attempts(&self) -> u32 {
        0
    }

    fn score(&self, _content: &Self::Content) -> Option<u8> {
        self.continued_at.map(|_| MAX_SCORE)
    }

    fn flags(&self) -> InteractionFlags {
        match self.phase() {
            Phase::Answering => InteractionFlags {
                show_continue_button: true,
                can_interact: true,
                ..InteractionFlags::default()
            },
            _ => InteractionFlags::default(),
        }
    }
}

fn migrate_content_key(value: serde_json::Value) -> serde_json::Value {
    rename_key(value, "content", "rich_text_state")
}

static MIGRATIONS: &[ContentMigration] = &[ContentMigration {
    name: "content_to_rich_text_state",
    migrate: migrate_content_key,
}];

pub struct RichTextPlugin;

impl PluginSpec for RichTextPlugin {
    const PLUGIN_TYPE: &'static str = RICH_TEXT;
    const SUPPORTS_CHECK: bool = false;

    type Content = RichTextContent;
    type Interaction = RichTextState;

    fn metadata() -> PluginMetadata {
        PluginMetadata {
            plugin_type: RICH_TEXT,
            name: "Rich Text",
            description: "Formatted text, images and links",
            category: PluginCategory::Text,
            scored: false,
        }
    }

    fn default_content() -> Self::Content {
        RichTextContent {
            rich_text_state: "Start typing...".into(),
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

    fn content() -> RichTextContent {
        RichTextPlugin::default_content()
    }

    #[test]
    fn continue_completes_with_full_score() {
        let mut state =
            RichTextState::start(&content(), &BlockSettings::default(), &mut rand::rng());
        assert!(state.flags().show_continue_button);
        assert_eq!(state.score(&content()), None);

        let first = state
            .apply(&content(), RichTextAction::Continue, Utc::now())
            .unwrap();
        assert_eq!(first, Transition::Changed);
        assert_eq!(state.score(&content()), Some(100));
        assert!(state.phase().is_terminal());

        let second = state
            .apply(&content(), RichTextAction::Continue, Utc::now())
            .unwrap();
        assert_eq!(second, Transition::Unchanged);
    }

    #[test]
    fn legacy_content_key_migrates() {
        let migrated = migrate_content_key(json!({ "content": "<p>Hi</p>" }));
        assert_eq!(migrated, json!({ "rich_text_state": "<p>Hi</p>" }));
    }

    #[test]
    fn blank_text_is_invalid() {
        let c = RichTextContent {
            rich_text_state: " ".into(),
        };
        assert!(c.validate().is_err());
    }
}
