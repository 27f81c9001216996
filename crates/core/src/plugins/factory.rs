//! Turns a typed plugin declaration into a type-erased Builder/View pair.
//!
//! Plugins implement [`PluginSpec`] with concrete content and interaction
//! types. [`create_plugin`] wraps them so the registry, the database layer
//! and the HTTP handlers can work purely in `serde_json::Value`.

use std::marker::PhantomData;
use std::sync::Arc;

use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::error::CoreError;
use crate::interaction::{Interaction, InteractionFlags, Phase};
use crate::settings::BlockSettings;
use crate::types::Timestamp;

use super::{PluginMetadata, PluginRegistry};

/// Action type understood by every plugin: start over from scratch.
pub const ACTION_RESET: &str = "reset";

/// Action submitted when a timed question runs out.
pub const ACTION_CHECK_ANSWER: &str = "check_answer";

/// Pure rewrite from an older content shape to the current one.
///
/// Migrations run in declaration order and must leave current-shape content
/// untouched.
#[derive(Debug, Clone, Copy)]
pub struct ContentMigration {
    pub name: &'static str,
    pub migrate: fn(Value) -> Value,
}

/// Declarative plugin configuration.
pub trait PluginSpec: Send + Sync + 'static {
    const PLUGIN_TYPE: &'static str;

    /// Whether `check_answer` means anything for this plugin. Timed
    /// auto-submit is skipped when it does not.
    const SUPPORTS_CHECK: bool = true;

    type Content: Serialize + DeserializeOwned + Validate + Send + Sync;
    type Interaction: Interaction<Content = Self::Content>;

    fn metadata() -> PluginMetadata;

    fn default_content() -> Self::Content;

    fn migrations() -> &'static [ContentMigration] {
        &[]
    }
}

/// Result of resolving or advancing a block's interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub plugin_type: String,
    /// Serialized machine state, persisted to `block_progress.state`.
    pub state: Value,
    pub phase: Phase,
    pub flags: InteractionFlags,
    /// Set once the block is complete.
    pub score: Option<u8>,
    pub attempts: u32,
    pub is_complete: bool,
    /// Whether the action mutated the state.
    pub changed: bool,
    pub feedback: Option<Value>,
}

/// Authoring side of a plugin.
pub trait PluginBuilder: Send + Sync {
    fn default_content(&self) -> Value;

    fn default_settings(&self) -> Value;

    /// Run migrations, then parse and validate. Returns normalized content.
    fn prepare_content(&self, raw: Value) -> Result<Value, CoreError>;

    /// Parse and validate block settings. Returns normalized settings.
    fn validate_settings(&self, raw: Option<&Value>) -> Result<Value, CoreError>;
}

/// Learner side of a plugin.
pub trait PluginView: Send + Sync {
    fn supports_check(&self) -> bool;

    /// Current outcome for persisted `state`, or a fresh start when there is
    /// none, it no longer matches the plugin's state shape, or it refers to
    /// content that has since been edited away.
    fn snapshot(
        &self,
        content: &Value,
        settings: &Value,
        state: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<InteractionOutcome, CoreError>;

    /// Apply one action (`{ "type": ..., ... }`) to the current state.
    fn interact(
        &self,
        content: &Value,
        settings: &Value,
        state: Option<&Value>,
        action: &Value,
        now: Timestamp,
        rng: &mut dyn RngCore,
    ) -> Result<InteractionOutcome, CoreError>;
}

/// Registry entry: metadata plus the Builder/View pair.
#[derive(Clone)]
pub struct PluginDefinition {
    pub metadata: PluginMetadata,
    pub builder: Arc<dyn PluginBuilder>,
    pub view: Arc<dyn PluginView>,
}

impl std::fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Build the definition for `P`.
pub fn create_plugin<P: PluginSpec>() -> PluginDefinition {
    let plugin = Arc::new(TypedPlugin::<P>(PhantomData));
    PluginDefinition {
        metadata: P::metadata(),
        builder: plugin.clone(),
        view: plugin,
    }
}

/// Create the definition for `P` and add it to `registry`.
pub fn register_plugin<P: PluginSpec>(registry: &mut PluginRegistry) {
    registry.register(create_plugin::<P>());
}

/// Submit the current selection of a timed question.
///
/// Plugins without a check step return their current snapshot unchanged.
pub fn auto_submit(
    view: &dyn PluginView,
    content: &Value,
    settings: &Value,
    state: Option<&Value>,
    now: Timestamp,
    rng: &mut dyn RngCore,
) -> Result<InteractionOutcome, CoreError> {
    if !view.supports_check() {
        return view.snapshot(content, settings, state, rng);
    }
    let action = json!({ "type": ACTION_CHECK_ANSWER });
    view.interact(content, settings, state, &action, now, rng)
}

// ---------------------------------------------------------------------------
// Typed adapter
// ---------------------------------------------------------------------------

struct TypedPlugin<P>(PhantomData<fn() -> P>);

impl<P: PluginSpec> TypedPlugin<P> {
    fn migrate(raw: Value) -> Value {
        P::migrations()
            .iter()
            .fold(raw, |value, migration| (migration.migrate)(value))
    }

    fn load_content(raw: &Value) -> Result<P::Content, CoreError> {
        let migrated = Self::migrate(raw.clone());
        let content: P::Content = serde_json::from_value(migrated).map_err(|e| {
            CoreError::Validation(format!("Invalid {} content: {e}", P::PLUGIN_TYPE))
        })?;
        content.validate()?;
        Ok(content)
    }

    fn resolve_state(
        content: &P::Content,
        settings: &BlockSettings,
        state: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> P::Interaction {
        match state {
            Some(value) if !value.is_null() => {
                match serde_json::from_value::<P::Interaction>(value.clone()) {
                    Ok(existing) if existing.is_consistent_with(content) => existing,
                    Ok(_) => {
                        tracing::debug!(
                            plugin_type = P::PLUGIN_TYPE,
                            "Stored interaction state no longer matches content, restarting"
                        );
                        <P::Interaction as Interaction>::start(content, settings, rng)
                    }
                    Err(e) => {
                        tracing::debug!(
                            plugin_type = P::PLUGIN_TYPE,
                            error = %e,
                            "Discarding stale interaction state"
                        );
                        <P::Interaction as Interaction>::start(content, settings, rng)
                    }
                }
            }
            _ => <P::Interaction as Interaction>::start(content, settings, rng),
        }
    }

    fn outcome(
        content: &P::Content,
        interaction: &P::Interaction,
        changed: bool,
    ) -> Result<InteractionOutcome, CoreError> {
        let state = serde_json::to_value(interaction)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize state: {e}")))?;
        let phase = interaction.phase();
        Ok(InteractionOutcome {
            plugin_type: P::PLUGIN_TYPE.to_string(),
            state,
            phase,
            flags: interaction.flags(),
            score: interaction.score(content),
            attempts: interaction.attempts(),
            is_complete: phase.is_terminal(),
            changed,
            feedback: interaction.feedback(content),
        })
    }
}

impl<P: PluginSpec> PluginBuilder for TypedPlugin<P> {
    fn default_content(&self) -> Value {
        serde_json::to_value(P::default_content()).unwrap_or(Value::Null)
    }

    fn default_settings(&self) -> Value {
        serde_json::to_value(BlockSettings::default()).unwrap_or(Value::Null)
    }

    fn prepare_content(&self, raw: Value) -> Result<Value, CoreError> {
        let content = Self::load_content(&raw)?;
        serde_json::to_value(content)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize content: {e}")))
    }

    fn validate_settings(&self, raw: Option<&Value>) -> Result<Value, CoreError> {
        let settings = BlockSettings::parse(raw)?;
        serde_json::to_value(settings)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize settings: {e}")))
    }
}

impl<P: PluginSpec> PluginView for TypedPlugin<P> {
    fn supports_check(&self) -> bool {
        P::SUPPORTS_CHECK
    }

    fn snapshot(
        &self,
        content: &Value,
        settings: &Value,
        state: Option<&Value>,
        rng: &mut dyn RngCore,
    ) -> Result<InteractionOutcome, CoreError> {
        let content = Self::load_content(content)?;
        let settings = BlockSettings::parse(Some(settings))?;
        let interaction = Self::resolve_state(&content, &settings, state, rng);
        Self::outcome(&content, &interaction, false)
    }

    fn interact(
        &self,
        content: &Value,
        settings: &Value,
        state: Option<&Value>,
        action: &Value,
        now: Timestamp,
        rng: &mut dyn RngCore,
    ) -> Result<InteractionOutcome, CoreError> {
        let content = Self::load_content(content)?;
        let settings = BlockSettings::parse(Some(settings))?;

        if action.get("type").and_then(Value::as_str) == Some(ACTION_RESET) {
            let fresh = <P::Interaction as Interaction>::start(&content, &settings, rng);
            return Self::outcome(&content, &fresh, true);
        }

        let action: <P::Interaction as Interaction>::Action =
            serde_json::from_value(action.clone()).map_err(|e| {
                CoreError::Validation(format!("Invalid {} action: {e}", P::PLUGIN_TYPE))
            })?;

        let mut interaction = Self::resolve_state(&content, &settings, state, rng);
        let transition = interaction.apply(&content, action, now)?;
        Self::outcome(&content, &interaction, transition.changed())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::plugins::fill_in_the_blank::FillInTheBlankPlugin;
    use crate::plugins::matching_game::MatchingGamePlugin;
    use crate::plugins::multiple_choice_single::MultipleChoiceSinglePlugin;
    use crate::plugins::rich_text::RichTextPlugin;

    fn fill_in_blank_content() -> Value {
        json!({ "question": "Capital of Kenya?", "correct_answer": "Nairobi" })
    }

    #[test]
    fn builder_applies_migrations_before_validation() {
        let plugin = create_plugin::<FillInTheBlankPlugin>();
        let prepared = plugin
            .builder
            .prepare_content(json!({ "question": "Capital of Kenya?", "answer": "Nairobi" }))
            .unwrap();
        assert_eq!(prepared["correct_answer"], "Nairobi");
        assert_eq!(prepared["case_sensitive"], false);
    }

    #[test]
    fn builder_rejects_invalid_content() {
        let plugin = create_plugin::<FillInTheBlankPlugin>();
        let err = plugin
            .builder
            .prepare_content(json!({ "question": "Q", "correct_answer": "   " }))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn default_content_is_valid_json_object() {
        let plugin = create_plugin::<RichTextPlugin>();
        assert!(plugin.builder.default_content().is_object());
        assert_eq!(plugin.builder.default_settings()["weight"], 1);
    }

    #[test]
    fn view_starts_fresh_without_state() {
        let plugin = create_plugin::<FillInTheBlankPlugin>();
        let outcome = plugin
            .view
            .snapshot(&fill_in_blank_content(), &json!({}), None, &mut rand::rng())
            .unwrap();
        assert_eq!(outcome.phase, Phase::Answering);
        assert!(!outcome.changed);
        assert!(outcome.score.is_none());
    }

    #[test]
    fn stale_state_is_replaced() {
        let plugin = create_plugin::<FillInTheBlankPlugin>();
        let outcome = plugin
            .view
            .snapshot(
                &fill_in_blank_content(),
                &json!({}),
                Some(&json!({ "legacy": true })),
                &mut rand::rng(),
            )
            .unwrap();
        assert_eq!(outcome.attempts, 0);
    }

    fn choices(correct: usize, total: usize) -> Value {
        let choices: Vec<Value> = (0..total)
            .map(|i| json!({ "choice_state": format!("Option {i}"), "is_correct": i == correct }))
            .collect();
        json!({ "question": "Pick one", "choices": choices })
    }

    #[test]
    fn state_for_edited_choices_restarts() {
        let plugin = create_plugin::<MultipleChoiceSinglePlugin>();
        let mut rng = rand::rng();
        let selected = plugin
            .view
            .interact(
                &choices(0, 4),
                &json!({}),
                None,
                &json!({ "type": "select", "choice_index": 3 }),
                Utc::now(),
                &mut rng,
            )
            .unwrap();

        let checked = plugin
            .view
            .interact(
                &choices(0, 2),
                &json!({}),
                Some(&selected.state),
                &json!({ "type": "check_answer" }),
                Utc::now(),
                &mut rng,
            )
            .unwrap();
        assert!(!checked.changed);
        assert_eq!(checked.phase, Phase::Answering);
        assert_eq!(checked.attempts, 0);
        assert_eq!(checked.state["selected"], Value::Null);
        assert_eq!(checked.state["display_order"], json!([0, 1]));
    }

    #[test]
    fn matching_progress_for_replaced_pairs_restarts() {
        let plugin = create_plugin::<MatchingGamePlugin>();
        let pairs = |ids: &[&str]| {
            let pairs: Vec<Value> = ids
                .iter()
                .map(|id| json!({ "id": id, "left_content": id, "right_content": id }))
                .collect();
            json!({ "question": "Match", "pairs": pairs })
        };
        let original = pairs(&["a", "b", "c"]);
        let mut rng = rand::rng();
        let mut state = None;
        for id in ["a", "b"] {
            for action in [
                json!({ "type": "select_left", "pair_id": id }),
                json!({ "type": "select_right", "pair_id": id }),
            ] {
                let outcome = plugin
                    .view
                    .interact(
                        &original,
                        &json!({}),
                        state.as_ref(),
                        &action,
                        Utc::now(),
                        &mut rng,
                    )
                    .unwrap();
                state = Some(outcome.state);
            }
        }

        let snapshot = plugin
            .view
            .snapshot(&pairs(&["x", "y"]), &json!({}), state.as_ref(), &mut rng)
            .unwrap();
        assert_eq!(snapshot.phase, Phase::Answering);
        assert_eq!(snapshot.state["matched_pair_ids"], json!([]));
        let feedback = snapshot.feedback.unwrap();
        assert_eq!(feedback["remaining_pairs"], 2);
    }

    #[test]
    fn unknown_action_is_validation_error() {
        let plugin = create_plugin::<FillInTheBlankPlugin>();
        let err = plugin
            .view
            .interact(
                &fill_in_blank_content(),
                &json!({}),
                None,
                &json!({ "type": "dance" }),
                Utc::now(),
                &mut rand::rng(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("fill_in_the_blank"));
    }

    #[test]
    fn reset_returns_fresh_state() {
        let plugin = create_plugin::<FillInTheBlankPlugin>();
        let content = fill_in_blank_content();
        let mut rng = rand::rng();
        let typed = plugin
            .view
            .interact(
                &content,
                &json!({}),
                None,
                &json!({ "type": "input", "value": "Mombasa" }),
                Utc::now(),
                &mut rng,
            )
            .unwrap();
        let checked = plugin
            .view
            .interact(
                &content,
                &json!({}),
                Some(&typed.state),
                &json!({ "type": "check_answer" }),
                Utc::now(),
                &mut rng,
            )
            .unwrap();
        assert_eq!(checked.attempts, 1);

        let reset = plugin
            .view
            .interact(
                &content,
                &json!({}),
                Some(&checked.state),
                &json!({ "type": "reset" }),
                Utc::now(),
                &mut rng,
            )
            .unwrap();
        assert!(reset.changed);
        assert_eq!(reset.attempts, 0);
        assert!(reset.flags.can_interact);
    }

    #[test]
    fn auto_submit_checks_current_input() {
        let plugin = create_plugin::<FillInTheBlankPlugin>();
        let content = fill_in_blank_content();
        let mut rng = rand::rng();
        let typed = plugin
            .view
            .interact(
                &content,
                &json!({}),
                None,
                &json!({ "type": "input", "value": "nairobi" }),
                Utc::now(),
                &mut rng,
            )
            .unwrap();

        let outcome = auto_submit(
            plugin.view.as_ref(),
            &content,
            &json!({}),
            Some(&typed.state),
            Utc::now(),
            &mut rng,
        )
        .unwrap();
        assert!(outcome.is_complete);
        assert_eq!(outcome.score, Some(100));
    }

    #[test]
    fn auto_submit_without_check_step_is_snapshot() {
        let plugin = create_plugin::<RichTextPlugin>();
        let outcome = auto_submit(
            plugin.view.as_ref(),
            &json!({ "rich_text_state": "Hello" }),
            &json!({}),
            None,
            Utc::now(),
            &mut rand::rng(),
        )
        .unwrap();
        assert!(!outcome.changed);
        assert!(!outcome.is_complete);
    }
}
