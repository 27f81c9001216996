//! Lookup table from plugin type to its definition.
//!
//! The registry is built once at startup and shared read-only. There is no
//! global instance: callers construct it (usually through
//! [`PluginRegistry::with_builtin_plugins`]) and pass it where it is needed.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::CoreError;

use super::factory::{register_plugin, PluginBuilder, PluginDefinition, PluginView};
use super::fill_in_the_blank::FillInTheBlankPlugin;
use super::matching_game::MatchingGamePlugin;
use super::multiple_choice_multiple::MultipleChoiceMultiplePlugin;
use super::multiple_choice_single::MultipleChoiceSinglePlugin;
use super::rich_text::RichTextPlugin;
use super::true_or_false::TrueOrFalsePlugin;
use super::PluginMetadata;

#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    plugins: BTreeMap<&'static str, PluginDefinition>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in plugin type.
    pub fn with_builtin_plugins() -> Self {
        let mut registry = Self::new();
        register_plugin::<RichTextPlugin>(&mut registry);
        register_plugin::<TrueOrFalsePlugin>(&mut registry);
        register_plugin::<MultipleChoiceSinglePlugin>(&mut registry);
        register_plugin::<MultipleChoiceMultiplePlugin>(&mut registry);
        register_plugin::<FillInTheBlankPlugin>(&mut registry);
        register_plugin::<MatchingGamePlugin>(&mut registry);
        registry
    }

    /// Add a definition. A later registration for the same type wins.
    pub fn register(&mut self, definition: PluginDefinition) {
        let plugin_type = definition.metadata.plugin_type;
        if self.plugins.insert(plugin_type, definition).is_some() {
            tracing::warn!(plugin_type, "Plugin type registered twice, replacing");
        }
    }

    pub fn get(&self, plugin_type: &str) -> Result<&PluginDefinition, CoreError> {
        self.plugins
            .get(plugin_type)
            .ok_or_else(|| CoreError::UnknownPlugin(plugin_type.to_string()))
    }

    pub fn builder(&self, plugin_type: &str) -> Result<Arc<dyn PluginBuilder>, CoreError> {
        self.get(plugin_type).map(|d| Arc::clone(&d.builder))
    }

    pub fn view(&self, plugin_type: &str) -> Result<Arc<dyn PluginView>, CoreError> {
        self.get(plugin_type).map(|d| Arc::clone(&d.view))
    }

    pub fn contains(&self, plugin_type: &str) -> bool {
        self.plugins.contains_key(plugin_type)
    }

    /// Metadata for every registered type, ordered by type name.
    pub fn list(&self) -> Vec<&PluginMetadata> {
        self.plugins.values().map(|d| &d.metadata).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::plugins::create_plugin;
    use crate::plugins::{
        FILL_IN_THE_BLANK, MATCHING_GAME, MULTIPLE_CHOICE_MULTIPLE, MULTIPLE_CHOICE_SINGLE,
        RICH_TEXT, TRUE_OR_FALSE,
    };

    #[test]
    fn builtins_are_registered() {
        let registry = PluginRegistry::with_builtin_plugins();
        assert_eq!(registry.len(), 6);
        for plugin_type in [
            RICH_TEXT,
            TRUE_OR_FALSE,
            MULTIPLE_CHOICE_SINGLE,
            MULTIPLE_CHOICE_MULTIPLE,
            FILL_IN_THE_BLANK,
            MATCHING_GAME,
        ] {
            assert!(registry.contains(plugin_type), "{plugin_type} missing");
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = PluginRegistry::with_builtin_plugins();
        assert_matches!(
            registry.get("video_embed"),
            Err(CoreError::UnknownPlugin(t)) if t == "video_embed"
        );
        assert!(registry.view("video_embed").is_err());
    }

    #[test]
    fn list_is_sorted_by_type() {
        let registry = PluginRegistry::with_builtin_plugins();
        let types: Vec<&str> = registry.list().iter().map(|m| m.plugin_type).collect();
        let mut sorted = types.clone();
        sorted.sort_unstable();
        assert_eq!(types, sorted);
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());
        registry.register(create_plugin::<RichTextPlugin>());
        registry.register(create_plugin::<RichTextPlugin>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn every_default_content_passes_its_own_validation() {
        let registry = PluginRegistry::with_builtin_plugins();
        for metadata in registry.list() {
            let builder = registry.builder(metadata.plugin_type).unwrap();
            builder
                .prepare_content(builder.default_content())
                .unwrap_or_else(|e| panic!("{}: {e}", metadata.plugin_type));
        }
    }
}
