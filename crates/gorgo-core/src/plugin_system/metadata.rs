use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::plugin_system::traits::PluginPriority;

/// Immutable description of a plugin.
///
/// `name` is the registry key. `dependencies` lists names of plugins that
/// must already be registered when this one is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub dependencies: Vec<String>,
    pub priority: PluginPriority,
    pub tags: BTreeSet<String>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_priority(mut self, priority: PluginPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Add a dependency; duplicates are ignored
    pub fn depends_on(mut self, plugin: impl Into<String>) -> Self {
        let plugin = plugin.into();
        if !self.dependencies.contains(&plugin) {
            self.dependencies.push(plugin);
        }
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Whether `plugin` appears in this plugin's dependencies
    pub fn depends_on_plugin(&self, plugin: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == plugin)
    }
}
