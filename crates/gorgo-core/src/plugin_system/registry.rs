use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use crate::config::OrderingStrategy;
use crate::plugin_system::error::{PluginSystemError, Result};
use crate::plugin_system::metadata::PluginMetadata;
use crate::plugin_system::traits::{
    Configurable, EventSubscriber, HotReloadable, LifecycleHooks, MiddlewareProvider, Plugin,
    PluginCapabilities, ServiceProvider,
};

/// A plugin as held by the registry, with its metadata and capabilities cached
#[derive(Clone)]
pub struct RegisteredPlugin {
    pub plugin: Arc<dyn Plugin>,
    pub metadata: PluginMetadata,
    pub capabilities: PluginCapabilities,
}

impl RegisteredPlugin {
    fn new(plugin: Arc<dyn Plugin>) -> Self {
        let metadata = plugin.metadata().clone();
        let capabilities = PluginCapabilities::probe(plugin.as_ref());
        Self {
            plugin,
            metadata,
            capabilities,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    // Capability lookups only reach the plugin when the registration probe
    // found the capability.

    pub fn configurable(&self) -> Option<&dyn Configurable> {
        self.capabilities
            .configurable
            .then(|| self.plugin.as_configurable())
            .flatten()
    }

    pub fn service_provider(&self) -> Option<&dyn ServiceProvider> {
        self.capabilities
            .service_provider
            .then(|| self.plugin.as_service_provider())
            .flatten()
    }

    pub fn event_subscriber(&self) -> Option<&dyn EventSubscriber> {
        self.capabilities
            .event_subscriber
            .then(|| self.plugin.as_event_subscriber())
            .flatten()
    }

    pub fn lifecycle_hooks(&self) -> Option<&dyn LifecycleHooks> {
        self.capabilities
            .lifecycle_hooks
            .then(|| self.plugin.as_lifecycle_hooks())
            .flatten()
    }

    pub fn hot_reloadable(&self) -> Option<&dyn HotReloadable> {
        self.capabilities
            .hot_reloadable
            .then(|| self.plugin.as_hot_reloadable())
            .flatten()
    }

    pub fn middleware_provider(&self) -> Option<&dyn MiddlewareProvider> {
        self.capabilities
            .middleware_provider
            .then(|| self.plugin.as_middleware_provider())
            .flatten()
    }
}

/// Registry for managing plugins
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, RegisteredPlugin>,
    /// Names in first-registration order; the base order before sorting
    registration_order: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
            registration_order: Vec::new(),
        }
    }

    /// Register a plugin.
    ///
    /// Every declared dependency must already be registered. A plugin with
    /// the same name is replaced in place and returned.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<Option<Arc<dyn Plugin>>> {
        let entry = RegisteredPlugin::new(plugin);
        let name = entry.metadata.name.clone();

        if let Some(missing) = entry
            .metadata
            .dependencies
            .iter()
            .find(|dep| !self.plugins.contains_key(dep.as_str()))
        {
            return Err(PluginSystemError::MissingDependency {
                plugin: name,
                dependency: missing.clone(),
            });
        }

        let previous = self.plugins.insert(name.clone(), entry);
        if previous.is_some() {
            log::warn!("Plugin '{}' re-registered; replacing previous instance", name);
        } else {
            self.registration_order.push(name);
        }
        Ok(previous.map(|p| p.plugin))
    }

    /// Check if a plugin is registered by name
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredPlugin> {
        self.plugins.get(name)
    }

    /// Get a plugin Arc by name
    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).map(|entry| entry.plugin.clone())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Names in registration order
    pub fn registration_order(&self) -> &[String] {
        &self.registration_order
    }

    /// Compute the installation order. Same registry contents, same order.
    pub fn sorted(&self, strategy: OrderingStrategy) -> Vec<RegisteredPlugin> {
        let base: Vec<RegisteredPlugin> = self
            .registration_order
            .iter()
            .filter_map(|name| self.plugins.get(name).cloned())
            .collect();

        match strategy {
            OrderingStrategy::PriorityPairwise => sort_priority_pairwise(base),
            OrderingStrategy::DependencyGraph => sort_dependency_graph(base),
        }
    }
}

/// Descending priority, then within each run of equal priority a plugin is
/// placed in front of the first already-placed plugin that depends on it.
///
/// Only direct dependencies between equal-priority plugins are considered.
fn sort_priority_pairwise(mut plugins: Vec<RegisteredPlugin>) -> Vec<RegisteredPlugin> {
    // Stable: registration order survives among equal priorities.
    plugins.sort_by(|a, b| b.metadata.priority.cmp(&a.metadata.priority));

    let mut sorted: Vec<RegisteredPlugin> = Vec::with_capacity(plugins.len());
    let mut run_start = 0;
    for entry in plugins {
        if sorted
            .last()
            .is_some_and(|last| last.metadata.priority != entry.metadata.priority)
        {
            run_start = sorted.len();
        }
        let offset = sorted[run_start..]
            .iter()
            .position(|placed| placed.metadata.depends_on_plugin(entry.name()))
            .map_or(sorted.len(), |i| run_start + i);
        sorted.insert(offset, entry);
    }
    sorted
}

/// Kahn's algorithm over registered dependencies. Among plugins whose
/// dependencies are all placed, the highest priority goes first, then the
/// earliest registered.
///
/// Cycles can only appear through re-registration; plugins caught in one are
/// appended in priority order.
fn sort_dependency_graph(plugins: Vec<RegisteredPlugin>) -> Vec<RegisteredPlugin> {
    let index: HashMap<&str, usize> = plugins
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name(), i))
        .collect();

    let mut in_degree = vec![0usize; plugins.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
    for (i, plugin) in plugins.iter().enumerate() {
        for dep in &plugin.metadata.dependencies {
            if let Some(&d) = index.get(dep.as_str()) {
                dependents[d].push(i);
                in_degree[i] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<(crate::plugin_system::PluginPriority, Reverse<usize>)> = plugins
        .iter()
        .enumerate()
        .filter(|(i, _)| in_degree[*i] == 0)
        .map(|(i, p)| (p.metadata.priority, Reverse(i)))
        .collect();

    let mut order: Vec<usize> = Vec::with_capacity(plugins.len());
    while let Some((_, Reverse(i))) = ready.pop() {
        order.push(i);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push((plugins[dependent].metadata.priority, Reverse(dependent)));
            }
        }
    }

    if order.len() < plugins.len() {
        let mut remaining: Vec<usize> = (0..plugins.len()).filter(|i| in_degree[*i] > 0).collect();
        remaining.sort_by(|a, b| {
            plugins[*b]
                .metadata
                .priority
                .cmp(&plugins[*a].metadata.priority)
                .then(a.cmp(b))
        });
        let names: Vec<&str> = remaining.iter().map(|i| plugins[*i].name()).collect();
        log::warn!("Dependency cycle between plugins {:?}; using priority order for them", names);
        order.extend(remaining);
    }

    let mut slots: Vec<Option<RegisteredPlugin>> = plugins.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
