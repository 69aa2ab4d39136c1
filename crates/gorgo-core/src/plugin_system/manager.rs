use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{ManagerConfig, PluginConfig, PluginConfigs};
use crate::event::{EventBus, SystemEvent};
use crate::kernel::container::Container;
use crate::kernel::context::Context;
use crate::plugin_system::error::{LifecycleHook, PluginSystemError, Result};
use crate::plugin_system::middleware::Middleware;
use crate::plugin_system::registry::{PluginRegistry, RegisteredPlugin};
use crate::plugin_system::traits::{Plugin, PluginCapabilities, PluginError, PluginState};

/// Owns the registered plugins and drives them through their lifecycle.
///
/// Every phase walks the installation order one plugin at a time and stops
/// at the first error. Plugins already handled in that phase are left as
/// they are.
pub struct PluginManager {
    container: Arc<Container>,
    event_bus: Arc<EventBus>,
    registry: RwLock<PluginRegistry>,
    config: ManagerConfig,
}

impl PluginManager {
    pub fn new(container: Arc<Container>) -> Self {
        Self::with_config(container, ManagerConfig::default())
    }

    pub fn with_config(container: Arc<Container>, config: ManagerConfig) -> Self {
        Self {
            container,
            event_bus: Arc::new(EventBus::new()),
            registry: RwLock::new(PluginRegistry::new()),
            config,
        }
    }

    /// Shared service container handed to every plugin
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Shared event bus plugins subscribe on
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Register a plugin. Its dependencies must already be registered.
    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.metadata().name.clone();
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        match registry.register_plugin(plugin) {
            Ok(_) => {
                log::info!("Registered plugin: {}", name);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to register plugin {}: {}", name, e);
                Err(e)
            }
        }
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.registry().get_plugin(name)
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.registry().has_plugin(name)
    }

    pub fn plugin_count(&self) -> usize {
        self.registry().len()
    }

    /// Capabilities probed when `name` was registered
    pub fn capabilities(&self, name: &str) -> Option<PluginCapabilities> {
        self.registry().get(name).map(|entry| entry.capabilities)
    }

    /// Plugins in installation order
    pub fn sorted_plugins(&self) -> Vec<RegisteredPlugin> {
        self.registry().sorted(self.config.ordering)
    }

    /// Plugin names in installation order
    pub fn plugin_names(&self) -> Vec<String> {
        self.sorted_plugins()
            .into_iter()
            .map(|entry| entry.metadata.name)
            .collect()
    }

    /// Current state of every plugin, in installation order
    pub fn plugin_states(&self) -> Vec<(String, PluginState)> {
        self.sorted_plugins()
            .into_iter()
            .map(|entry| {
                let state = entry.plugin.state();
                (entry.metadata.name, state)
            })
            .collect()
    }

    /// Validate, initialize and wire up every plugin in installation order.
    ///
    /// A plugin without an entry in `configs` gets an empty configuration.
    pub async fn initialize_plugins(&self, configs: &PluginConfigs) -> Result<()> {
        let plugins = self.sorted_plugins();
        log::info!("Initializing {} plugin(s)", plugins.len());

        let ctx = Context::background();
        let empty = PluginConfig::new();
        for entry in &plugins {
            let config = configs.get(entry.name()).unwrap_or(&empty);
            if let Err(e) = self.initialize_one(&ctx, entry, config).await {
                log::error!("{}", e.report());
                return Err(e);
            }
        }
        Ok(())
    }

    async fn initialize_one(
        &self,
        ctx: &Context,
        entry: &RegisteredPlugin,
        config: &PluginConfig,
    ) -> Result<()> {
        let name = entry.name();
        let plugin = entry.plugin.as_ref();

        if let Some(configurable) = entry.configurable() {
            configurable
                .validate_config(config)
                .map_err(|source| PluginSystemError::ConfigValidationFailed {
                    plugin: name.to_string(),
                    source,
                })?;
        }

        if let Some(hooks) = entry.lifecycle_hooks() {
            hooks
                .on_before_init(ctx)
                .await
                .map_err(hook_error(name, LifecycleHook::BeforeInit))?;
        }

        plugin
            .initialize(&self.container, config)
            .await
            .map_err(|source| PluginSystemError::InitializationFailed {
                plugin: name.to_string(),
                source,
            })?;

        if let Some(provider) = entry.service_provider() {
            let mut services: Vec<_> = provider.services().into_iter().collect();
            services.sort_by(|a, b| a.0.cmp(&b.0));
            for (service_name, service) in services {
                log::debug!("Plugin {} registered service {}", name, service_name);
                self.container.register_service(service_name, service);
            }
        }

        if let Some(subscriber) = entry.event_subscriber() {
            let mut subscriptions: Vec<_> = subscriber.event_subscriptions().into_iter().collect();
            subscriptions.sort_by(|a, b| a.0.cmp(&b.0));
            for (event_name, handler) in subscriptions {
                log::debug!("Plugin {} subscribed to {}", name, event_name);
                self.event_bus.subscribe(event_name, handler);
            }
        }

        if let Some(hooks) = entry.lifecycle_hooks() {
            hooks
                .on_after_init(ctx)
                .await
                .map_err(hook_error(name, LifecycleHook::AfterInit))?;
        }

        log::info!("Initialized plugin: {}", name);
        Ok(())
    }

    /// Start every plugin in installation order, announcing each on the bus
    pub async fn start_plugins(&self, ctx: &Context) -> Result<()> {
        let plugins = self.sorted_plugins();
        log::info!("Starting {} plugin(s)", plugins.len());

        for entry in &plugins {
            if let Err(e) = self.start_one(ctx, entry).await {
                log::error!("{}", e.report());
                return Err(e);
            }
        }
        Ok(())
    }

    async fn start_one(&self, ctx: &Context, entry: &RegisteredPlugin) -> Result<()> {
        let name = entry.name();
        let plugin = entry.plugin.as_ref();

        if let Some(hooks) = entry.lifecycle_hooks() {
            hooks
                .on_before_start(ctx)
                .await
                .map_err(hook_error(name, LifecycleHook::BeforeStart))?;
        }

        plugin
            .start(ctx)
            .await
            .map_err(|source| PluginSystemError::StartFailed {
                plugin: name.to_string(),
                source,
            })?;

        if let Some(hooks) = entry.lifecycle_hooks() {
            hooks
                .on_after_start(ctx)
                .await
                .map_err(hook_error(name, LifecycleHook::AfterStart))?;
        }

        self.event_bus
            .publish_system(ctx, SystemEvent::PluginStarted { plugin: name.to_string() })
            .await
            .map_err(|source| PluginSystemError::EventPublishFailed {
                plugin: name.to_string(),
                source,
            })?;

        log::info!("Started plugin: {}", name);
        Ok(())
    }

    /// Stop every plugin in reverse installation order
    pub async fn stop_plugins(&self, ctx: &Context) -> Result<()> {
        let plugins = self.sorted_plugins();
        log::info!("Stopping {} plugin(s)", plugins.len());

        for entry in plugins.iter().rev() {
            if let Err(e) = self.stop_one(ctx, entry).await {
                log::error!("{}", e.report());
                return Err(e);
            }
        }
        Ok(())
    }

    async fn stop_one(&self, ctx: &Context, entry: &RegisteredPlugin) -> Result<()> {
        let name = entry.name();
        let plugin = entry.plugin.as_ref();

        if let Some(hooks) = entry.lifecycle_hooks() {
            hooks
                .on_before_stop(ctx)
                .await
                .map_err(hook_error(name, LifecycleHook::BeforeStop))?;
        }

        plugin
            .stop(ctx)
            .await
            .map_err(|source| PluginSystemError::StopFailed {
                plugin: name.to_string(),
                source,
            })?;

        if let Some(hooks) = entry.lifecycle_hooks() {
            hooks
                .on_after_stop(ctx)
                .await
                .map_err(hook_error(name, LifecycleHook::AfterStop))?;
        }

        self.event_bus
            .publish_system(ctx, SystemEvent::PluginStopped { plugin: name.to_string() })
            .await
            .map_err(|source| PluginSystemError::EventPublishFailed {
                plugin: name.to_string(),
                source,
            })?;

        log::info!("Stopped plugin: {}", name);
        Ok(())
    }

    /// Hand a new configuration to a running plugin that supports it
    pub async fn hot_reload_plugin(&self, name: &str, new_config: &PluginConfig) -> Result<()> {
        let entry = self
            .registry()
            .get(name)
            .cloned()
            .ok_or_else(|| PluginSystemError::PluginNotFound { name: name.to_string() })?;

        let reloadable = entry
            .hot_reloadable()
            .filter(|r| r.can_hot_reload())
            .ok_or_else(|| PluginSystemError::HotReloadUnsupported { name: name.to_string() })?;

        log::info!("Hot reloading plugin: {}", name);
        reloadable
            .on_hot_reload(new_config)
            .await
            .map_err(|source| PluginSystemError::HotReloadFailed {
                plugin: name.to_string(),
                source,
            })
    }

    /// Middleware from every provider, concatenated in installation order
    pub fn get_middleware(&self) -> Vec<Middleware> {
        self.sorted_plugins()
            .iter()
            .filter_map(|entry| entry.middleware_provider())
            .flat_map(|provider| provider.middleware())
            .collect()
    }

    fn registry(&self) -> std::sync::RwLockReadGuard<'_, PluginRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new(Arc::new(Container::new()))
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.registry().registration_order())
            .field("ordering", &self.config.ordering)
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

fn hook_error(plugin: &str, hook: LifecycleHook) -> impl FnOnce(PluginError) -> PluginSystemError + '_ {
    move |source| PluginSystemError::LifecycleHookFailed {
        plugin: plugin.to_string(),
        hook,
        source,
    }
}
