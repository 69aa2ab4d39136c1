use std::sync::Arc;

use crate::config::{AppConfig, PluginConfig};
use crate::event::{EventBus, SystemEvent};
use crate::kernel::constants;
use crate::kernel::container::Container;
use crate::kernel::context::Context;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::{Middleware, Plugin, PluginManager};

/// Main application struct: one container, one plugin manager, one configuration.
///
/// The transport is not part of the core. [`Application::start`] hands back
/// the plugin middleware so the caller can build its HTTP stack, and the
/// caller publishes `server.started` itself once it is listening.
pub struct Application {
    container: Arc<Container>,
    plugin_manager: Arc<PluginManager>,
    config: AppConfig,
    started: bool,
}

impl Application {
    /// Creates an application with the default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        log::info!("Creating {} v{}", config.app.name, config.app.version);
        let container = Arc::new(Container::new());
        let plugin_manager = Arc::new(PluginManager::with_config(
            container.clone(),
            config.manager.clone(),
        ));
        Self {
            container,
            plugin_manager,
            config,
            started: false,
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn plugin_manager(&self) -> &Arc<PluginManager> {
        &self.plugin_manager
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        self.plugin_manager.event_bus()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns whether [`start`](Self::start) has completed successfully
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Register a plugin, builder style. A rejected plugin is logged and skipped.
    pub fn add_plugin(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        let name = plugin.metadata().name.clone();
        if let Err(e) = self.plugin_manager.register_plugin(plugin) {
            log::warn!("Skipping plugin {}: {}", name, e);
        }
        self
    }

    /// Register a plugin and report why it was rejected
    pub fn try_add_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.plugin_manager.register_plugin(plugin)?;
        Ok(())
    }

    /// Initialize and start every plugin, then announce `app.starting`.
    ///
    /// Returns the middleware contributed by plugins, in installation order.
    /// Any error means the application must not serve traffic. A failing
    /// `app.starting` handler is only logged.
    pub async fn start(&mut self, ctx: &Context) -> Result<Vec<Middleware>> {
        if self.started {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Start,
                message: "Application already started".to_string(),
                source: None,
            });
        }

        log::info!("Starting {} v{}", self.config.app.name, self.config.app.version);
        self.plugin_manager
            .initialize_plugins(&self.config.plugins)
            .await?;
        let middleware = self.plugin_manager.get_middleware();
        log::debug!("Collected {} middleware", middleware.len());

        self.plugin_manager.start_plugins(ctx).await?;
        self.started = true;

        // Plugins are running from here on; a failing listener cannot undo that
        if let Err(e) = self
            .event_bus()
            .publish_system(
                ctx,
                SystemEvent::AppStarting {
                    name: self.config.app.name.clone(),
                    version: self.config.app.version.clone(),
                },
            )
            .await
        {
            log::error!("Error publishing {}: {}", constants::EVENT_APP_STARTING, e);
        }

        log::info!("{} started", self.config.app.name);
        Ok(middleware)
    }

    /// Announce `app.stopping`, then stop every plugin in reverse order.
    ///
    /// A failing `app.stopping` handler is logged and does not prevent
    /// stopping. A stop failure is logged and returned.
    pub async fn shutdown(&mut self, ctx: &Context) -> Result<()> {
        log::info!("Shutting down {}", self.config.app.name);

        if let Err(e) = self
            .event_bus()
            .publish_system(ctx, SystemEvent::AppStopping)
            .await
        {
            log::error!("Error publishing {}: {}", constants::EVENT_APP_STOPPING, e);
        }

        self.started = false;
        if let Err(e) = self.plugin_manager.stop_plugins(ctx).await {
            log::error!("Error stopping plugins: {}", e.report());
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Shutdown,
                message: "Plugins failed to stop".to_string(),
                source: Some(Box::new(Error::from(e))),
            });
        }

        log::info!("{} stopped", self.config.app.name);
        Ok(())
    }

    pub async fn hot_reload_plugin(&self, name: &str, config: &PluginConfig) -> Result<()> {
        self.plugin_manager.hot_reload_plugin(name, config).await?;
        Ok(())
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
