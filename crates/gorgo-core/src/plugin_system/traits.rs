use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PluginConfig;
use crate::event::EventHandler;
use crate::kernel::constants;
use crate::kernel::container::{Container, Service};
use crate::kernel::context::Context;
use crate::plugin_system::metadata::PluginMetadata;
use crate::plugin_system::middleware::Middleware;

/// Error type returned by plugin-implemented operations
pub type PluginError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by plugin-implemented operations
pub type PluginResult<T = ()> = std::result::Result<T, PluginError>;

/// Installation priority. Higher values are installed (and started) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginPriority(pub i32);

impl PluginPriority {
    pub const LOW: PluginPriority = PluginPriority(constants::PRIORITY_LOW);
    pub const NORMAL: PluginPriority = PluginPriority(constants::PRIORITY_NORMAL);
    pub const HIGH: PluginPriority = PluginPriority(constants::PRIORITY_HIGH);
    pub const CRITICAL: PluginPriority = PluginPriority(constants::PRIORITY_CRITICAL);

    /// Get the numeric value of the priority
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl Default for PluginPriority {
    fn default() -> Self {
        PluginPriority::NORMAL
    }
}

impl FromStr for PluginPriority {
    type Err = String;

    /// Parse a named level ("low", "normal", "high", "critical") or a plain integer
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(PluginPriority::LOW),
            "normal" => Ok(PluginPriority::NORMAL),
            "high" => Ok(PluginPriority::HIGH),
            "critical" => Ok(PluginPriority::CRITICAL),
            other => other
                .parse::<i32>()
                .map(PluginPriority)
                .map_err(|_| format!("invalid plugin priority '{}'", s)),
        }
    }
}

impl fmt::Display for PluginPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PluginPriority::LOW => write!(f, "low"),
            PluginPriority::NORMAL => write!(f, "normal"),
            PluginPriority::HIGH => write!(f, "high"),
            PluginPriority::CRITICAL => write!(f, "critical"),
            PluginPriority(val) => write!(f, "{}", val),
        }
    }
}

/// Lifecycle state of a plugin. Each plugin records its own transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
    Starting,
    Running,
    Stopping,
    Stopped,
    Error,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluginState::Uninitialized => "uninitialized",
            PluginState::Initializing => "initializing",
            PluginState::Initialized => "initialized",
            PluginState::Starting => "starting",
            PluginState::Running => "running",
            PluginState::Stopping => "stopping",
            PluginState::Stopped => "stopped",
            PluginState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Core trait that all plugins must implement.
///
/// Optional capabilities are exposed through the `as_*` query methods. Each
/// returns `None` by default; a plugin that implements a capability trait
/// overrides the matching method with `Some(self)`. The manager probes them
/// once at registration.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Static description of the plugin. Must not have side effects.
    fn metadata(&self) -> &PluginMetadata;

    /// Initialize the plugin with the shared container and its configuration
    async fn initialize(&self, container: &Container, config: &PluginConfig) -> PluginResult;

    /// Start the plugin. Background work spawned here is owned by the plugin.
    async fn start(&self, ctx: &Context) -> PluginResult;

    /// Stop the plugin
    async fn stop(&self, ctx: &Context) -> PluginResult;

    /// Current lifecycle state
    fn state(&self) -> PluginState;

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        None
    }

    fn as_service_provider(&self) -> Option<&dyn ServiceProvider> {
        None
    }

    fn as_event_subscriber(&self) -> Option<&dyn EventSubscriber> {
        None
    }

    fn as_lifecycle_hooks(&self) -> Option<&dyn LifecycleHooks> {
        None
    }

    fn as_hot_reloadable(&self) -> Option<&dyn HotReloadable> {
        None
    }

    fn as_middleware_provider(&self) -> Option<&dyn MiddlewareProvider> {
        None
    }
}

/// Plugins that validate their configuration before initialization
pub trait Configurable: Send + Sync {
    /// Called before `initialize`; an error prevents initialization.
    fn validate_config(&self, config: &PluginConfig) -> PluginResult;

    /// Defaults a caller may merge under the user configuration
    fn default_config(&self) -> PluginConfig;
}

/// Plugins that export services into the shared container after initialization
pub trait ServiceProvider: Send + Sync {
    fn services(&self) -> HashMap<String, Service>;
}

/// Plugins that subscribe handlers on the shared event bus after initialization
pub trait EventSubscriber: Send + Sync {
    fn event_subscriptions(&self) -> HashMap<String, EventHandler>;
}

/// Callbacks surrounding each mandatory lifecycle call. All default to no-ops.
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    async fn on_before_init(&self, _ctx: &Context) -> PluginResult {
        Ok(())
    }

    async fn on_after_init(&self, _ctx: &Context) -> PluginResult {
        Ok(())
    }

    async fn on_before_start(&self, _ctx: &Context) -> PluginResult {
        Ok(())
    }

    async fn on_after_start(&self, _ctx: &Context) -> PluginResult {
        Ok(())
    }

    async fn on_before_stop(&self, _ctx: &Context) -> PluginResult {
        Ok(())
    }

    async fn on_after_stop(&self, _ctx: &Context) -> PluginResult {
        Ok(())
    }
}

/// Plugins that accept a new configuration while running
#[async_trait]
pub trait HotReloadable: Send + Sync {
    fn can_hot_reload(&self) -> bool;

    async fn on_hot_reload(&self, new_config: &PluginConfig) -> PluginResult;
}

/// Plugins that contribute HTTP middleware to the external composer
pub trait MiddlewareProvider: Send + Sync {
    fn middleware(&self) -> Vec<Middleware>;
}

/// Which optional capabilities a plugin exposes, probed once at registration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginCapabilities {
    pub configurable: bool,
    pub service_provider: bool,
    pub event_subscriber: bool,
    pub lifecycle_hooks: bool,
    pub hot_reloadable: bool,
    pub middleware_provider: bool,
}

impl PluginCapabilities {
    pub fn probe(plugin: &dyn Plugin) -> Self {
        Self {
            configurable: plugin.as_configurable().is_some(),
            service_provider: plugin.as_service_provider().is_some(),
            event_subscriber: plugin.as_event_subscriber().is_some(),
            lifecycle_hooks: plugin.as_lifecycle_hooks().is_some(),
            hot_reloadable: plugin.as_hot_reloadable().is_some(),
            middleware_provider: plugin.as_middleware_provider().is_some(),
        }
    }
}
