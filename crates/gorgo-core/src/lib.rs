//! # Gorgo Core
//!
//! Plugin host for a modular web application: a name-keyed service
//! container, a synchronous publish/subscribe event bus and a plugin manager
//! that orders plugins by priority and dependencies and drives them through
//! initialize, start and stop. The HTTP transport lives outside this crate.
pub mod config;
pub mod event;
pub mod kernel;
pub mod plugin_system;

pub use config::{AppConfig, ManagerConfig, OrderingStrategy, PluginConfig, PluginConfigs};
pub use event::{Event, EventBus, EventData, EventHandler, SystemEvent};
pub use kernel::error::Error as KernelError;
pub use kernel::{Application, Container, Context};
pub use plugin_system::{Plugin, PluginManager, PluginMetadata, PluginPriority, PluginState};

#[cfg(test)]
mod tests;
