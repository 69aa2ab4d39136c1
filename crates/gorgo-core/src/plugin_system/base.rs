use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::config::PluginConfig;
use crate::kernel::container::Container;
use crate::kernel::context::Context;
use crate::plugin_system::metadata::PluginMetadata;
use crate::plugin_system::traits::{Plugin, PluginResult, PluginState};

/// Reusable metadata and state bookkeeping for plugin implementations.
///
/// Embed it and delegate: a plugin's own `initialize`/`start`/`stop` do their
/// work and then call the base method, which records the successful
/// transition. `PluginBase` on its own is a valid no-op plugin.
#[derive(Debug)]
pub struct PluginBase {
    metadata: PluginMetadata,
    state: RwLock<PluginState>,
}

impl PluginBase {
    pub fn new(metadata: PluginMetadata) -> Self {
        Self {
            metadata,
            state: RwLock::new(PluginState::Uninitialized),
        }
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn state(&self) -> PluginState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an arbitrary transition, e.g. `Error` after a failed start
    pub fn set_state(&self, state: PluginState) {
        let mut current = self.state.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!("Plugin '{}' state {} -> {}", self.metadata.name, *current, state);
        *current = state;
    }

    pub fn mark_initialized(&self) {
        self.set_state(PluginState::Initialized);
    }

    pub fn mark_running(&self) {
        self.set_state(PluginState::Running);
    }

    pub fn mark_stopped(&self) {
        self.set_state(PluginState::Stopped);
    }
}

#[async_trait]
impl Plugin for PluginBase {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn initialize(&self, _container: &Container, _config: &PluginConfig) -> PluginResult {
        self.mark_initialized();
        Ok(())
    }

    async fn start(&self, _ctx: &Context) -> PluginResult {
        self.mark_running();
        Ok(())
    }

    async fn stop(&self, _ctx: &Context) -> PluginResult {
        self.mark_stopped();
        Ok(())
    }

    fn state(&self) -> PluginState {
        PluginBase::state(self)
    }
}
