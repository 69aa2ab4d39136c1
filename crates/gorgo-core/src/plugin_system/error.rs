//! # Gorgo Core Plugin System Errors
//!
//! Defines [`PluginSystemError`], returned by every
//! [`PluginManager`](crate::plugin_system::PluginManager) operation.
//!
//! Lifecycle variants carry the offending plugin's name and keep the error
//! the plugin returned as their `source`. Their message names the plugin
//! only; walk the chain (or use [`PluginSystemError::report`]) for the cause.
use std::error::Error as StdError;
use std::fmt;

use crate::event::error::EventSystemError;
use crate::plugin_system::traits::PluginError;

/// Which lifecycle hook failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    BeforeInit,
    AfterInit,
    BeforeStart,
    AfterStart,
    BeforeStop,
    AfterStop,
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleHook::BeforeInit => "on_before_init",
            LifecycleHook::AfterInit => "on_after_init",
            LifecycleHook::BeforeStart => "on_before_start",
            LifecycleHook::AfterStart => "on_after_start",
            LifecycleHook::BeforeStop => "on_before_stop",
            LifecycleHook::AfterStop => "on_after_stop",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("dependency {dependency} not found for plugin {plugin}")]
    MissingDependency { plugin: String, dependency: String },

    #[error("invalid configuration for plugin {plugin}")]
    ConfigValidationFailed {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("lifecycle hook {hook} failed for plugin {plugin}")]
    LifecycleHookFailed {
        plugin: String,
        hook: LifecycleHook,
        #[source]
        source: PluginError,
    },

    #[error("failed to initialize plugin {plugin}")]
    InitializationFailed {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("failed to start plugin {plugin}")]
    StartFailed {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("failed to stop plugin {plugin}")]
    StopFailed {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("failed to publish lifecycle event for plugin {plugin}")]
    EventPublishFailed {
        plugin: String,
        #[source]
        source: EventSystemError,
    },

    #[error("plugin {name} not found")]
    PluginNotFound { name: String },

    #[error("plugin {name} does not support hot reload")]
    HotReloadUnsupported { name: String },

    /// Displays the plugin's own error unchanged
    #[error("{source}")]
    HotReloadFailed {
        plugin: String,
        #[source]
        source: PluginError,
    },
}

impl PluginSystemError {
    /// The message followed by every cause in the chain, `: `-separated.
    ///
    /// A cause whose text the report already ends with is not repeated.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut cause = StdError::source(self);
        while let Some(err) = cause {
            let text = err.to_string();
            if !report.ends_with(&text) {
                report.push_str(": ");
                report.push_str(&text);
            }
            cause = err.source();
        }
        report
    }

    /// Name of the plugin the error is about
    pub fn plugin_name(&self) -> &str {
        match self {
            PluginSystemError::MissingDependency { plugin, .. }
            | PluginSystemError::ConfigValidationFailed { plugin, .. }
            | PluginSystemError::LifecycleHookFailed { plugin, .. }
            | PluginSystemError::InitializationFailed { plugin, .. }
            | PluginSystemError::StartFailed { plugin, .. }
            | PluginSystemError::StopFailed { plugin, .. }
            | PluginSystemError::EventPublishFailed { plugin, .. }
            | PluginSystemError::HotReloadFailed { plugin, .. } => plugin,
            PluginSystemError::PluginNotFound { name }
            | PluginSystemError::HotReloadUnsupported { name } => name,
        }
    }
}

/// Shorthand for Result with [`PluginSystemError`]
pub type Result<T> = std::result::Result<T, PluginSystemError>;
