//! # Gorgo Core Kernel Errors
//!
//! Defines the crate-level [`Error`] type and the errors raised by the
//! dependency [`Container`](crate::kernel::container::Container).
//!
//! Subsystems keep their own typed errors ([`PluginSystemError`],
//! [`EventSystemError`], [`ConfigError`]); `Error` aggregates them with
//! `#[from]` so callers driving a whole [`Application`](crate::kernel::Application)
//! can use a single `Result` type.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::event::error::EventSystemError;
use crate::plugin_system::error::PluginSystemError;

/// Errors raised by the dependency container.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ContainerError {
    /// No service is registered under the requested name.
    #[error("service {name} not found")]
    ServiceNotFound { name: String },

    /// A service exists but it is not of the requested type.
    #[error("service {name} is not of type {expected}")]
    InvalidTarget {
        name: String,
        expected: &'static str,
    },
}

/// Crate-level error type
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Event system error
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// Dependency container error
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Configuration decoding error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurring during a specific application lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },
}

/// Represents a specific phase in the application's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Initialize")]
    Initialize,
    #[error("Start")]
    Start,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
