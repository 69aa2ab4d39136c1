//! # Gorgo Core Plugin System
//!
//! Everything a feature module needs to plug into the application and
//! everything the application needs to drive those modules.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: The [`Plugin`] contract, its [`PluginState`] machine and
//!   the optional capability traits ([`Configurable`], [`ServiceProvider`],
//!   [`EventSubscriber`], [`LifecycleHooks`], [`HotReloadable`],
//!   [`MiddlewareProvider`]).
//! - **[`metadata`]**: [`PluginMetadata`], the name, version, priority and
//!   dependencies a plugin declares.
//! - **[`base`]**: [`PluginBase`], state bookkeeping to embed in plugins.
//! - **[`middleware`]**: Opaque HTTP middleware contributed by plugins.
//! - **[`registry`]**: [`PluginRegistry`], dependency checks at registration and
//!   installation ordering.
//! - **[`manager`]**: [`PluginManager`], which runs initialize, start, stop and
//!   hot reload across every plugin.
//! - **[`error`]**: [`PluginSystemError`].
pub mod base;
pub mod error;
pub mod manager;
pub mod metadata;
pub mod middleware;
pub mod registry;
pub mod traits;

pub use base::PluginBase;
pub use error::{LifecycleHook, PluginSystemError};
pub use manager::PluginManager;
pub use metadata::PluginMetadata;
pub use middleware::{HandlerFn, Middleware, compose};
pub use registry::{PluginRegistry, RegisteredPlugin};
pub use traits::{
    Configurable, EventSubscriber, HotReloadable, LifecycleHooks, MiddlewareProvider, Plugin,
    PluginCapabilities, PluginError, PluginPriority, PluginResult, PluginState, ServiceProvider,
};
