//! # Gorgo Core Kernel
//!
//! The `kernel` module holds the pieces every plugin shares and the
//! application that ties them together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application)
//!   registers plugins and runs them through start and shutdown.
//! - **Dependency Container**: [`Container`](container::Container), the
//!   name-keyed service registry plugins export into and resolve from.
//! - **Cancellation Context**: [`Context`](context::Context), passed to every
//!   lifecycle call and event handler.
//! - **Core Constants**: well-known event names, data keys and priority
//!   levels in the `constants` submodule.
//! - **Error Handling**: the crate-level [`Error`](error::Error) and a
//!   `Result` alias in the `error` submodule.
pub mod bootstrap;
pub mod constants;
pub mod container;
pub mod context;
pub mod error;

pub use bootstrap::Application;
pub use container::{Container, Service};
pub use context::Context;
pub use error::{ContainerError, Error, KernelLifecyclePhase, Result};
