//! Async runtime around the scene state machine.
//!
//! `scene-core` is synchronous and never sleeps. This crate gives a scene a
//! home: a single worker task owns it, turns its deferred transitions into
//! tokio timers, and publishes its notifications on a topic-based bus.
//! Clients interact through the cloneable [`SceneHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - the worker itself stays internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{JumpTarget, Result, RuntimeError, SceneHandle};
pub use events::{EventBus, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};

pub use scene_core::{SceneEvent, SceneSnapshot};
