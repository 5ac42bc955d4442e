//! Branching scene executor.
//!
//! `scene-core` drives a directed graph of discrete actions (dialogue lines,
//! narrative beats, tutorial steps) one at a time. It supports linear
//! progression, named branch exits, history-based rollback, and forward or
//! backward jumps, and it predicts how long the default path is.
//!
//! The crate is synchronous and free of I/O:
//! - [`Scene`] owns the actions and every piece of playback state
//! - [`ActionBehavior`] is the seam where collaborators plug in what a step
//!   actually does
//! - delays come back to the caller as [`Deferred`] transitions, guarded by a
//!   [`Generation`] so stale timers cannot disturb a scene that moved on
//! - notifications accumulate as [`SceneEvent`]s until drained
//!
//! The `scene-runtime` crate wraps a scene in an async worker with real
//! timers and an event bus.
pub mod action;
pub mod behavior;
pub mod deferred;
pub mod error;
pub mod event;
pub mod scene;

pub use action::{Action, ActionConfig, ActionId, ActionState, ExitMap};
pub use behavior::{ActionBehavior, ActionContext, AutoAdvance, Passive};
pub use deferred::{Deferred, DeferredKind, Generation};
pub use error::HookError;
pub use event::SceneEvent;
pub use scene::{ActionSnapshot, EndOptions, History, Scene, SceneSnapshot};
