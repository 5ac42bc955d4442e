//! Worker tasks that back the runtime orchestration.
//!
//! The scene worker owns the [`scene_core::Scene`] and is the only place its
//! state changes.

mod scene;

pub use scene::{Command, SceneWorker};
