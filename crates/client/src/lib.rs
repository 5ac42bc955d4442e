//! Terminal player for branching scenes.
//!
//! # Architecture
//!
//! ```text
//! scene-player (binary)
//!   ├─→ Script     (demo beats → scene-core Scene)
//!   ├─→ Runtime    (scene-runtime worker, timers, event bus)
//!   └─→ PlayerApp  (stdin commands → SceneHandle, events → stdout)
//! ```
//!
//! The app only talks to the scene through a [`scene_runtime::SceneHandle`],
//! so the same loop works whether beats end on their own or wait for input.

mod app;
pub mod config;
pub mod input;
pub mod script;

pub use app::{PlayerApp, Reply, render};
pub use config::PlayerConfig;
pub use input::Input;
pub use script::{Beat, Script};
