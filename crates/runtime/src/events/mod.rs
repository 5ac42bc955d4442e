//! Topic-based event bus for scene notifications.
//!
//! Scene events are published to topics, and consumers subscribe only to the
//! topics they need.

mod bus;

pub use bus::{EventBus, Topic};
