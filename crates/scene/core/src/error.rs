//! Errors surfaced by action hooks.
//!
//! The scene never propagates these. A failing on-exit hook is logged,
//! reported through [`SceneEvent::HookFailed`](crate::SceneEvent::HookFailed),
//! and otherwise treated like a successful one so the chain of actions keeps
//! advancing.

use std::any::Any;

use thiserror::Error;

/// Failure reported by an [`ActionBehavior`](crate::ActionBehavior) hook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error("hook panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::Panicked(message)
    }
}
