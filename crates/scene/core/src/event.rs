//! Notifications emitted by a scene.

use crate::ActionId;

/// Observable scene notification.
///
/// Events are collected in the scene's outbox and drained by whoever drives
/// the scene (see [`Scene::drain_events`](crate::Scene::drain_events)).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SceneEvent {
    ActionAdded {
        id: ActionId,
        name: String,
        position: usize,
    },
    ActionStarted {
        id: ActionId,
        name: String,
        position: usize,
    },
    ActionEnded {
        id: ActionId,
        name: String,
    },
    /// The exit set or the selected exit of an action changed.
    ExitsChanged {
        id: ActionId,
        name: String,
    },
    /// An on-exit hook failed; playback continued regardless.
    HookFailed {
        id: ActionId,
        name: String,
        reason: String,
    },
    SceneEnded,
}

impl SceneEvent {
    /// The action this event is about, if any.
    pub fn action(&self) -> Option<ActionId> {
        match self {
            Self::ActionAdded { id, .. }
            | Self::ActionStarted { id, .. }
            | Self::ActionEnded { id, .. }
            | Self::ExitsChanged { id, .. }
            | Self::HookFailed { id, .. } => Some(*id),
            Self::SceneEnded => None,
        }
    }

    /// True for lifecycle events of individual actions.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::ActionStarted { .. } | Self::ActionEnded { .. } | Self::HookFailed { .. }
        )
    }
}
