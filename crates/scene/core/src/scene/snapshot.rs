//! Read-only copies of scene playback state.

use crate::ActionState;

/// Point-in-time view of a scene, detached from its behaviours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneSnapshot {
    pub progress: usize,
    pub max_progress: usize,
    /// Name of the activated action, if playback has begun.
    pub current: Option<String>,
    /// History entries as names, oldest first.
    pub history: Vec<String>,
    pub ended: bool,
    pub predicted_length: usize,
    /// Every action in scene order.
    pub actions: Vec<ActionSnapshot>,
}

impl SceneSnapshot {
    pub fn action(&self, name: &str) -> Option<&ActionSnapshot> {
        self.actions.iter().find(|action| action.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSnapshot {
    pub name: String,
    pub state: ActionState,
    pub selected_exit: Option<String>,
}
