//! Actions: the individual steps of a scene.
//!
//! An [`Action`] holds only playback data (name, lifecycle state, exits and
//! delays). What the step actually does is supplied separately through an
//! [`ActionBehavior`](crate::ActionBehavior), and the lifecycle itself is
//! driven by the owning [`Scene`](crate::Scene).

mod exits;

pub use exits::ExitMap;

use std::fmt;
use std::time::Duration;

/// Stable handle of an action inside its scene.
///
/// Handles are allocated in insertion order and never reused, so they stay
/// valid when other actions are inserted before them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u32);

impl ActionId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of an action.
///
/// `Init` on creation and whenever the action is (re)activated, `Started`
/// once its on-enter hook ran, `Ended` after it ended or was quit.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionState {
    #[default]
    Init,
    Started,
    Ended,
}

/// Construction-time configuration of an action.
///
/// With the `serde` feature this deserializes from any serde format. Missing
/// fields take their defaults and unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionConfig {
    /// Unique name within the scene.
    pub name: String,
    /// Exit label → target action name.
    pub exits: ExitMap,
    /// Delay before the action starts, in milliseconds.
    pub begin_delay_ms: u64,
    /// Delay before the scene reacts to the action's end, in milliseconds.
    pub end_delay_ms: u64,
}

impl ActionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_exit(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.exits.insert(label, target);
        self
    }

    pub fn with_exits(mut self, exits: ExitMap) -> Self {
        self.exits = exits;
        self
    }

    pub fn with_begin_delay(mut self, delay: Duration) -> Self {
        self.begin_delay_ms = millis(delay);
        self
    }

    pub fn with_end_delay(mut self, delay: Duration) -> Self {
        self.end_delay_ms = millis(delay);
        self
    }
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Playback data of one step in a scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    id: ActionId,
    name: String,
    state: ActionState,
    exits: ExitMap,
    selected_exit: Option<String>,
    begin_delay: Duration,
    end_delay: Duration,
}

impl Action {
    pub(crate) fn from_config(id: ActionId, config: ActionConfig) -> Self {
        let selected_exit = config.exits.corrected_selection(None);
        Self {
            id,
            name: config.name,
            state: ActionState::Init,
            exits: config.exits,
            selected_exit,
            begin_delay: Duration::from_millis(config.begin_delay_ms),
            end_delay: Duration::from_millis(config.end_delay_ms),
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn exits(&self) -> &ExitMap {
        &self.exits
    }

    pub fn selected_exit(&self) -> Option<&str> {
        self.selected_exit.as_deref()
    }

    pub fn begin_delay(&self) -> Duration {
        self.begin_delay
    }

    pub fn end_delay(&self) -> Duration {
        self.end_delay
    }

    /// True when a non-empty exit label is selected.
    pub fn has_exit(&self) -> bool {
        self.selected_exit.as_deref().is_some_and(|label| !label.is_empty())
    }

    /// Name of the action the selected exit points to, if any.
    pub fn resolve_exit_target(&self) -> Option<&str> {
        self.selected_exit
            .as_deref()
            .and_then(|label| self.exits.target(label))
    }

    pub(crate) fn reset(&mut self) {
        self.state = ActionState::Init;
    }

    pub(crate) fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    /// Replaces the exit set and corrects the selection.
    ///
    /// Returns `true` when the selection changed.
    pub(crate) fn replace_exits(&mut self, exits: ExitMap) -> bool {
        let selected = exits.corrected_selection(self.selected_exit.as_deref());
        self.exits = exits;
        self.set_selection(selected)
    }

    /// Selects `label` as the exit. Empty labels are ignored.
    ///
    /// Returns `true` when the selection changed.
    pub(crate) fn select_exit(&mut self, label: String) -> bool {
        if label.is_empty() {
            return false;
        }
        self.set_selection(Some(label))
    }

    fn set_selection(&mut self, selected: Option<String>) -> bool {
        if self.selected_exit == selected {
            return false;
        }
        self.selected_exit = selected;
        true
    }
}
