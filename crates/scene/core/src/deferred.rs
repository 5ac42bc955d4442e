//! Delayed transitions handed to the caller instead of being slept on.
//!
//! The scene itself never waits. Whenever a begin delay, an end delay, or a
//! hook-requested timer is involved, it records a [`Deferred`] and the driver
//! (the async runtime, or a test) hands it back through
//! [`Scene::fire`](crate::Scene::fire) once the delay elapsed.
//!
//! Every deferred transition carries the [`Generation`] it was scheduled
//! under. Activations, resets and quitting bump the scene's generation, so a
//! timer scheduled before a jump or rollback is recognised as stale and
//! dropped. A begin-delay start is additionally dropped once its action is
//! no longer waiting to start.

use std::time::Duration;

use crate::ActionId;

/// Counter identifying the scene's current activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation(pub u64);

impl Generation {
    #[inline]
    pub(crate) const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// What should happen when a deferred transition fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferredKind {
    /// Start an action whose begin delay elapsed.
    Start(ActionId),

    /// Advance past `from` once its end delay elapsed.
    ///
    /// The successor is resolved when the transition fires, so insertions
    /// and exit changes made during the delay are honoured.
    Advance { from: ActionId },

    /// End an action whose on-enter hook asked for a timed completion.
    End {
        action: ActionId,
        exit: Option<String>,
    },
}

/// A transition scheduled to fire after `delay`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deferred {
    pub delay: Duration,
    pub generation: Generation,
    pub kind: DeferredKind,
}
