//! Pluggable behaviour of an action.
//!
//! The scene owns every action's playback data; what a step actually does
//! (rendering text, waiting for a choice, running a timer) is supplied by an
//! [`ActionBehavior`]. Hooks never call back into the scene directly. Instead
//! the on-enter hook records how it wants to finish through its
//! [`ActionContext`], and the scene applies that request once the hook
//! returns.

use std::time::Duration;

use crate::error::HookError;
use crate::Action;

/// Start/end behaviour attached to an action.
///
/// Both hooks default to doing nothing, in which case the action finishes only
/// when someone ends it from outside (e.g. [`Scene::pass_next`](crate::Scene::pass_next)).
pub trait ActionBehavior: Send {
    /// Performs the step's work when the action starts.
    ///
    /// Call one of the `end*` methods on `ctx` to finish the action, or leave
    /// it running and end it later through the scene.
    fn on_enter(&mut self, ctx: &mut ActionContext<'_>) {
        let _ = ctx;
    }

    /// Cleans up when the action ends or is quit.
    ///
    /// Errors are logged and otherwise ignored by the scene.
    fn on_exit(&mut self, action: &Action) -> Result<(), HookError> {
        let _ = action;
        Ok(())
    }
}

impl<B: ActionBehavior + ?Sized> ActionBehavior for Box<B> {
    #[inline]
    fn on_enter(&mut self, ctx: &mut ActionContext<'_>) {
        (**self).on_enter(ctx)
    }

    #[inline]
    fn on_exit(&mut self, action: &Action) -> Result<(), HookError> {
        (**self).on_exit(action)
    }
}

/// How an on-enter hook asked to finish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EndRequest {
    pub delay: Duration,
    pub exit: Option<String>,
}

/// View of the starting action handed to [`ActionBehavior::on_enter`].
pub struct ActionContext<'a> {
    action: &'a Action,
    request: Option<EndRequest>,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(action: &'a Action) -> Self {
        Self {
            action,
            request: None,
        }
    }

    pub fn action(&self) -> &Action {
        self.action
    }

    pub fn name(&self) -> &str {
        self.action.name()
    }

    /// Ends the action as soon as the hook returns.
    pub fn end(&mut self) {
        self.end_after_inner(Duration::ZERO, None);
    }

    /// Ends the action through the exit `label` as soon as the hook returns.
    pub fn end_with_exit(&mut self, label: impl Into<String>) {
        self.end_after_inner(Duration::ZERO, Some(label.into()));
    }

    /// Ends the action once `delay` has elapsed.
    ///
    /// The timer is dropped if the scene moves on before it fires.
    pub fn end_after(&mut self, delay: Duration) {
        self.end_after_inner(delay, None);
    }

    pub fn end_after_with_exit(&mut self, delay: Duration, label: impl Into<String>) {
        self.end_after_inner(delay, Some(label.into()));
    }

    fn end_after_inner(&mut self, delay: Duration, exit: Option<String>) {
        // Last request wins.
        self.request = Some(EndRequest { delay, exit });
    }

    pub(crate) fn into_request(self) -> Option<EndRequest> {
        self.request
    }
}

/// Behaviour that does nothing; the action waits to be ended from outside.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passive;

impl ActionBehavior for Passive {}

/// Behaviour that ends the action by itself after a fixed delay.
///
/// A zero delay ends the action immediately after it starts.
#[derive(Clone, Debug, Default)]
pub struct AutoAdvance {
    delay: Duration,
    exit: Option<String>,
}

impl AutoAdvance {
    pub fn new(delay: Duration) -> Self {
        Self { delay, exit: None }
    }

    pub fn immediate() -> Self {
        Self::default()
    }

    /// Leaves through `label` instead of the currently selected exit.
    pub fn via(mut self, label: impl Into<String>) -> Self {
        self.exit = Some(label.into());
        self
    }
}

impl ActionBehavior for AutoAdvance {
    fn on_enter(&mut self, ctx: &mut ActionContext<'_>) {
        match self.exit.clone() {
            Some(label) => ctx.end_after_with_exit(self.delay, label),
            None => ctx.end_after(self.delay),
        }
    }
}
