//! The scene state machine.
//!
//! A [`Scene`] is an ordered collection of actions plus playback state:
//! the current position, the history of previously active actions, the
//! reachability ceiling for jumps, and a memoized default-path length.
//!
//! Actions are stored in an arena addressed by [`ActionId`]; the scene order
//! is a separate list of handles. Exits name their targets, and those names
//! are resolved through an index at lookup time, so exits may point at actions
//! that are added later.
//!
//! The scene is synchronous. Delays are not slept on but recorded as
//! [`Deferred`] transitions that the driver fires back through
//! [`Scene::fire`]. Notifications accumulate in an outbox drained with
//! [`Scene::drain_events`].

mod history;
mod prediction;
mod snapshot;

pub use history::History;
pub use snapshot::{ActionSnapshot, SceneSnapshot};

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, trace, warn};

use crate::behavior::{ActionBehavior, ActionContext, EndRequest};
use crate::deferred::{Deferred, DeferredKind, Generation};
use crate::error::HookError;
use crate::{Action, ActionConfig, ActionId, ActionState, ExitMap, SceneEvent};

use prediction::LengthCache;

/// How an action should be ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndOptions {
    /// Notify the scene so it advances. `false` ends the action in place.
    pub propagate: bool,
    /// Exit label to select before advancing.
    pub exit: Option<String>,
}

impl EndOptions {
    /// End and advance along the selected exit.
    pub fn advance() -> Self {
        Self {
            propagate: true,
            exit: None,
        }
    }

    /// End without notifying the scene.
    pub fn suppressed() -> Self {
        Self {
            propagate: false,
            exit: None,
        }
    }

    pub fn with_exit(mut self, label: impl Into<String>) -> Self {
        self.exit = Some(label.into());
        self
    }
}

impl Default for EndOptions {
    fn default() -> Self {
        Self::advance()
    }
}

struct Slot {
    action: Action,
    behavior: Box<dyn ActionBehavior>,
}

/// Ordered graph of actions with playback state.
#[derive(Default)]
pub struct Scene {
    slots: Vec<Slot>,
    /// Scene order: position → handle.
    order: Vec<ActionId>,
    /// Handle → position, rebuilt on insertion.
    positions: Vec<usize>,
    /// Name → first inserted handle with that name.
    names: HashMap<String, ActionId>,

    current: Option<ActionId>,
    progress: usize,
    max_progress: usize,
    history: History,
    rollback: bool,
    ended: bool,
    generation: Generation,
    length: LengthCache,

    events: Vec<SceneEvent>,
    deferred: Vec<Deferred>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("actions", &self.order.len())
            .field("current", &self.current)
            .field("progress", &self.progress)
            .field("max_progress", &self.max_progress)
            .field("history", &self.history)
            .field("rollback", &self.rollback)
            .field("ended", &self.ended)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Appends an action at the end of the scene.
    pub fn push(
        &mut self,
        config: ActionConfig,
        behavior: impl ActionBehavior + 'static,
    ) -> ActionId {
        self.insert(self.order.len(), config, behavior)
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_action(
        mut self,
        config: ActionConfig,
        behavior: impl ActionBehavior + 'static,
    ) -> Self {
        self.push(config, behavior);
        self
    }

    /// Inserts an action at `position` (clamped to the scene length).
    ///
    /// Positions of later actions shift by one. Playback follows the current
    /// action, so `progress` and `max_progress` shift with it.
    pub fn insert(
        &mut self,
        position: usize,
        config: ActionConfig,
        behavior: impl ActionBehavior + 'static,
    ) -> ActionId {
        let position = position.min(self.order.len());
        let id = ActionId(self.slots.len() as u32);
        let action = Action::from_config(id, config);
        let name = action.name().to_owned();

        self.names.entry(name.clone()).or_insert(id);
        self.slots.push(Slot {
            action,
            behavior: Box::new(behavior),
        });
        self.order.insert(position, id);
        self.reindex();

        if let Some(current) = self.current {
            self.progress = self.positions[current.index()];
            if position <= self.max_progress {
                self.max_progress += 1;
            }
        }

        self.length.invalidate();
        debug!(action = %name, %id, position, "action added");
        self.events.push(SceneEvent::ActionAdded { id, name, position });
        id
    }

    fn reindex(&mut self) {
        self.positions = vec![0; self.slots.len()];
        for (position, id) in self.order.iter().enumerate() {
            self.positions[id.index()] = position;
        }
    }

    /// Replaces the exit set of an action.
    ///
    /// This is the only way to change exits. It corrects the selected exit
    /// and invalidates the predicted length. Returns `false` for an unknown
    /// handle.
    pub fn set_exits(&mut self, id: ActionId, exits: ExitMap) -> bool {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            trace!(%id, "set_exits on unknown action");
            return false;
        };
        slot.action.replace_exits(exits);
        let name = slot.action.name().to_owned();

        self.length.invalidate();
        debug!(action = %name, %id, "exits changed");
        self.events.push(SceneEvent::ExitsChanged { id, name });
        true
    }

    /// [`set_exits`](Self::set_exits) by action name.
    pub fn set_exits_named(&mut self, name: &str, exits: ExitMap) -> bool {
        match self.action_id(name) {
            Some(id) => self.set_exits(id, exits),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn max_progress(&self) -> usize {
        self.max_progress
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_rollback_pending(&self) -> bool {
        self.rollback
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// History entries as action names, oldest first.
    pub fn history_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.history
            .iter()
            .filter_map(|id| self.action(id).map(Action::name))
    }

    /// The activated action, if playback has begun.
    pub fn current(&self) -> Option<&Action> {
        self.current.and_then(|id| self.action(id))
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.slots.get(id.index()).map(|slot| &slot.action)
    }

    pub fn action_at(&self, position: usize) -> Option<&Action> {
        self.order.get(position).and_then(|&id| self.action(id))
    }

    pub fn get_action(&self, name: &str) -> Option<&Action> {
        self.action_id(name).and_then(|id| self.action(id))
    }

    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.names.get(name).copied()
    }

    /// Position of the action called `name`.
    pub fn action_index(&self, name: &str) -> Option<usize> {
        self.action_id(name).and_then(|id| self.position_of(id))
    }

    pub fn position_of(&self, id: ActionId) -> Option<usize> {
        self.positions.get(id.index()).copied()
    }

    /// Actions in scene order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> + '_ {
        self.order.iter().filter_map(|&id| self.action(id))
    }

    /// Whether `jump_to(position)` would be accepted.
    pub fn is_reachable(&self, position: usize) -> bool {
        position < self.order.len() && position <= self.max_progress
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    /// Activates the action at `index`.
    ///
    /// An index past the last action completes the scene. Actions that end
    /// synchronously chain into their successors within this call.
    pub fn run(&mut self, index: usize) {
        let mut next = Some(index);
        while let Some(index) = next {
            next = self.activate(index);
        }
    }

    fn activate(&mut self, index: usize) -> Option<usize> {
        if self.ended {
            trace!(index, "run ignored: scene ended");
            return None;
        }
        let Some(&id) = self.order.get(index) else {
            self.finish_scene();
            return None;
        };

        if self.rollback {
            self.rollback = false;
        } else if let Some(current) = self.current {
            self.history.push(current);
        }

        self.progress = index;
        self.max_progress = self.max_progress.max(index);
        self.current = Some(id);
        self.generation = self.generation.next();

        let action = &mut self.slots[id.index()].action;
        action.reset();
        let delay = action.begin_delay();
        debug!(
            action = %action.name(),
            progress = index,
            history = self.history.len(),
            generation = self.generation.0,
            "activating action"
        );

        if delay.is_zero() {
            self.start(id)
        } else {
            self.schedule(delay, DeferredKind::Start(id));
            None
        }
    }

    /// Starts an action and applies what its on-enter hook requested.
    ///
    /// Returns the next index when the action ended and advanced immediately.
    fn start(&mut self, id: ActionId) -> Option<usize> {
        let Slot { action, behavior } = &mut self.slots[id.index()];
        action.set_state(ActionState::Started);

        let mut ctx = ActionContext::new(action);
        behavior.on_enter(&mut ctx);
        let request = ctx.into_request();

        self.events.push(SceneEvent::ActionStarted {
            id,
            name: action.name().to_owned(),
            position: self.positions[id.index()],
        });

        match request {
            None => None,
            Some(EndRequest { delay, exit }) if delay.is_zero() => {
                self.finish_action(id, true, exit)
            }
            Some(EndRequest { delay, exit }) => {
                self.schedule(delay, DeferredKind::End { action: id, exit });
                None
            }
        }
    }

    /// Ends an action.
    ///
    /// Emits `ActionEnded`, runs the on-exit hook (failures are logged and
    /// swallowed), marks the action ended and applies `exit`. With
    /// `propagate`, returns the index the scene should run next.
    fn finish_action(
        &mut self,
        id: ActionId,
        propagate: bool,
        exit: Option<String>,
    ) -> Option<usize> {
        let slot = self.slots.get(id.index())?;
        if slot.action.state() == ActionState::Ended {
            trace!(action = %slot.action.name(), "end ignored: already ended");
            return None;
        }
        self.events.push(SceneEvent::ActionEnded {
            id,
            name: slot.action.name().to_owned(),
        });

        self.invoke_exit_hook(id);

        let action = &mut self.slots[id.index()].action;
        action.set_state(ActionState::Ended);
        if let Some(label) = exit
            && action.select_exit(label)
        {
            let name = action.name().to_owned();
            self.length.invalidate();
            self.events.push(SceneEvent::ExitsChanged { id, name });
        }

        if propagate { self.action_ended(id) } else { None }
    }

    /// Runs an action's on-exit hook, isolating errors and panics.
    fn invoke_exit_hook(&mut self, id: ActionId) {
        let Slot { action, behavior } = &mut self.slots[id.index()];
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| behavior.on_exit(action)));
        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(error)) => error,
            Err(payload) => HookError::from_panic(payload),
        };

        warn!(
            action = %action.name(),
            %id,
            %error,
            "on-exit hook failed; continuing"
        );
        self.events.push(SceneEvent::HookFailed {
            id,
            name: action.name().to_owned(),
            reason: error.to_string(),
        });
    }

    /// Reacts to the end of an action by resolving where to go next.
    fn action_ended(&mut self, id: ActionId) -> Option<usize> {
        if self.current != Some(id) {
            debug!(%id, "completion of inactive action ignored");
            return None;
        }
        let delay = self.slots[id.index()].action.end_delay();

        if delay.is_zero() {
            Some(self.successor(id))
        } else {
            self.schedule(delay, DeferredKind::Advance { from: id });
            None
        }
    }

    /// Position following `id` on its default path.
    ///
    /// The selected exit wins when it names an existing action; otherwise the
    /// next position in scene order.
    fn successor(&self, id: ActionId) -> usize {
        let action = &self.slots[id.index()].action;
        if action.has_exit()
            && let Some(target) = action.resolve_exit_target().and_then(|name| self.names.get(name))
        {
            return self.positions[target.index()];
        }
        self.positions[id.index()] + 1
    }

    fn finish_scene(&mut self) {
        if let Some(current) = self.current {
            self.quit_action(current);
        }
        self.ended = true;
        self.generation = self.generation.next();
        self.deferred.clear();
        info!(history = self.history.len(), "scene ended");
        self.events.push(SceneEvent::SceneEnded);
    }

    fn quit_action(&mut self, id: ActionId) {
        if self.slots[id.index()].action.state() == ActionState::Ended {
            return;
        }
        self.invoke_exit_hook(id);
        self.slots[id.index()].action.set_state(ActionState::Ended);
    }

    fn schedule(&mut self, delay: std::time::Duration, kind: DeferredKind) {
        trace!(?kind, ?delay, generation = self.generation.0, "transition deferred");
        self.deferred.push(Deferred {
            delay,
            generation: self.generation,
            kind,
        });
    }

    /// Ends an action from outside the scene.
    ///
    /// This is how collaborators whose on-enter work finishes asynchronously
    /// report completion. Ending an action that already ended is a no-op, and
    /// a propagated end only advances the scene when the action is the current
    /// one.
    pub fn end_action(&mut self, id: ActionId, options: EndOptions) {
        if let Some(next) = self.finish_action(id, options.propagate, options.exit) {
            self.run(next);
        }
    }

    /// [`end_action`](Self::end_action) by name. Returns `false` for unknown
    /// names.
    pub fn end_action_named(&mut self, name: &str, options: EndOptions) -> bool {
        match self.action_id(name) {
            Some(id) => {
                self.end_action(id, options);
                true
            }
            None => false,
        }
    }

    /// Ends the current action, which advances the scene normally.
    pub fn pass_next(&mut self) {
        if let Some(current) = self.current {
            self.end_action(current, EndOptions::advance());
        }
    }

    /// Returns to the most recent history entry.
    ///
    /// No-op at position 0, with an empty history, or after the scene ended.
    pub fn goto_prev(&mut self) {
        if self.progress == 0 || self.ended || self.history.is_empty() {
            return;
        }
        let Some(current) = self.current else {
            return;
        };
        self.finish_action(current, false, None);

        let Some(previous) = self.history.pop() else {
            return;
        };
        let index = self.positions[previous.index()];
        debug!(target = index, "rolling back");
        self.jump(index, true);
    }

    /// Jumps to the action at `index`.
    ///
    /// The target must exist and be reachable (`index <= max_progress`);
    /// otherwise nothing happens and `false` is returned.
    pub fn jump_to(&mut self, index: usize) -> bool {
        self.jump(index, false)
    }

    /// [`jump_to`](Self::jump_to) by action name.
    pub fn jump_to_action(&mut self, name: &str) -> bool {
        match self.action_index(name) {
            Some(index) => self.jump_to(index),
            None => {
                trace!(name, "jump ignored: unknown action");
                false
            }
        }
    }

    fn jump(&mut self, index: usize, rollback: bool) -> bool {
        if self.ended {
            trace!(index, "jump ignored: scene ended");
            return false;
        }
        if !self.is_reachable(index) {
            trace!(index, max_progress = self.max_progress, "jump ignored: unreachable");
            return false;
        }
        let target = self.order[index];

        // Re-entering a visited action resynchronises history with it.
        let revisit = self.history.truncate_before(target) || self.current == Some(target);
        self.rollback = rollback || revisit;

        if let Some(current) = self.current {
            self.finish_action(current, false, None);
        }
        self.run(index);
        true
    }

    /// Tears the scene down: quits the current action and ends the scene.
    pub fn quit(&mut self) {
        if !self.ended {
            self.finish_scene();
        }
    }

    /// Returns every action to `Init` and clears all playback state.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.action.reset();
        }
        self.history.clear();
        self.current = None;
        self.progress = 0;
        self.max_progress = 0;
        self.rollback = false;
        self.ended = false;
        self.generation = self.generation.next();
        self.deferred.clear();
        self.length.invalidate();
        debug!("scene reset");
    }

    /// Applies a deferred transition.
    ///
    /// Returns `false` if the transition is stale: the scene was activated,
    /// reset or ended since it was scheduled, or the action a delayed start
    /// belongs to has already been ended.
    pub fn fire(&mut self, deferred: Deferred) -> bool {
        if deferred.generation != self.generation || self.ended {
            debug!(
                kind = ?deferred.kind,
                scheduled = deferred.generation.0,
                current = self.generation.0,
                "stale transition dropped"
            );
            return false;
        }
        match deferred.kind {
            DeferredKind::Start(id) => {
                let waiting = self.current == Some(id)
                    && self
                        .action(id)
                        .is_some_and(|action| action.state() == ActionState::Init);
                if !waiting {
                    debug!(%id, "deferred start dropped: action no longer waiting");
                    return false;
                }
                if let Some(next) = self.start(id) {
                    self.run(next);
                }
            }
            DeferredKind::Advance { from } => {
                if self.current != Some(from) {
                    debug!(%from, "deferred advance dropped: action not current");
                    return false;
                }
                let next = self.successor(from);
                self.run(next);
            }
            DeferredKind::End { action, exit } => self.end_action(
                action,
                EndOptions {
                    propagate: true,
                    exit,
                },
            ),
        }
        true
    }

    // ------------------------------------------------------------------
    // Prediction
    // ------------------------------------------------------------------

    /// Number of steps the default path takes from start to completion.
    ///
    /// History length plus the actions walked from the successor of the last
    /// history entry (or position 0) following selected exits. The result is
    /// memoized until the topology changes.
    pub fn count(&self) -> usize {
        self.length.get_or_compute(|| {
            let start = self.history.last().map_or(0, |id| self.successor(id));
            self.history.len() + self.walk_from(start)
        })
    }

    pub fn is_length_valid(&self) -> bool {
        self.length.is_valid()
    }

    fn walk_from(&self, start: usize) -> usize {
        let mut visited = vec![false; self.order.len()];
        let mut index = start;
        let mut steps = 0;

        while let Some(&id) = self.order.get(index) {
            if std::mem::replace(&mut visited[index], true) {
                warn!(position = index, "default path loops; prediction truncated");
                break;
            }
            steps += 1;
            index = self.successor(id);
        }
        steps
    }

    // ------------------------------------------------------------------
    // Outboxes
    // ------------------------------------------------------------------

    /// Takes every notification emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Takes every transition scheduled since the last call.
    pub fn take_deferred(&mut self) -> Vec<Deferred> {
        std::mem::take(&mut self.deferred)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            progress: self.progress,
            max_progress: self.max_progress,
            current: self.current().map(|action| action.name().to_owned()),
            history: self.history_names().map(str::to_owned).collect(),
            ended: self.ended,
            predicted_length: self.count(),
            actions: self
                .actions()
                .map(|action| ActionSnapshot {
                    name: action.name().to_owned(),
                    state: action.state(),
                    selected_exit: action.selected_exit().map(str::to_owned),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests;
