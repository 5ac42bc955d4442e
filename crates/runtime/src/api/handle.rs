//! Cloneable façade for issuing commands to the scene worker.
//!
//! [`SceneHandle`] hides channel plumbing and offers async helpers for
//! navigating the scene or streaming events from specific topics.
use std::collections::HashMap;

use scene_core::{EndOptions, ExitMap, SceneEvent, SceneSnapshot};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, Topic};
use crate::workers::Command;

/// Where a jump should land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JumpTarget {
    Index(usize),
    Name(String),
}

impl From<usize> for JumpTarget {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for JumpTarget {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for JumpTarget {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct SceneHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SceneHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Activate the action at `index` (an index past the end completes the scene)
    pub async fn run(&self, index: usize) -> Result<SceneSnapshot> {
        self.request(|reply| Command::Run { index, reply }).await
    }

    /// End the current action and advance normally
    pub async fn pass_next(&self) -> Result<SceneSnapshot> {
        self.request(|reply| Command::PassNext { reply }).await
    }

    /// Roll back to the previous action in history
    pub async fn goto_prev(&self) -> Result<SceneSnapshot> {
        self.request(|reply| Command::GotoPrev { reply }).await
    }

    /// Jump to a reachable action by index or name.
    ///
    /// Returns `false` when the target does not exist or lies beyond the
    /// furthest position reached so far.
    pub async fn jump_to(&self, target: impl Into<JumpTarget>) -> Result<bool> {
        let target = target.into();
        self.request(|reply| Command::JumpTo { target, reply }).await
    }

    /// Jump to a reachable action by name
    pub async fn jump_to_action(&self, name: &str) -> Result<bool> {
        self.jump_to(name).await
    }

    /// Report completion of an action, optionally choosing its exit.
    ///
    /// Returns `false` when no action has that name.
    pub async fn end_action(&self, name: &str, exit: Option<&str>) -> Result<bool> {
        let mut options = EndOptions::advance();
        options.exit = exit.map(str::to_owned);
        let name = name.to_owned();
        self.request(|reply| Command::EndAction {
            name,
            options,
            reply,
        })
        .await
    }

    /// Replace the exits of an action
    pub async fn set_exits(&self, name: &str, exits: ExitMap) -> Result<bool> {
        let name = name.to_owned();
        self.request(|reply| Command::SetExits { name, exits, reply })
            .await
    }

    /// Predicted number of steps along the default path
    pub async fn count(&self) -> Result<usize> {
        self.request(|reply| Command::Count { reply }).await
    }

    /// Query the current playback state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<SceneSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Reset the scene to its initial state
    pub async fn reset(&self) -> Result<()> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// Quit the current action and end the scene
    pub async fn quit(&self) -> Result<SceneSnapshot> {
        self.request(|reply| Command::Quit { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Action` - action started/ended, hook failures
    /// - `Topic::Scene` - actions added, exits changed, scene ended
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SceneEvent> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<SceneEvent>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
