//! Scene worker that owns the authoritative [`Scene`].
//!
//! Receives commands from [`SceneHandle`](crate::SceneHandle), applies them to
//! the scene, publishes the resulting events to the [`EventBus`], and turns
//! deferred transitions into timers.

use scene_core::{Deferred, EndOptions, ExitMap, Scene, SceneSnapshot};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::api::JumpTarget;
use crate::events::EventBus;

/// Commands that can be sent to the scene worker
pub enum Command {
    Run {
        index: usize,
        reply: oneshot::Sender<SceneSnapshot>,
    },
    PassNext {
        reply: oneshot::Sender<SceneSnapshot>,
    },
    GotoPrev {
        reply: oneshot::Sender<SceneSnapshot>,
    },
    JumpTo {
        target: JumpTarget,
        reply: oneshot::Sender<bool>,
    },
    /// Completion reported by a collaborator whose work finished elsewhere.
    EndAction {
        name: String,
        options: EndOptions,
        reply: oneshot::Sender<bool>,
    },
    SetExits {
        name: String,
        exits: ExitMap,
        reply: oneshot::Sender<bool>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
    Snapshot {
        reply: oneshot::Sender<SceneSnapshot>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    Quit {
        reply: oneshot::Sender<SceneSnapshot>,
    },
}

/// Background task that drives one scene.
///
/// # Design Note
///
/// All scene mutation happens on this task, one command or timer at a time.
/// A timer is spawned only after the command that scheduled it has been fully
/// applied, so a delayed transition always fires after the synchronous part of
/// its trigger. Timers that outlive their activation are rejected by the
/// scene's generation check.
pub struct SceneWorker {
    scene: Scene,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    timers: JoinSet<Deferred>,
}

impl SceneWorker {
    /// Creates a new scene worker.
    pub fn new(scene: Scene, command_rx: mpsc::Receiver<Command>, event_bus: EventBus) -> Self {
        tracing::info!("SceneWorker initialized with {} actions", scene.len());

        Self {
            scene,
            command_rx,
            event_bus,
            timers: JoinSet::new(),
        }
    }

    /// Main worker loop.
    ///
    /// Exits once every handle is dropped; pending timers are aborted with
    /// the worker.
    pub async fn run(mut self) {
        // Events emitted while the scene was being built.
        self.flush();

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(joined) = self.timers.join_next() => match joined {
                    Ok(deferred) => {
                        if !self.scene.fire(deferred) {
                            trace!("deferred transition was stale");
                        }
                    }
                    Err(error) => debug!(%error, "timer task did not complete"),
                },
            }
            self.flush();
        }

        debug!("SceneWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Run { index, reply } => {
                self.scene.run(index);
                self.reply(reply, self.scene.snapshot(), "Run");
            }
            Command::PassNext { reply } => {
                self.scene.pass_next();
                self.reply(reply, self.scene.snapshot(), "PassNext");
            }
            Command::GotoPrev { reply } => {
                self.scene.goto_prev();
                self.reply(reply, self.scene.snapshot(), "GotoPrev");
            }
            Command::JumpTo { target, reply } => {
                let jumped = match target {
                    JumpTarget::Index(index) => self.scene.jump_to(index),
                    JumpTarget::Name(name) => self.scene.jump_to_action(&name),
                };
                self.reply(reply, jumped, "JumpTo");
            }
            Command::EndAction {
                name,
                options,
                reply,
            } => {
                let found = self.scene.end_action_named(&name, options);
                self.reply(reply, found, "EndAction");
            }
            Command::SetExits { name, exits, reply } => {
                let found = self.scene.set_exits_named(&name, exits);
                self.reply(reply, found, "SetExits");
            }
            Command::Count { reply } => {
                self.reply(reply, self.scene.count(), "Count");
            }
            Command::Snapshot { reply } => {
                self.reply(reply, self.scene.snapshot(), "Snapshot");
            }
            Command::Reset { reply } => {
                self.scene.reset();
                self.reply(reply, (), "Reset");
            }
            Command::Quit { reply } => {
                self.scene.quit();
                self.reply(reply, self.scene.snapshot(), "Quit");
            }
        }
    }

    fn reply<T>(&self, reply: oneshot::Sender<T>, value: T, command: &'static str) {
        if reply.send(value).is_err() {
            debug!("{} reply channel closed (caller dropped)", command);
        }
    }

    /// Publishes drained events and arms timers for deferred transitions.
    fn flush(&mut self) {
        for event in self.scene.drain_events() {
            self.event_bus.publish(event);
        }
        for deferred in self.scene.take_deferred() {
            trace!(kind = ?deferred.kind, delay = ?deferred.delay, "arming timer");
            self.timers.spawn(async move {
                tokio::time::sleep(deferred.delay).await;
                deferred
            });
        }
    }
}
