//! Terminal player loop.
//!
//! Two tasks cooperate: the printer renders events from the runtime's topics,
//! while [`PlayerApp::run`] reads commands from stdin and turns them into
//! [`SceneHandle`] calls. Neither touches the scene directly.

use anyhow::Result;
use scene_core::SceneEvent;
use scene_runtime::{SceneHandle, Topic};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::input::{HELP, Input};
use crate::script::Script;

/// What the loop should do after a command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub message: Option<String>,
    pub exit: bool,
}

impl Reply {
    fn silent() -> Self {
        Self::default()
    }

    fn say(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            exit: false,
        }
    }

    fn exit() -> Self {
        Self {
            message: None,
            exit: true,
        }
    }
}

/// Interactive front end for one scene.
pub struct PlayerApp {
    handle: SceneHandle,
    script: Script,
}

impl PlayerApp {
    pub fn new(handle: SceneHandle, script: Script) -> Self {
        Self { handle, script }
    }

    /// Starts playback from the first beat.
    pub async fn start(&self) -> Result<()> {
        self.handle.run(0).await?;
        Ok(())
    }

    /// Runs until the user quits or stdin closes.
    pub async fn run(self) -> Result<()> {
        let printer = tokio::spawn(print_events(
            self.handle.subscribe(Topic::Action),
            self.handle.subscribe(Topic::Scene),
            self.script.clone(),
        ));

        println!("{HELP}\n");
        self.start().await?;

        let mut lines = BufReader::new(io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let current = self.current_beat().await?;
            let labels = current
                .as_deref()
                .map(|name| self.script.labels(name))
                .unwrap_or_default();

            let reply = self.execute(Input::parse(&line, &labels)).await?;
            if let Some(message) = reply.message {
                println!("{message}");
            }
            if reply.exit {
                break;
            }
        }

        printer.abort();
        Ok(())
    }

    /// Applies one parsed command.
    pub async fn execute(&self, input: Input) -> Result<Reply> {
        debug!(?input, "player command");

        let reply = match input {
            Input::Next => {
                if self.handle.snapshot().await?.ended {
                    Reply::say("The scene is over. r restarts, q quits.")
                } else {
                    self.handle.pass_next().await?;
                    Reply::silent()
                }
            }
            Input::Prev => {
                if self.handle.snapshot().await?.history.is_empty() {
                    Reply::say("Nothing to go back to.")
                } else {
                    self.handle.goto_prev().await?;
                    Reply::silent()
                }
            }
            Input::Jump(target) => {
                if self.handle.jump_to(target.as_str()).await? {
                    Reply::silent()
                } else {
                    Reply::say(format!("Can't jump to '{target}' yet."))
                }
            }
            Input::Choose(label) => self.choose(&label).await?,
            Input::Status => Reply::say(self.status().await?),
            Input::Restart => {
                self.handle.reset().await?;
                self.start().await?;
                Reply::silent()
            }
            Input::Help => Reply::say(HELP),
            Input::Quit => {
                self.handle.quit().await?;
                Reply::exit()
            }
            Input::None => Reply::silent(),
            Input::Unknown(line) => Reply::say(format!("Unknown command '{line}' (h for help).")),
        };

        Ok(reply)
    }

    async fn choose(&self, label: &str) -> Result<Reply> {
        let Some(current) = self.current_beat().await? else {
            return Ok(Reply::say("Nothing is playing."));
        };
        if !self.script.labels(&current).contains(&label) {
            return Ok(Reply::say(format!("There is no '{label}' here.")));
        }

        self.handle.end_action(&current, Some(label)).await?;
        Ok(Reply::silent())
    }

    async fn status(&self) -> Result<String> {
        let snapshot = self.handle.snapshot().await?;
        if snapshot.ended {
            return Ok(format!(
                "Finished after {} beats.",
                snapshot.history.len() + 1
            ));
        }

        let current = snapshot.current.as_deref().unwrap_or("-");
        Ok(format!(
            "Beat {} of ~{} ({current}). Behind you: {}",
            snapshot.history.len() + 1,
            snapshot.predicted_length,
            if snapshot.history.is_empty() {
                "nothing".to_owned()
            } else {
                snapshot.history.join(" > ")
            }
        ))
    }

    async fn current_beat(&self) -> Result<Option<String>> {
        let snapshot = self.handle.snapshot().await?;
        Ok(if snapshot.ended {
            None
        } else {
            snapshot.current
        })
    }
}

/// Text shown for an event, if any.
pub fn render(event: &SceneEvent, script: &Script) -> Option<String> {
    match event {
        SceneEvent::ActionStarted { name, .. } => {
            let mut text = format!("[{name}] {}", script.line(name).unwrap_or(""));
            let labels = script.labels(name);
            if !labels.is_empty() {
                text.push_str(&format!("\n  choose: {}", labels.join(" | ")));
            }
            Some(text)
        }
        SceneEvent::SceneEnded => Some("-- the end --".to_owned()),
        _ => None,
    }
}

async fn print_events(
    mut actions: broadcast::Receiver<SceneEvent>,
    mut scene: broadcast::Receiver<SceneEvent>,
    script: Script,
) {
    loop {
        let received = tokio::select! {
            biased;
            event = actions.recv() => event,
            event = scene.recv() => event,
        };

        match received {
            Ok(event) => {
                if let Some(text) = render(&event, &script) {
                    println!("{text}");
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
