//! High-level runtime orchestrator.
//!
//! The runtime owns the scene worker, wires up the command channel and event
//! bus, and exposes a builder-based API for clients to drive playback.

use std::env;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use scene_core::{Scene, SceneEvent};

use crate::api::{Result, RuntimeError, SceneHandle};
use crate::events::{EventBus, Topic};
use crate::workers::{Command, SceneWorker};

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity of each topic's broadcast channel
    pub event_buffer_size: usize,
    /// Capacity of the handle → worker command queue
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SCENE_EVENT_BUFFER` - Events buffered per topic (default: 100)
    /// - `SCENE_COMMAND_BUFFER` - Queued commands per worker (default: 32)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("SCENE_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("SCENE_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Main runtime that drives one scene
///
/// Design: Runtime owns the worker and coordinates shutdown.
/// [`SceneHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: SceneHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> SceneHandle {
        self.handle.clone()
    }

    /// Subscribe to scene events on a topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SceneEvent> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every [`SceneHandle`] clone is dropped, so
    /// callers must drop their own clones first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    scene: Option<Scene>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            scene: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the scene to drive (required)
    ///
    /// Playback does not begin until a client calls
    /// [`SceneHandle::run`], so subscribers can attach first.
    pub fn scene(mut self, scene: Scene) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Build the runtime and spawn its worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let scene = self.scene.ok_or(RuntimeError::MissingScene)?;

        let (command_tx, command_rx) =
            mpsc::channel::<Command>(self.config.command_buffer_size.max(1));
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = SceneHandle::new(command_tx, event_bus.clone());

        let worker = SceneWorker::new(scene, command_rx, event_bus);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
