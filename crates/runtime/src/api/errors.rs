//! Unified error types surfaced by the runtime API.
//!
//! Navigation inside a scene never fails (invalid jumps are no-ops), so the
//! only errors left are about reaching the worker at all.
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("scene worker command channel closed")]
    CommandChannelClosed,

    #[error("scene worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("scene worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a scene before building")]
    MissingScene,
}
