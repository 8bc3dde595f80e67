use thiserror::Error;

/// Fatal, programmer-facing errors. These are never returned to a
/// command source as a `Reply` — a corrupt book is not something the
/// engine can recover from, so callers are expected to let these
/// propagate and terminate the engine task.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("book invariant violated: {0}")]
    InvariantViolation(String),

    #[error("engine command channel closed")]
    ChannelClosed,
}
