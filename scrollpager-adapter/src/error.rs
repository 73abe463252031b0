use std::borrow::Cow;

/// A failure reported by a host collaborator (render sink, location store, content provider).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct HostError {
    pub operation: &'static str,
    pub message: Cow<'static, str>,
}

impl HostError {
    pub fn new(operation: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Failures caught at the engine's entry points.
///
/// None of these are fatal: every entry point logs the error, records it in
/// [`crate::Controller::last_error`], and leaves the engine ready for the next periodic check.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The content region is not in the document yet; retried on the next check.
    #[error("content region not found")]
    RegionNotFound,
    /// The region exists but holds no items after loading; retried on the next check.
    #[error("no items found in the content region")]
    EmptyCollection,
    /// A previous load loop is still running; initialization is retried on the next check.
    #[error("a load loop is already in flight")]
    LoaderBusy,
    /// An asynchronous step finished after its session ended and was discarded.
    #[error("stale {operation} for session {epoch} discarded")]
    StaleOperation { operation: &'static str, epoch: u64 },
    #[error(transparent)]
    Host(#[from] HostError),
}

impl EngineError {
    /// `true` for outcomes that are part of normal operation rather than host failures.
    pub fn is_benign(&self) -> bool {
        !matches!(self, Self::Host(_))
    }
}
