//! Error types surfaced to the host render loop.

use crate::backend::Size;

/// Failure to allocate an offscreen color buffer.
#[derive(Debug, thiserror::Error)]
#[error("failed to allocate {size} render target '{label}': {reason}")]
pub struct AllocError {
    /// Debug label of the target being allocated.
    pub label: String,
    /// Requested dimensions.
    pub size: Size,
    /// Backend-specific description of the failure.
    pub reason: String,
}

impl AllocError {
    pub fn new(label: impl Into<String>, size: Size, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            size,
            reason: reason.into(),
        }
    }
}

/// Hard failures of a controller operation.
///
/// Rejected-but-harmless requests (reconfiguring or switching views while a
/// transition runs) are not errors; they are reported through return values.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// `render` or a capture was attempted before `create`.
    #[error("transition controller used before create()")]
    NotCreated,
    /// There is no view to render.
    #[error("no active view has been set")]
    NoActiveView,
    /// An offscreen buffer could not be allocated.
    #[error(transparent)]
    Allocation(#[from] AllocError),
    /// A view failed while rendering.
    #[error("view failed to render")]
    View(#[source] anyhow::Error),
    /// The transition effect failed while compositing.
    #[error("transition effect failed to composite")]
    Effect(#[source] anyhow::Error),
    /// A transition listener returned an error.
    #[error("transition listener failed")]
    Listener(#[source] anyhow::Error),
}
