//! Offscreen render targets used to capture views during a transition.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::backend::{Backend, Size};
use crate::error::{AllocError, TransitionError};

/// An off-screen color buffer that views can be rendered into and that
/// transition effects later sample from.
///
/// A target owns at most one backend buffer at a time. Calling
/// [`allocate`](Self::allocate) releases the previous buffer before creating
/// a new one, so resizing never leaks GPU memory.
///
/// # Texture lifetime
///
/// [`color_texture`](Self::color_texture) hands out a borrow of the target.
/// Reallocating or releasing needs `&mut self`, so the borrow checker rejects
/// any texture reference that would outlive the buffer it points into.
pub struct RenderTarget<B: Backend> {
    label: String,
    buffer: Option<B::Buffer>,
    size: Size,
}

impl<B: Backend> RenderTarget<B> {
    /// Creates an empty target. Nothing is allocated until [`allocate`](Self::allocate).
    ///
    /// # Arguments
    ///
    /// * `label` - Debug label forwarded to the backend (visible in GPU debuggers like RenderDoc)
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            buffer: None,
            size: Size::default(),
        }
    }

    /// Replaces the current buffer with a fresh one of the given size.
    ///
    /// The old buffer is released first. On failure the target is left
    /// unallocated.
    pub fn allocate(&mut self, backend: &mut B, size: Size) -> Result<(), AllocError> {
        self.release(backend);
        let buffer = backend.allocate_buffer(size, &self.label)?;
        debug!(target = %self.label, %size, "allocated render target");
        self.buffer = Some(buffer);
        self.size = size;
        Ok(())
    }

    /// Frees the buffer, if any. Safe to call repeatedly.
    pub fn release(&mut self, backend: &mut B) {
        if let Some(buffer) = self.buffer.take() {
            backend.release_buffer(buffer);
        }
    }

    /// Opens a scoped capture: drawing through the returned guard lands in
    /// this target until the guard is dropped or [`Capture::end`] is called.
    pub fn begin_capture<'a>(&'a self, backend: &'a mut B) -> Result<Capture<'a, B>, TransitionError> {
        let buffer = self.buffer.as_ref().ok_or(TransitionError::NotCreated)?;
        backend.bind_buffer(buffer);
        Ok(Capture { backend })
    }

    /// The captured contents, or `None` if nothing is allocated.
    pub fn color_texture(&self) -> Option<&B::Texture> {
        self.buffer.as_ref().map(B::buffer_texture)
    }

    /// Dimensions of the current buffer, or `None` if nothing is allocated.
    pub fn size(&self) -> Option<Size> {
        self.buffer.as_ref().map(|_| self.size)
    }

    pub fn is_allocated(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Guard for an open capture. Derefs to the backend so a view can render
/// through it; the default target is rebound when it goes out of scope,
/// including when the render returns early with an error.
pub struct Capture<'a, B: Backend> {
    backend: &'a mut B,
}

impl<B: Backend> Capture<'_, B> {
    /// Ends the capture explicitly.
    pub fn end(self) {}
}

impl<B: Backend> Deref for Capture<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: Backend> DerefMut for Capture<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: Backend> Drop for Capture<'_, B> {
    fn drop(&mut self) {
        self.backend.bind_default();
    }
}

/// The two targets a transition renders into: the outgoing view goes to
/// `source`, the incoming one to `destination`. Both are always allocated
/// together and at the same size.
pub struct RenderTargetPair<B: Backend> {
    pub source: RenderTarget<B>,
    pub destination: RenderTarget<B>,
}

impl<B: Backend> RenderTargetPair<B> {
    pub fn new() -> Self {
        Self {
            source: RenderTarget::new("Transition Source Capture"),
            destination: RenderTarget::new("Transition Destination Capture"),
        }
    }

    /// Releases and reallocates both targets at `size`.
    ///
    /// On failure both targets are left unallocated.
    pub fn allocate(&mut self, backend: &mut B, size: Size) -> Result<(), AllocError> {
        let result = self
            .source
            .allocate(backend, size)
            .and_then(|()| self.destination.allocate(backend, size));
        if result.is_err() {
            self.release(backend);
        }
        result
    }

    pub fn release(&mut self, backend: &mut B) {
        self.source.release(backend);
        self.destination.release(backend);
    }

    /// Shared size of both targets, or `None` while unallocated.
    pub fn size(&self) -> Option<Size> {
        self.source.size()
    }
}

impl<B: Backend> Default for RenderTargetPair<B> {
    fn default() -> Self {
        Self::new()
    }
}
