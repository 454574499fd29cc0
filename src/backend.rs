//! The seam between the transition core and a graphics engine.
//!
//! The core never talks to a GPU API directly. Everything it needs from the
//! engine (offscreen buffers, redirecting draws into them, sampling them
//! afterwards) goes through [`Backend`]. [`GpuContext`](crate::GpuContext)
//! is the wgpu implementation shipped with this crate.

use std::fmt;

use crate::error::AllocError;

/// Viewport dimensions in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero (e.g. a minimized window).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Offscreen rendering primitives provided by the graphics engine.
///
/// A backend has a notion of the *bound* target: the surface that draw calls
/// currently land on. By default that is the visible framebuffer; while a
/// [`RenderTarget`](crate::RenderTarget) capture is open it is that target's
/// buffer.
pub trait Backend {
    /// An offscreen color buffer.
    type Buffer;
    /// The sampleable view of a buffer's contents.
    type Texture: ?Sized;

    /// Allocates a color buffer of the given size.
    fn allocate_buffer(&mut self, size: Size, label: &str) -> Result<Self::Buffer, AllocError>;

    /// Frees a buffer previously returned by [`allocate_buffer`](Self::allocate_buffer).
    fn release_buffer(&mut self, buffer: Self::Buffer);

    /// Redirects subsequent drawing into `buffer`.
    fn bind_buffer(&mut self, buffer: &Self::Buffer);

    /// Restores the default (visible) target.
    fn bind_default(&mut self);

    /// The sampleable texture backing `buffer`.
    fn buffer_texture(buffer: &Self::Buffer) -> &Self::Texture;
}
