//! # Viewfade
//!
//! **Animated transitions between full-screen views for real-time render loops.**
//!
//! Applications that show one dominant view at a time (title screen, game,
//! pause menu) hand their views to a [`TransitionController`] and call
//! [`render`](TransitionController::render) once per frame. Switching views
//! either cuts instantly or blends the two with a [`TransitionEffect`] while
//! the controller keeps the views' lifecycle hooks in order.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::rc::Rc;
//! use viewfade::*;
//!
//! let mut gpu = GpuContext::new(window)?;
//! let mut controller = TransitionController::new();
//! let size = gpu.size();
//! controller.create(&mut gpu, size)?;
//! controller.configure_transition(
//!     Some(Rc::new(TransitionPass::crossfade(&gpu).easing(Easing::EaseInOut))),
//!     0.8,
//! );
//! let _ = controller.set_active_view(view_handle(TitleView::new()))?;
//!
//! // each frame
//! let frame = gpu.begin_frame()?;
//! controller.render(&mut gpu, dt)?;
//! gpu.end_frame(frame);
//! ```
//!
//! The core is engine-agnostic: implement [`Backend`] to drive it from a
//! different renderer. [`GpuContext`] is the wgpu implementation.

mod backend;
mod error;
mod gpu;
mod listener;
mod render_target;
pub mod transition;
mod view;

#[cfg(test)]
mod testing;

pub use backend::{Backend, Size};
pub use error::{AllocError, TransitionError};
pub use gpu::{GpuContext, GpuTarget};
pub use listener::{ListenerHandle, ListenerRegistry, TransitionListener};
pub use render_target::{Capture, RenderTarget, RenderTargetPair};
pub use transition::{
    Color, Easing, SwitchOutcome, TransitionConfig, TransitionController, TransitionEffect,
    TransitionKind, TransitionPass, WipeDirection,
};
pub use view::{View, ViewHandle, ViewHost, view_handle};
