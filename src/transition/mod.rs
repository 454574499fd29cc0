//! View transitions.
//!
//! This module contains the [`TransitionController`] state machine, the
//! [`TransitionEffect`] capability it composites with, and the built-in
//! wgpu effects in [`TransitionPass`].
//!
//! # Lifecycle of a switch
//!
//! With an effect configured, [`TransitionController::set_active_view`]
//! shows and pauses the incoming view, pauses the outgoing one, and fires
//! `on_transition_started`. Each following frame captures both views
//! offscreen and composites them. Once the duration has elapsed the old view
//! is hidden, the new one resumed, `on_transition_finished` fires, and the new
//! view renders on its own in that same frame.

mod controller;
mod effect;
mod state;
mod transition_pass;

pub use controller::{SwitchOutcome, TransitionController};
pub use effect::{Easing, TransitionEffect};
pub use state::{RunningTransition, TransitionClock, TransitionConfig, TransitionState};
pub use transition_pass::{Color, TransitionKind, TransitionPass, WipeDirection};
