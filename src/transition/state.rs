//! Transition configuration, timing and the controller's state machine.

use std::fmt;
use std::rc::Rc;

use super::effect::TransitionEffect;
use crate::backend::Backend;
use crate::view::ViewHandle;

/// How [`set_active_view`](super::TransitionController::set_active_view)
/// switches between views.
pub enum TransitionConfig<B: Backend> {
    /// Hide the old view and show the new one on the spot.
    Instant,
    /// Blend from the old view to the new one over `duration` seconds.
    Animated {
        effect: Rc<dyn TransitionEffect<B>>,
        duration: f32,
    },
}

impl<B: Backend> TransitionConfig<B> {
    /// Builds a config from an optional effect; `None` means instant.
    pub fn from_effect(effect: Option<Rc<dyn TransitionEffect<B>>>, duration: f32) -> Self {
        match effect {
            Some(effect) => Self::Animated { effect, duration },
            None => Self::Instant,
        }
    }

    pub fn is_instant(&self) -> bool {
        matches!(self, Self::Instant)
    }

    /// Configured duration; zero for instant switching.
    pub fn duration(&self) -> f32 {
        match self {
            Self::Instant => 0.0,
            Self::Animated { duration, .. } => *duration,
        }
    }

    pub fn effect(&self) -> Option<&Rc<dyn TransitionEffect<B>>> {
        match self {
            Self::Instant => None,
            Self::Animated { effect, .. } => Some(effect),
        }
    }
}

impl<B: Backend> Default for TransitionConfig<B> {
    fn default() -> Self {
        Self::Instant
    }
}

impl<B: Backend> Clone for TransitionConfig<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Instant => Self::Instant,
            Self::Animated { effect, duration } => Self::Animated {
                effect: Rc::clone(effect),
                duration: *duration,
            },
        }
    }
}

impl<B: Backend> fmt::Debug for TransitionConfig<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant => f.write_str("Instant"),
            Self::Animated { duration, .. } => f
                .debug_struct("Animated")
                .field("duration", duration)
                .finish_non_exhaustive(),
        }
    }
}

/// Elapsed time of a running transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionClock {
    elapsed: f32,
    duration: f32,
}

impl TransitionClock {
    /// A clock at zero for a transition lasting `duration` seconds.
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// `elapsed / duration` clamped to `[0, 1]`. A zero-length transition
    /// reports 1.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}

/// A transition in flight.
pub struct RunningTransition<B: Backend> {
    pending: ViewHandle<B>,
    effect: Rc<dyn TransitionEffect<B>>,
    clock: TransitionClock,
    /// Set until the first blended frame has reallocated the capture targets.
    needs_fresh_targets: bool,
}

impl<B: Backend> RunningTransition<B> {
    pub(crate) fn new(pending: ViewHandle<B>, effect: Rc<dyn TransitionEffect<B>>, duration: f32) -> Self {
        Self {
            pending,
            effect,
            clock: TransitionClock::new(duration),
            needs_fresh_targets: true,
        }
    }

    /// The view being transitioned to.
    pub fn pending(&self) -> &ViewHandle<B> {
        &self.pending
    }

    pub fn clock(&self) -> &TransitionClock {
        &self.clock
    }

    pub(crate) fn effect(&self) -> &Rc<dyn TransitionEffect<B>> {
        &self.effect
    }

    pub(crate) fn clock_mut(&mut self) -> &mut TransitionClock {
        &mut self.clock
    }

    pub(crate) fn needs_fresh_targets(&self) -> bool {
        self.needs_fresh_targets
    }

    pub(crate) fn mark_targets_fresh(&mut self) {
        self.needs_fresh_targets = false;
    }

    pub(crate) fn into_pending(self) -> ViewHandle<B> {
        self.pending
    }
}

/// Whether a transition is running. The pending view only exists inside
/// [`TransitionState::Running`].
pub enum TransitionState<B: Backend> {
    Idle,
    Running(RunningTransition<B>),
}

impl<B: Backend> TransitionState<B> {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub fn running(&self) -> Option<&RunningTransition<B>> {
        match self {
            Self::Idle => None,
            Self::Running(running) => Some(running),
        }
    }
}

impl<B: Backend> Default for TransitionState<B> {
    fn default() -> Self {
        Self::Idle
    }
}
