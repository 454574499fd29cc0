//! The transition controller: tracks the active view and drives transitions
//! frame by frame.

use std::rc::Rc;

use tracing::{debug, warn};

use super::effect::TransitionEffect;
use super::state::{RunningTransition, TransitionConfig, TransitionState};
use crate::backend::{Backend, Size};
use crate::error::TransitionError;
use crate::listener::{ListenerHandle, ListenerRegistry};
use crate::render_target::RenderTargetPair;
use crate::view::{ViewHandle, ViewHost};

/// What [`TransitionController::set_active_view`] did with the request.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// There was no active view; the new one was shown immediately.
    Shown,
    /// Instant switch: the old view was hidden and the new one shown.
    Switched,
    /// A transition to the new view started.
    Started,
    /// The view was already active. Nothing happened.
    Unchanged,
    /// A transition is in progress. Nothing happened.
    Rejected,
}

/// Switches between full-screen views, optionally blending them with a
/// [`TransitionEffect`].
///
/// The controller is responsible for:
/// - Tracking the active view and, during a transition, the pending one
/// - Calling view lifecycle hooks at the right moments
/// - Capturing both views into offscreen targets while a transition runs
/// - Notifying [`TransitionListener`](crate::TransitionListener)s
///
/// The host calls [`render`](Self::render) once per frame and forwards
/// window events ([`resize`](Self::resize), [`pause`](Self::pause),
/// [`resume`](Self::resume)).
///
/// # Example
///
/// ```ignore
/// let mut controller = TransitionController::new();
/// controller.create(&mut gpu, Size::new(1280, 720))?;
/// controller.configure_transition(Some(Rc::new(TransitionPass::crossfade(&gpu))), 0.8);
/// let _ = controller.set_active_view(menu)?;
///
/// // later, from input handling
/// let _ = controller.set_active_view(game)?;
///
/// // every frame
/// controller.render(&mut gpu, dt)?;
/// ```
pub struct TransitionController<B: Backend> {
    views: ViewHost<B>,
    state: TransitionState<B>,
    config: TransitionConfig<B>,
    targets: RenderTargetPair<B>,
    listeners: ListenerRegistry,
    /// Last known viewport size; `None` until `create`.
    viewport: Option<Size>,
}

impl<B: Backend> TransitionController<B> {
    /// Create a controller with no views, instant switching and no GPU
    /// resources. Call [`create`](Self::create) before rendering.
    pub fn new() -> Self {
        Self {
            views: ViewHost::new(),
            state: TransitionState::Idle,
            config: TransitionConfig::Instant,
            targets: RenderTargetPair::new(),
            listeners: ListenerRegistry::new(),
            viewport: None,
        }
    }

    /// Allocate both capture targets at the viewport size.
    pub fn create(&mut self, backend: &mut B, size: Size) -> Result<(), TransitionError> {
        self.targets.allocate(backend, size)?;
        self.viewport = Some(size);
        debug!(%size, "transition controller created");
        Ok(())
    }

    /// Hide the active and pending views and release the capture targets.
    ///
    /// A running transition is abandoned: its pending view is hidden and
    /// dropped. The views themselves are not disposed.
    pub fn dispose(&mut self, backend: &mut B) {
        ViewHost::hide(self.views.active());
        if let TransitionState::Running(running) = std::mem::take(&mut self.state) {
            ViewHost::hide(Some(running.pending()));
            debug!("transition abandoned by dispose");
        }
        self.targets.release(backend);
        self.viewport = None;
    }

    /// Pause the active view and, during a transition, the pending one.
    pub fn pause(&mut self) {
        ViewHost::pause(self.views.active());
        ViewHost::pause(self.pending_view());
    }

    /// Resume the active view and, during a transition, the pending one.
    pub fn resume(&mut self) {
        ViewHost::resume(self.views.active());
        ViewHost::resume(self.pending_view());
    }

    /// Render one frame.
    ///
    /// Idle: the active view renders straight to the bound target. During a
    /// transition both views are captured offscreen and composited by the
    /// effect. Once the configured duration has elapsed the switch completes
    /// and the new view renders on its own in the same frame.
    ///
    /// Negative or NaN `dt` is treated as zero.
    pub fn render(&mut self, backend: &mut B, dt: f32) -> Result<(), TransitionError> {
        let viewport = self.viewport.ok_or(TransitionError::NotCreated)?;
        let dt = if dt > 0.0 { dt } else { 0.0 };

        match std::mem::take(&mut self.state) {
            TransitionState::Idle => self.render_active(backend, dt),
            TransitionState::Running(running) if running.clock().is_complete() => {
                self.finish_transition(running)?;
                self.render_active(backend, dt)
            }
            TransitionState::Running(mut running) => {
                let result = self.render_blended(backend, viewport, &mut running, dt);
                self.state = TransitionState::Running(running);
                result
            }
        }
    }

    /// Forward the new size to every tracked view and reallocate the
    /// capture targets, even mid-transition.
    ///
    /// Before [`create`](Self::create) only the views are resized.
    pub fn resize(&mut self, backend: &mut B, size: Size) -> Result<(), TransitionError> {
        ViewHost::resize(self.views.active(), size);
        ViewHost::resize(self.pending_view(), size);

        if self.viewport.is_some() {
            self.viewport = Some(size);
            self.targets.allocate(backend, size)?;
            debug!(%size, "resized transition targets");
        }
        Ok(())
    }

    /// Set the effect used for subsequent view switches. `None` switches
    /// instantly.
    ///
    /// Returns `false` without changing anything if a transition is running,
    /// or if `duration` is negative or not finite.
    pub fn configure_transition(
        &mut self,
        effect: Option<Rc<dyn TransitionEffect<B>>>,
        duration: f32,
    ) -> bool {
        if self.state.is_running() {
            warn!("transition change requested while a transition is running");
            return false;
        }
        if effect.is_some() && !(duration.is_finite() && duration >= 0.0) {
            warn!(duration, "invalid transition duration");
            return false;
        }
        self.config = TransitionConfig::from_effect(effect, duration);
        true
    }

    /// Make `view` the active view.
    ///
    /// The first view is shown immediately. After that the configured
    /// transition decides: instant switching hides the old view and shows
    /// the new one; an effect pauses both and starts a transition that
    /// [`render`](Self::render) completes once the duration has elapsed.
    ///
    /// Requests made while a transition is running are rejected.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Listener`] if a listener fails in
    /// `on_transition_started`. The transition has already started by then:
    /// [`is_transitioning`](Self::is_transitioning) is `true` and
    /// [`render`](Self::render) carries it to completion as usual.
    pub fn set_active_view(&mut self, view: ViewHandle<B>) -> Result<SwitchOutcome, TransitionError> {
        if self.state.is_running() {
            warn!("view change requested while a transition is in progress");
            return Ok(SwitchOutcome::Rejected);
        }

        if self.views.active().is_none() {
            ViewHost::show(Some(&view));
            self.fit_to_viewport(&view);
            self.views.replace(view);
            return Ok(SwitchOutcome::Shown);
        }

        if self.views.is_active(&view) {
            return Ok(SwitchOutcome::Unchanged);
        }

        match &self.config {
            TransitionConfig::Instant => {
                let old = self.views.replace(Rc::clone(&view));
                ViewHost::hide(old.as_ref());
                ViewHost::show(Some(&view));
                self.fit_to_viewport(&view);
                Ok(SwitchOutcome::Switched)
            }
            TransitionConfig::Animated { effect, duration } => {
                let effect = Rc::clone(effect);
                let duration = *duration;

                ViewHost::show(Some(&view));
                self.fit_to_viewport(&view);
                ViewHost::pause(self.views.active());
                ViewHost::pause(Some(&view));

                self.state = TransitionState::Running(RunningTransition::new(view, effect, duration));
                debug!(duration, "transition started");
                self.listeners.notify_started()?;
                Ok(SwitchOutcome::Started)
            }
        }
    }

    /// The view currently shown; the outgoing one while a transition runs.
    pub fn active_view(&self) -> Option<&ViewHandle<B>> {
        self.views.active()
    }

    /// The view being transitioned to, if a transition is running.
    pub fn pending_view(&self) -> Option<&ViewHandle<B>> {
        self.state.running().map(RunningTransition::pending)
    }

    /// Check if a transition is currently in progress.
    pub fn is_transitioning(&self) -> bool {
        self.state.is_running()
    }

    /// Current transition state.
    pub fn state(&self) -> &TransitionState<B> {
        &self.state
    }

    /// Seconds into the running transition.
    pub fn elapsed(&self) -> Option<f32> {
        self.state.running().map(|running| running.clock().elapsed())
    }

    /// Linear progress of the running transition in `[0, 1]`.
    pub fn progress(&self) -> Option<f32> {
        self.state.running().map(|running| running.clock().progress())
    }

    pub fn transition_config(&self) -> &TransitionConfig<B> {
        &self.config
    }

    /// Last known viewport size, `None` before [`create`](Self::create).
    pub fn viewport(&self) -> Option<Size> {
        self.viewport
    }

    pub fn targets(&self) -> &RenderTargetPair<B> {
        &self.targets
    }

    /// Register a listener for transition events. Returns `false` if it was
    /// already registered.
    pub fn add_listener(&mut self, listener: ListenerHandle) -> bool {
        self.listeners.add(listener)
    }

    /// Returns whether the listener was registered.
    pub fn remove_listener(&mut self, listener: &ListenerHandle) -> bool {
        self.listeners.remove(listener)
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    fn fit_to_viewport(&self, view: &ViewHandle<B>) {
        if let Some(size) = self.viewport {
            ViewHost::resize(Some(view), size);
        }
    }

    fn render_active(&mut self, backend: &mut B, dt: f32) -> Result<(), TransitionError> {
        let view = self.views.active().ok_or(TransitionError::NoActiveView)?;
        view.borrow_mut()
            .render(backend, dt)
            .map_err(TransitionError::View)
    }

    /// Hide the old view, promote the pending one and resume it.
    fn finish_transition(&mut self, running: RunningTransition<B>) -> Result<(), TransitionError> {
        let old = self.views.replace(running.into_pending());
        ViewHost::hide(old.as_ref());
        ViewHost::resume(self.views.active());
        debug!("transition finished");
        self.listeners.notify_finished()
    }

    fn render_blended(
        &mut self,
        backend: &mut B,
        viewport: Size,
        running: &mut RunningTransition<B>,
        dt: f32,
    ) -> Result<(), TransitionError> {
        // Fresh buffers so nothing from a previous transition leaks into the
        // first frame; also retries after a failed resize left the pair empty
        if running.needs_fresh_targets() || self.targets.size() != Some(viewport) {
            self.targets.allocate(backend, viewport)?;
            running.mark_targets_fresh();
        }

        let active = self.views.active().ok_or(TransitionError::NoActiveView)?;

        {
            let mut capture = self.targets.source.begin_capture(backend)?;
            active
                .borrow_mut()
                .render(&mut *capture, dt)
                .map_err(TransitionError::View)?;
        }
        {
            let mut capture = self.targets.destination.begin_capture(backend)?;
            running
                .pending()
                .borrow_mut()
                .render(&mut *capture, dt)
                .map_err(TransitionError::View)?;
        }

        let (Some(source), Some(destination)) = (
            self.targets.source.color_texture(),
            self.targets.destination.color_texture(),
        ) else {
            return Err(TransitionError::NotCreated);
        };

        let progress = running.clock().progress();
        running
            .effect()
            .composite(backend, source, destination, progress)
            .map_err(TransitionError::Effect)?;
        running.clock_mut().advance(dt);
        Ok(())
    }
}

impl<B: Backend> Default for TransitionController<B> {
    fn default() -> Self {
        Self::new()
    }
}
