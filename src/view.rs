//! Views and the host that tracks which one is active.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{Backend, Size};

/// A full-screen renderable unit with lifecycle hooks.
///
/// Views are created and destroyed by the application. The controller only
/// calls the hooks below at transition boundaries and never calls
/// [`dispose`](Self::dispose) on its own.
///
/// All hooks except [`render`](Self::render) default to doing nothing.
pub trait View<B: Backend> {
    /// The view became visible.
    fn show(&mut self) {}

    /// The view is no longer visible.
    fn hide(&mut self) {}

    /// The view should stop consuming input and advancing its simulation.
    /// It may still be asked to render, e.g. into an offscreen capture.
    fn pause(&mut self) {}

    /// Undo a previous [`pause`](Self::pause).
    fn resume(&mut self) {}

    /// The viewport changed size.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Draws one frame into whatever target `backend` currently has bound.
    fn render(&mut self, backend: &mut B, dt: f32) -> anyhow::Result<()>;

    /// Releases the view's own resources. Called by the application, never
    /// by the controller.
    fn dispose(&mut self) {}
}

/// Shared handle to a view. Identity (for "is this the active view?") is
/// pointer identity of the `Rc`.
pub type ViewHandle<B> = Rc<RefCell<dyn View<B>>>;

/// Wraps a concrete view into a [`ViewHandle`].
pub fn view_handle<B, V>(view: V) -> ViewHandle<B>
where
    B: Backend,
    V: View<B> + 'static,
{
    Rc::new(RefCell::new(view))
}

/// Holds the active view and forwards lifecycle calls to views that may or
/// may not be present.
pub struct ViewHost<B: Backend> {
    active: Option<ViewHandle<B>>,
}

impl<B: Backend> ViewHost<B> {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn active(&self) -> Option<&ViewHandle<B>> {
        self.active.as_ref()
    }

    /// Returns `true` if `view` is the active view.
    pub fn is_active(&self, view: &ViewHandle<B>) -> bool {
        self.active.as_ref().is_some_and(|active| Rc::ptr_eq(active, view))
    }

    /// Installs `view` as active and returns the previous one.
    pub fn replace(&mut self, view: ViewHandle<B>) -> Option<ViewHandle<B>> {
        self.active.replace(view)
    }

    pub fn show(view: Option<&ViewHandle<B>>) {
        if let Some(view) = view {
            view.borrow_mut().show();
        }
    }

    pub fn hide(view: Option<&ViewHandle<B>>) {
        if let Some(view) = view {
            view.borrow_mut().hide();
        }
    }

    pub fn pause(view: Option<&ViewHandle<B>>) {
        if let Some(view) = view {
            view.borrow_mut().pause();
        }
    }

    pub fn resume(view: Option<&ViewHandle<B>>) {
        if let Some(view) = view {
            view.borrow_mut().resume();
        }
    }

    pub fn resize(view: Option<&ViewHandle<B>>, size: Size) {
        if let Some(view) = view {
            view.borrow_mut().resize(size.width, size.height);
        }
    }
}

impl<B: Backend> Default for ViewHost<B> {
    fn default() -> Self {
        Self::new()
    }
}
