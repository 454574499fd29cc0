//! Observers notified when a transition starts and finishes.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::TransitionError;

/// Receives transition events. Both callbacks default to doing nothing.
pub trait TransitionListener {
    /// Both views have been paused and the first blended frame is about to
    /// be rendered.
    fn on_transition_started(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// The old view has been hidden and the new one resumed; the new view is
    /// rendered on its own starting this frame.
    fn on_transition_finished(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub type ListenerHandle = Rc<RefCell<dyn TransitionListener>>;

/// Ordered set of listeners. Delivery is synchronous and in registration
/// order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<ListenerHandle>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. Returns `false` if that exact handle is already
    /// registered.
    pub fn add(&mut self, listener: ListenerHandle) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Unregisters `listener` by identity. Returns whether it was present.
    pub fn remove(&mut self, listener: &ListenerHandle) -> bool {
        match self.listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn contains(&self, listener: &ListenerHandle) -> bool {
        self.listeners.iter().any(|l| Rc::ptr_eq(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Stops at the first failing listener; later listeners are not called.
    pub(crate) fn notify_started(&self) -> Result<(), TransitionError> {
        for listener in &self.listeners {
            listener
                .borrow_mut()
                .on_transition_started()
                .map_err(TransitionError::Listener)?;
        }
        Ok(())
    }

    /// Stops at the first failing listener; later listeners are not called.
    pub(crate) fn notify_finished(&self) -> Result<(), TransitionError> {
        for listener in &self.listeners {
            listener
                .borrow_mut()
                .on_transition_finished()
                .map_err(TransitionError::Listener)?;
        }
        Ok(())
    }
}
