//! Test doubles: a backend that tracks buffers without a GPU, and views,
//! listeners and effects that write what happens to them into a shared log.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;

use crate::backend::{Backend, Size};
use crate::error::AllocError;
use crate::listener::{ListenerHandle, TransitionListener};
use crate::transition::TransitionEffect;
use crate::view::{View, ViewHandle};

/// Shared, ordered record of events.
#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Number of events exactly equal to `event`.
    pub fn count(&self, event: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == event).count()
    }

    /// Number of events starting with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    /// Position of the first event equal to `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == event)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Debug)]
pub struct MockTexture {
    pub buffer_id: u32,
}

#[derive(Debug)]
pub struct MockBuffer {
    texture: MockTexture,
}

/// Backend that hands out numbered buffers and remembers which one is bound.
#[derive(Default)]
pub struct MockBackend {
    next_id: u32,
    live: Vec<(u32, Size)>,
    allocations: usize,
    bound: Option<u32>,
    allocations_before_failure: Option<usize>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `n` more allocations succeed, then fails every one after.
    pub fn fail_allocations_after(&mut self, n: usize) {
        self.allocations_before_failure = Some(n);
    }

    pub fn allow_allocations(&mut self) {
        self.allocations_before_failure = None;
    }

    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    pub fn live_sizes(&self) -> Vec<Size> {
        self.live.iter().map(|(_, size)| *size).collect()
    }

    /// Total successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    pub fn bound(&self) -> Option<u32> {
        self.bound
    }

    /// Human-readable name of the bound target, used in event logs.
    pub fn bound_name(&self) -> String {
        match self.bound {
            Some(id) => format!("buffer{id}"),
            None => "screen".to_string(),
        }
    }
}

impl Backend for MockBackend {
    type Buffer = MockBuffer;
    type Texture = MockTexture;

    fn allocate_buffer(&mut self, size: Size, label: &str) -> Result<MockBuffer, AllocError> {
        match self.allocations_before_failure {
            Some(0) => return Err(AllocError::new(label, size, "out of memory")),
            Some(ref mut remaining) => *remaining -= 1,
            None => {}
        }
        self.next_id += 1;
        self.allocations += 1;
        self.live.push((self.next_id, size));
        Ok(MockBuffer {
            texture: MockTexture {
                buffer_id: self.next_id,
            },
        })
    }

    fn release_buffer(&mut self, buffer: MockBuffer) {
        let id = buffer.texture.buffer_id;
        self.live.retain(|(live, _)| *live != id);
        if self.bound == Some(id) {
            self.bound = None;
        }
    }

    fn bind_buffer(&mut self, buffer: &MockBuffer) {
        self.bound = Some(buffer.texture.buffer_id);
    }

    fn bind_default(&mut self) {
        self.bound = None;
    }

    fn buffer_texture(buffer: &MockBuffer) -> &MockTexture {
        &buffer.texture
    }
}

/// View that logs every lifecycle call as `"<name>.<hook>"` and every render
/// as `"<name>.render@<target>"`.
pub struct RecordingView {
    name: &'static str,
    log: EventLog,
    fail_render: bool,
}

impl RecordingView {
    pub fn handle(name: &'static str, log: &EventLog) -> ViewHandle<MockBackend> {
        Rc::new(RefCell::new(Self {
            name,
            log: log.clone(),
            fail_render: false,
        }))
    }

    pub fn failing(name: &'static str, log: &EventLog) -> ViewHandle<MockBackend> {
        Rc::new(RefCell::new(Self {
            name,
            log: log.clone(),
            fail_render: true,
        }))
    }

    fn record(&self, hook: &str) {
        self.log.push(format!("{}.{}", self.name, hook));
    }
}

impl View<MockBackend> for RecordingView {
    fn show(&mut self) {
        self.record("show");
    }

    fn hide(&mut self) {
        self.record("hide");
    }

    fn pause(&mut self) {
        self.record("pause");
    }

    fn resume(&mut self) {
        self.record("resume");
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.record(&format!("resize({width}x{height})"));
    }

    fn render(&mut self, backend: &mut MockBackend, _dt: f32) -> anyhow::Result<()> {
        self.record(&format!("render@{}", backend.bound_name()));
        if self.fail_render {
            return Err(anyhow!("{} failed to render", self.name));
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.record("dispose");
    }
}

/// Listener that logs `"<name>.started"` / `"<name>.finished"`.
pub struct RecordingListener {
    name: &'static str,
    log: EventLog,
    fail: bool,
}

impl RecordingListener {
    pub fn handle(name: &'static str, log: &EventLog) -> ListenerHandle {
        Rc::new(RefCell::new(Self {
            name,
            log: log.clone(),
            fail: false,
        }))
    }

    pub fn failing(name: &'static str, log: &EventLog) -> ListenerHandle {
        Rc::new(RefCell::new(Self {
            name,
            log: log.clone(),
            fail: true,
        }))
    }

    fn record(&self, event: &str) -> anyhow::Result<()> {
        self.log.push(format!("{}.{}", self.name, event));
        if self.fail {
            return Err(anyhow!("{} rejected {}", self.name, event));
        }
        Ok(())
    }
}

impl TransitionListener for RecordingListener {
    fn on_transition_started(&mut self) -> anyhow::Result<()> {
        self.record("started")
    }

    fn on_transition_finished(&mut self) -> anyhow::Result<()> {
        self.record("finished")
    }
}

/// Effect that records every progress value it is given and logs
/// `"effect@<target>"` so tests can check it draws to the visible target.
pub struct RecordingEffect {
    log: EventLog,
    progress: RefCell<Vec<f32>>,
    textures: RefCell<Vec<(u32, u32)>>,
}

impl RecordingEffect {
    pub fn new(log: &EventLog) -> Rc<Self> {
        Rc::new(Self {
            log: log.clone(),
            progress: RefCell::new(Vec::new()),
            textures: RefCell::new(Vec::new()),
        })
    }

    pub fn as_effect(self: &Rc<Self>) -> Rc<dyn TransitionEffect<MockBackend>> {
        self.clone()
    }

    pub fn progress(&self) -> Vec<f32> {
        self.progress.borrow().clone()
    }

    /// `(source, destination)` buffer ids of each composite call.
    pub fn textures(&self) -> Vec<(u32, u32)> {
        self.textures.borrow().clone()
    }
}

impl TransitionEffect<MockBackend> for RecordingEffect {
    fn composite(
        &self,
        backend: &mut MockBackend,
        source: &MockTexture,
        destination: &MockTexture,
        progress: f32,
    ) -> anyhow::Result<()> {
        self.log.push(format!("effect@{}", backend.bound_name()));
        self.progress.borrow_mut().push(progress);
        self.textures
            .borrow_mut()
            .push((source.buffer_id, destination.buffer_id));
        Ok(())
    }
}
