use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use viewfade::{
    Color, Easing, GpuContext, Size, SwitchOutcome, TransitionController, TransitionEffect,
    TransitionListener, TransitionPass, View, ViewHandle, WipeDirection, view_handle,
};

/// Press Space to switch views.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Transition effect used when switching views.
    #[arg(long, value_enum, default_value_t = EffectArg::Crossfade, env = "VIEWFADE_EFFECT")]
    effect: EffectArg,
    /// Transition duration in seconds.
    #[arg(long, default_value_t = 1.0)]
    duration: f32,
    /// Easing curve applied to the transition.
    #[arg(long, value_enum, default_value_t = EasingArg::EaseInOut)]
    easing: EasingArg,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    #[arg(long, default_value = "viewfade")]
    title: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EffectArg {
    Instant,
    Crossfade,
    Wipe,
    Fade,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EasingArg {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl From<EasingArg> for Easing {
    fn from(arg: EasingArg) -> Self {
        match arg {
            EasingArg::Linear => Easing::Linear,
            EasingArg::EaseIn => Easing::EaseIn,
            EasingArg::EaseOut => Easing::EaseOut,
            EasingArg::EaseInOut => Easing::EaseInOut,
        }
    }
}

/// Clears the screen to a slowly pulsing color. Stops pulsing while paused.
struct PulseView {
    name: &'static str,
    color: Color,
    time: f32,
    paused: bool,
}

impl PulseView {
    fn new(name: &'static str, color: Color) -> Self {
        Self {
            name,
            color,
            time: 0.0,
            paused: false,
        }
    }
}

impl View<GpuContext> for PulseView {
    fn show(&mut self) {
        debug!(view = self.name, "show");
    }

    fn hide(&mut self) {
        debug!(view = self.name, "hide");
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn render(&mut self, gpu: &mut GpuContext, dt: f32) -> anyhow::Result<()> {
        if !self.paused {
            self.time += dt;
        }
        let pulse = 0.75 + 0.25 * (self.time * 2.0).sin();
        let target = gpu.current_target().context("no target bound")?;

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(self.name),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(self.name),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: (self.color.r * pulse) as f64,
                            g: (self.color.g * pulse) as f64,
                            b: (self.color.b * pulse) as f64,
                            a: self.color.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

struct LogListener;

impl TransitionListener for LogListener {
    fn on_transition_started(&mut self) -> anyhow::Result<()> {
        info!("transition started");
        Ok(())
    }

    fn on_transition_finished(&mut self) -> anyhow::Result<()> {
        info!("transition finished");
        Ok(())
    }
}

struct App {
    args: Args,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    controller: TransitionController<GpuContext>,
    views: Vec<ViewHandle<GpuContext>>,
    current: usize,
    last_frame: Instant,
}

impl App {
    fn new(args: Args) -> Self {
        Self {
            args,
            window: None,
            gpu: None,
            controller: TransitionController::new(),
            views: vec![
                view_handle(PulseView::new("amber", Color::rgb(0.9, 0.55, 0.1))),
                view_handle(PulseView::new("teal", Color::rgb(0.1, 0.6, 0.65))),
                view_handle(PulseView::new("violet", Color::rgb(0.5, 0.2, 0.8))),
            ],
            current: 0,
            last_frame: Instant::now(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.args.title.clone())
            .with_inner_size(PhysicalSize::new(self.args.width, self.args.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );

        let mut gpu = GpuContext::new(window.clone())?;
        let size = gpu.size();
        self.controller.create(&mut gpu, size)?;

        let effect = self.build_effect(&gpu);
        if !self.controller.configure_transition(effect, self.args.duration) {
            warn!(duration = self.args.duration, "transition configuration rejected");
        }
        self.controller.add_listener(Rc::new(RefCell::new(LogListener)));
        let _ = self.controller.set_active_view(Rc::clone(&self.views[0]))?;

        self.gpu = Some(gpu);
        self.window = Some(window);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn build_effect(&self, gpu: &GpuContext) -> Option<Rc<dyn TransitionEffect<GpuContext>>> {
        let pass = match self.args.effect {
            EffectArg::Instant => return None,
            EffectArg::Crossfade => TransitionPass::crossfade(gpu),
            EffectArg::Wipe => TransitionPass::wipe(gpu, WipeDirection::LeftToRight),
            EffectArg::Fade => TransitionPass::fade_through(gpu, Color::BLACK),
        };
        Some(Rc::new(pass.easing(self.args.easing.into())))
    }

    fn switch_view(&mut self) -> anyhow::Result<()> {
        let next = (self.current + 1) % self.views.len();
        let outcome = self.controller.set_active_view(Rc::clone(&self.views[next]))?;
        info!(?outcome, view = next, "switch requested");
        if outcome != SwitchOutcome::Rejected {
            self.current = next;
        }
        Ok(())
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = (gpu.width(), gpu.height());
                gpu.resize(width, height);
                return Ok(());
            }
            Err(err) => {
                warn!(error = %err, "failed to acquire surface texture");
                return Ok(());
            }
        };

        self.controller.render(gpu, dt)?;
        gpu.end_frame(frame);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.controller.resume();
            return;
        }
        if let Err(err) = self.init(event_loop) {
            error!(error = ?err, "failed to initialise");
            event_loop.exit();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.controller.pause();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                if let Some(gpu) = self.gpu.as_mut() {
                    self.controller.dispose(gpu);
                }
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => match self.gpu.as_mut() {
                Some(gpu) if size.width > 0 && size.height > 0 => {
                    gpu.resize(size.width, size.height);
                    self.controller
                        .resize(gpu, Size::new(size.width, size.height))
                        .map_err(anyhow::Error::from)
                }
                _ => Ok(()),
            },
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::Space) =>
            {
                self.switch_view()
            }
            WindowEvent::RedrawRequested => {
                let result = self.redraw();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                result
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            error!(error = ?err, "frame failed");
            event_loop.exit();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(args);
    event_loop.run_app(&mut app).context("event loop failed")?;
    Ok(())
}
