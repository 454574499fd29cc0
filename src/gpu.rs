//! Core GPU context and the wgpu [`Backend`] implementation.
//!
//! This module provides [`GpuContext`], the struct that holds the wgpu device,
//! queue and surface, and tracks which target draw calls should land on. It is
//! passed to the [`TransitionController`](crate::TransitionController) and to
//! every view's `render`.
//!
//! # Frame lifecycle
//!
//! ```ignore
//! let frame = gpu.begin_frame()?;   // surface texture becomes the default target
//! controller.render(&mut gpu, dt)?; // views draw into gpu.current_target()
//! gpu.end_frame(frame);             // present
//! ```

use std::sync::Arc;

use anyhow::Context;
use winit::window::Window;

use crate::backend::{Backend, Size};
use crate::error::AllocError;

/// Core GPU context holding wgpu resources.
///
/// The device, queue, surface and its configuration are public to allow
/// direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    /// View of the surface texture acquired by `begin_frame`.
    frame_view: Option<wgpu::TextureView>,
    /// Offscreen target bound by a capture, overriding `frame_view`.
    bound: Option<wgpu::TextureView>,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// This performs all wgpu initialization:
    /// 1. Creates a wgpu instance with primary backends (Vulkan, Metal, DX12)
    /// 2. Creates a surface for the window
    /// 3. Requests a suitable GPU adapter
    /// 4. Creates the logical device and command queue
    /// 5. Configures the surface with an sRGB format and Fifo present mode
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create window surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Viewfade Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            frame_view: None,
            bound: None,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions to avoid wgpu validation errors (which
    /// can occur during window minimize).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Acquire the next surface texture and make it the default target.
    pub fn begin_frame(&mut self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        self.frame_view = Some(
            output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );
        Ok(output)
    }

    /// Present a frame acquired with [`begin_frame`](Self::begin_frame).
    pub fn end_frame(&mut self, output: wgpu::SurfaceTexture) {
        self.frame_view = None;
        self.bound = None;
        output.present();
    }

    /// The view draw calls should target: the open capture if there is one,
    /// otherwise the current surface texture.
    pub fn current_target(&self) -> Option<&wgpu::TextureView> {
        self.bound.as_ref().or(self.frame_view.as_ref())
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.config.width, self.config.height)
    }

    /// Returns the current aspect ratio (width / height).
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}

/// An offscreen color texture allocated by [`GpuContext`].
pub struct GpuTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTarget {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

impl Backend for GpuContext {
    type Buffer = GpuTarget;
    type Texture = wgpu::TextureView;

    /// The texture is created with:
    /// - Same format as the surface (typically `Bgra8UnormSrgb`)
    /// - `RENDER_ATTACHMENT` usage for writing via render passes
    /// - `TEXTURE_BINDING` usage for sampling in the transition pass
    fn allocate_buffer(&mut self, size: Size, label: &str) -> Result<GpuTarget, AllocError> {
        if size.is_empty() {
            return Err(AllocError::new(label, size, "zero-sized texture"));
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if size.width > max || size.height > max {
            return Err(AllocError::new(
                label,
                size,
                format!("exceeds the device limit of {max} pixels"),
            ));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTarget { texture, view })
    }

    fn release_buffer(&mut self, buffer: GpuTarget) {
        buffer.texture.destroy();
    }

    fn bind_buffer(&mut self, buffer: &GpuTarget) {
        self.bound = Some(buffer.view.clone());
    }

    fn bind_default(&mut self) {
        self.bound = None;
    }

    fn buffer_texture(buffer: &GpuTarget) -> &wgpu::TextureView {
        &buffer.view
    }
}
