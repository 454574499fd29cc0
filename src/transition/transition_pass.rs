//! GPU rendering pass for view transitions.
//!
//! This module provides shaders and pipelines for the built-in transition
//! effects: crossfade, wipe and fade through a solid color. Each is a
//! fullscreen triangle sampling the two captured views.

use anyhow::Context;

use super::effect::{Easing, TransitionEffect};
use crate::gpu::GpuContext;

/// RGBA color, components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
}

/// Edge the incoming view is revealed from in a wipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WipeDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl WipeDirection {
    /// Axis in uv space; a negative component flips the sweep.
    fn axis(self) -> [f32; 2] {
        match self {
            WipeDirection::LeftToRight => [1.0, 0.0],
            WipeDirection::RightToLeft => [-1.0, 0.0],
            WipeDirection::TopToBottom => [0.0, 1.0],
            WipeDirection::BottomToTop => [0.0, -1.0],
        }
    }
}

/// Type of transition effect between views.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionKind {
    /// Blend the old view out while blending the new view in.
    Crossfade,
    /// Fade the old view to a solid color, then fade the new one in from it.
    FadeThrough { color: Color },
    /// Reveal the new view behind a moving edge.
    Wipe { direction: WipeDirection },
}

/// Uniforms for transition rendering.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct TransitionUniforms {
    /// Screen resolution in pixels.
    resolution: [f32; 2],
    /// Eased blend progress.
    progress: f32,
    /// Width of the wipe edge in uv units.
    softness: f32,
    /// Fade-through color (RGBA).
    color: [f32; 4],
    /// Wipe axis.
    direction: [f32; 2],
    _pad: [f32; 2],
}

/// A built-in [`TransitionEffect`] for the wgpu backend.
///
/// # Example
///
/// ```ignore
/// let fade = TransitionPass::crossfade(&gpu).easing(Easing::EaseInOut);
/// controller.configure_transition(Some(Rc::new(fade)), 0.8);
/// ```
pub struct TransitionPass {
    kind: TransitionKind,
    easing: Easing,
    softness: f32,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl TransitionPass {
    /// Create a crossfade transition.
    pub fn crossfade(gpu: &GpuContext) -> Self {
        Self::new(gpu, TransitionKind::Crossfade)
    }

    /// Create a fade-through-color transition: the first half fades the old
    /// view to `color`, the second half fades the new view in.
    pub fn fade_through(gpu: &GpuContext, color: Color) -> Self {
        Self::new(gpu, TransitionKind::FadeThrough { color })
    }

    /// Create a wipe transition.
    pub fn wipe(gpu: &GpuContext, direction: WipeDirection) -> Self {
        Self::new(gpu, TransitionKind::Wipe { direction })
    }

    /// Create a transition pass with GPU resources for `kind`.
    pub fn new(gpu: &GpuContext, kind: TransitionKind) -> Self {
        let device = &gpu.device;

        let fragment = match kind {
            TransitionKind::Crossfade => CROSSFADE_FRAGMENT,
            TransitionKind::FadeThrough { .. } => FADE_THROUGH_FRAGMENT,
            TransitionKind::Wipe { .. } => WIPE_FRAGMENT,
        };
        let source = format!("{SHADER_PRELUDE}{fragment}");

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Transition Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transition Uniforms"),
            size: std::mem::size_of::<TransitionUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Transition Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Uniforms + source texture + destination texture + sampler
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transition Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Transition Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Transition Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            kind,
            easing: Easing::Linear,
            softness: 0.05,
            pipeline,
            uniform_buffer,
            bind_group_layout,
            sampler,
        }
    }

    /// Set the easing curve applied to the controller's linear progress.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the width of the wipe edge in uv units. Ignored by other kinds.
    pub fn softness(mut self, softness: f32) -> Self {
        self.softness = softness.max(0.0);
        self
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Record the blend of `source` and `destination` into `target`.
    pub fn record(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        source: &wgpu::TextureView,
        destination: &wgpu::TextureView,
        progress: f32,
    ) {
        let (color, direction) = match self.kind {
            TransitionKind::Crossfade => ([0.0; 4], [0.0; 2]),
            TransitionKind::FadeThrough { color } => ([color.r, color.g, color.b, color.a], [0.0; 2]),
            TransitionKind::Wipe { direction } => ([0.0; 4], direction.axis()),
        };
        let uniforms = TransitionUniforms {
            resolution: [gpu.width() as f32, gpu.height() as f32],
            progress: self.easing.apply(progress),
            softness: self.softness,
            color,
            direction,
            _pad: [0.0; 2],
        };

        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transition Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(destination),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Transition Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

impl TransitionEffect<GpuContext> for TransitionPass {
    fn composite(
        &self,
        gpu: &mut GpuContext,
        source: &wgpu::TextureView,
        destination: &wgpu::TextureView,
        progress: f32,
    ) -> anyhow::Result<()> {
        let target = gpu
            .current_target()
            .context("no frame in flight; call GpuContext::begin_frame first")?;

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Transition Encoder"),
            });
        self.record(gpu, &mut encoder, target, source, destination, progress);
        gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

/// Shared uniforms, bindings and fullscreen-triangle vertex stage.
const SHADER_PRELUDE: &str = r#"
struct Uniforms {
    resolution: vec2f,
    progress: f32,
    softness: f32,
    color: vec4f,
    direction: vec2f,
    _pad: vec2f,
}

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var source_texture: texture_2d<f32>;
@group(0) @binding(2) var destination_texture: texture_2d<f32>;
@group(0) @binding(3) var tex_sampler: sampler;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4f {
    // Fullscreen triangle
    let uv = vec2f(f32((vi << 1u) & 2u), f32(vi & 2u));
    return vec4f(uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

const CROSSFADE_FRAGMENT: &str = r#"
@fragment
fn fs(@builtin(position) pos: vec4f) -> @location(0) vec4f {
    let uv = pos.xy / u.resolution;
    let old_view = textureSample(source_texture, tex_sampler, uv);
    let new_view = textureSample(destination_texture, tex_sampler, uv);
    return mix(old_view, new_view, u.progress);
}
"#;

const FADE_THROUGH_FRAGMENT: &str = r#"
@fragment
fn fs(@builtin(position) pos: vec4f) -> @location(0) vec4f {
    let uv = pos.xy / u.resolution;
    let old_view = textureSample(source_texture, tex_sampler, uv);
    let new_view = textureSample(destination_texture, tex_sampler, uv);

    // First half: old view -> color. Second half: color -> new view.
    let fade_out = mix(old_view, u.color, clamp(u.progress * 2.0, 0.0, 1.0));
    let fade_in = mix(u.color, new_view, clamp(u.progress * 2.0 - 1.0, 0.0, 1.0));
    return select(fade_in, fade_out, u.progress < 0.5);
}
"#;

const WIPE_FRAGMENT: &str = r#"
@fragment
fn fs(@builtin(position) pos: vec4f) -> @location(0) vec4f {
    let uv = pos.xy / u.resolution;
    let old_view = textureSample(source_texture, tex_sampler, uv);
    let new_view = textureSample(destination_texture, tex_sampler, uv);

    var coord = dot(uv, abs(u.direction));
    if (u.direction.x + u.direction.y < 0.0) {
        coord = 1.0 - coord;
    }
    // Stretch progress so the soft edge starts and ends fully off screen
    let s = u.softness;
    let edge = u.progress * (1.0 + 2.0 * s) - s;
    let reveal = 1.0 - smoothstep(edge - s, edge + s, coord);
    return mix(old_view, new_view, reveal);
}
"#;
