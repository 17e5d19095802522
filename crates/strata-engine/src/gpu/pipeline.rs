//! Render pipelines for the path shader.
//!
//! wgpu bakes stencil, blend, cull and color-mask state into pipelines, so every
//! distinct combination the dispatcher produces maps to one cached pipeline.

use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::frame::{FragUniforms, Vertex};
use crate::paint::{Blend, BlendFactor};
use crate::render::{CompareFunction, DeviceState, StencilFaceOps, StencilOp, Topology};

use super::target::StencilBuffer;

// ── view uniform ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ViewUniform {
    pub size: [f32; 2], // logical px
    pub edge_aa: f32,
    pub _pad: f32, // 16-byte alignment
}

// ── layouts ───────────────────────────────────────────────────────────────

pub(crate) fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("strata texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Group 0: view uniform plus the frag block, bound at a dynamic offset.
pub(crate) fn uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("strata uniform bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(size_of::<ViewUniform>() as u64),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(FragUniforms::SIZE as u64),
                },
                count: None,
            },
        ],
    })
}

// ── pipeline key ──────────────────────────────────────────────────────────

/// Primitive topology as submitted to wgpu; fans are expanded to indexed lists.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Primitive {
    List,
    Strip,
}

impl From<Topology> for Primitive {
    fn from(t: Topology) -> Self {
        match t {
            Topology::TriangleFan | Topology::TriangleList => Primitive::List,
            Topology::TriangleStrip => Primitive::Strip,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct StencilKey {
    compare: CompareFunction,
    read_mask: u32,
    write_mask: u32,
    front: StencilFaceOps,
    back: StencilFaceOps,
}

/// Everything baked into a pipeline. The stencil reference is dynamic and not part
/// of the key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct PipelineKey {
    primitive: Primitive,
    cull: bool,
    color_write: bool,
    blend: Blend,
    stencil: Option<StencilKey>,
}

impl PipelineKey {
    pub(crate) fn new(state: &DeviceState, topology: Topology) -> Self {
        let stencil = state.stencil_test.then_some(StencilKey {
            compare: state.stencil_func.compare,
            read_mask: state.stencil_func.read_mask,
            write_mask: state.stencil_write_mask,
            front: state.stencil_front,
            back: state.stencil_back,
        });

        Self {
            primitive: topology.into(),
            cull: state.cull,
            color_write: state.color_write,
            blend: state.blend,
            stencil,
        }
    }
}

// ── conversions ───────────────────────────────────────────────────────────

fn blend_factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
        BlendFactor::SrcAlphaSaturate => wgpu::BlendFactor::SrcAlphaSaturated,
    }
}

fn blend_state(b: Blend) -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: blend_factor(b.src_rgb),
            dst_factor: blend_factor(b.dst_rgb),
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: blend_factor(b.src_alpha),
            dst_factor: blend_factor(b.dst_alpha),
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn compare(c: CompareFunction) -> wgpu::CompareFunction {
    match c {
        CompareFunction::Always => wgpu::CompareFunction::Always,
        CompareFunction::Equal => wgpu::CompareFunction::Equal,
        CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
    }
}

fn stencil_op(op: StencilOp) -> wgpu::StencilOperation {
    match op {
        StencilOp::Keep => wgpu::StencilOperation::Keep,
        StencilOp::Zero => wgpu::StencilOperation::Zero,
        StencilOp::IncrementClamp => wgpu::StencilOperation::IncrementClamp,
        StencilOp::IncrementWrap => wgpu::StencilOperation::IncrementWrap,
        StencilOp::DecrementWrap => wgpu::StencilOperation::DecrementWrap,
    }
}

fn face(func: CompareFunction, ops: StencilFaceOps) -> wgpu::StencilFaceState {
    wgpu::StencilFaceState {
        compare: compare(func),
        fail_op: stencil_op(ops.fail),
        depth_fail_op: stencil_op(ops.depth_fail),
        pass_op: stencil_op(ops.pass),
    }
}

fn stencil_state(key: Option<StencilKey>) -> wgpu::StencilState {
    match key {
        Some(s) => wgpu::StencilState {
            front: face(s.compare, s.front),
            back: face(s.compare, s.back),
            read_mask: s.read_mask,
            write_mask: s.write_mask,
        },
        // Test disabled: always pass, never write.
        None => wgpu::StencilState {
            front: wgpu::StencilFaceState::IGNORE,
            back: wgpu::StencilFaceState::IGNORE,
            read_mask: 0,
            write_mask: 0,
        },
    }
}

// ── cache ─────────────────────────────────────────────────────────────────

/// Lazily built pipelines of the path shader, one per [`PipelineKey`].
pub(crate) struct PipelineCache {
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        uniform_bgl: &wgpu::BindGroupLayout,
        texture_bgl: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("strata path shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/path.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("strata pipeline layout"),
            bind_group_layouts: &[uniform_bgl, texture_bgl],
            // Newer wgpu uses immediate constants; keep disabled for now.
            immediate_size: 0,
        });

        Self {
            shader,
            layout,
            format,
            pipelines: HashMap::new(),
        }
    }

    /// Builds the pipeline for `key` unless it already exists.
    pub(crate) fn prepare(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let pipeline = self.create(device, &key);
        self.pipelines.insert(key, pipeline);
        log::debug!("pipeline created for {key:?} ({} cached)", self.pipelines.len());
    }

    #[inline]
    pub(crate) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    fn create(&self, device: &wgpu::Device, key: &PipelineKey) -> wgpu::RenderPipeline {
        let topology = match key.primitive {
            Primitive::List => wgpu::PrimitiveTopology::TriangleList,
            Primitive::Strip => wgpu::PrimitiveTopology::TriangleStrip,
        };
        let write_mask = if key.color_write {
            wgpu::ColorWrites::ALL
        } else {
            wgpu::ColorWrites::empty()
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("strata path pipeline"),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(blend_state(key.blend)),
                    write_mask,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: key.cull.then_some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: StencilBuffer::FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: stencil_state(key.stencil),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        })
    }
}
