use std::num::NonZeroU64;

use crate::frame::FragUniforms;
use crate::render::{CommandExecutor, DeviceState, FramePacket, GpuCommand, Topology};
use crate::texture::{TextureId, TextureRegistry};

use super::error_scope::validated;
use super::pipeline::{PipelineCache, PipelineKey, ViewUniform, uniform_bind_group_layout};
use super::target::{RenderTarget, StencilBuffer};
use super::textures::WgpuTextures;
use super::Gpu;

/// wgpu executor: uploads a frame's vertices and uniform blocks and replays its
/// command list in a single render pass.
///
/// The target's color contents are kept; the stencil attachment is cleared at the
/// start of every replay.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    debug: bool,

    pipelines: PipelineCache,
    uniform_bgl: wgpu::BindGroupLayout,
    uniform_bind_group: Option<wgpu::BindGroup>,

    view_ubo: wgpu::Buffer,
    frag_ubo: Option<wgpu::Buffer>,
    frag_capacity: u64,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: u64,

    /// `[0, i, i + 1]` index triples; fans draw a prefix with a base vertex.
    fan_ibo: Option<wgpu::Buffer>,
    fan_capacity: u32,

    stencil: StencilBuffer,
}

impl WgpuBackend {
    pub fn new(gpu: &Gpu, textures: &WgpuTextures, format: wgpu::TextureFormat, debug: bool) -> Self {
        let device = gpu.device();
        let uniform_bgl = uniform_bind_group_layout(device);
        let pipelines = PipelineCache::new(device, format, &uniform_bgl, textures.bind_group_layout());

        let view_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("strata view ubo"),
            size: size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            device: device.clone(),
            queue: gpu.queue().clone(),
            debug,
            pipelines,
            uniform_bgl,
            uniform_bind_group: None,
            view_ubo,
            frag_ubo: None,
            frag_capacity: 0,
            vbo: None,
            vbo_capacity: 0,
            fan_ibo: None,
            fan_capacity: 0,
            stencil: StencilBuffer::default(),
        }
    }

    /// Executor drawing into `target`.
    pub fn pass<'a>(&'a mut self, target: RenderTarget<'a>) -> WgpuPass<'a> {
        WgpuPass { backend: self, target }
    }

    fn upload(&mut self, frame: &FramePacket<'_>) {
        let view = ViewUniform {
            size: [frame.viewport.width.max(1.0), frame.viewport.height.max(1.0)],
            edge_aa: if frame.antialias { 1.0 } else { 0.0 },
            _pad: 0.0,
        };
        self.queue.write_buffer(&self.view_ubo, 0, bytemuck::bytes_of(&view));

        let vertex_bytes: &[u8] = bytemuck::cast_slice(frame.vertices);
        self.ensure_vbo(vertex_bytes.len() as u64);
        if let Some(vbo) = self.vbo.as_ref() {
            self.queue.write_buffer(vbo, 0, vertex_bytes);
        }

        let frag_bytes = frame.uniforms.as_bytes();
        self.ensure_frag_ubo(frag_bytes.len() as u64);
        if let Some(ubo) = self.frag_ubo.as_ref() {
            self.queue.write_buffer(ubo, 0, frag_bytes);
        }
    }

    fn ensure_vbo(&mut self, required: u64) {
        if required <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }
        let size = required.next_power_of_two().max(16 * 1024);
        self.vbo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("strata vbo"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = size;
        log::debug!("vertex buffer grown to {size} bytes");
    }

    fn ensure_frag_ubo(&mut self, required: u64) {
        if required <= self.frag_capacity && self.frag_ubo.is_some() {
            return;
        }
        let size = required.next_power_of_two().max(16 * 1024);
        let ubo = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("strata frag ubo"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.uniform_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("strata uniform bind group"),
            layout: &self.uniform_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.view_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &ubo,
                        offset: 0,
                        size: NonZeroU64::new(FragUniforms::SIZE as u64),
                    }),
                },
            ],
        }));
        self.frag_ubo = Some(ubo);
        self.frag_capacity = size;
        log::debug!("uniform buffer grown to {size} bytes");
    }

    /// Makes the fan index buffer long enough for a fan of `vertices` vertices.
    fn ensure_fan_indices(&mut self, vertices: u32) {
        if vertices <= self.fan_capacity && self.fan_ibo.is_some() {
            return;
        }
        let capacity = vertices.next_power_of_two().max(64);
        let indices: Vec<u32> = (1..capacity - 1).flat_map(|i| [0, i, i + 1]).collect();

        let ibo = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("strata fan ibo"),
            size: (indices.len() * size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue.write_buffer(&ibo, 0, bytemuck::cast_slice(&indices));

        self.fan_ibo = Some(ibo);
        self.fan_capacity = capacity;
    }

    /// Builds every pipeline the frame needs and sizes the fan index buffer.
    fn prepare(&mut self, commands: &[GpuCommand]) {
        let mut state = DeviceState::default();
        let mut largest_fan = 0;
        for cmd in commands {
            match *cmd {
                GpuCommand::Draw { topology, count, .. } => {
                    self.pipelines.prepare(&self.device, PipelineKey::new(&state, topology));
                    if topology == Topology::TriangleFan {
                        largest_fan = largest_fan.max(count);
                    }
                }
                _ => state.apply(cmd),
            }
        }
        if largest_fan >= 3 {
            self.ensure_fan_indices(largest_fan);
        }
    }
}

/// One replay of a frame into a [`RenderTarget`].
pub struct WgpuPass<'a> {
    backend: &'a mut WgpuBackend,
    target: RenderTarget<'a>,
}

impl CommandExecutor<WgpuTextures> for WgpuPass<'_> {
    fn execute(&mut self, frame: &FramePacket<'_>, textures: &TextureRegistry<WgpuTextures>) {
        if !frame.commands.iter().any(GpuCommand::is_draw) {
            return;
        }

        let device = self.backend.device.clone();
        let debug = self.backend.debug;
        validated(&device, debug, "frame replay", || {
            replay(self.backend, &mut self.target, frame, textures);
        });
    }
}

fn replay(
    backend: &mut WgpuBackend,
    target: &mut RenderTarget<'_>,
    frame: &FramePacket<'_>,
    textures: &TextureRegistry<WgpuTextures>,
) {
    backend.upload(frame);
    backend.prepare(frame.commands);

    let (Some(vbo), Some(uniforms)) = (backend.vbo.as_ref(), backend.uniform_bind_group.as_ref()) else {
        return;
    };
    let stencil_view = backend.stencil.view(&backend.device, target.width, target.height);

    let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("strata path pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: stencil_view,
            depth_ops: None,
            stencil_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0),
                store: wgpu::StoreOp::Discard,
            }),
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    rpass.set_vertex_buffer(0, vbo.slice(..));
    if let Some(ibo) = backend.fan_ibo.as_ref() {
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
    }

    let mut state = DeviceState::default();
    let mut bound_key: Option<PipelineKey> = None;
    let mut bound_reference: Option<u32> = None;
    let mut bound_block: Option<usize> = None;
    let mut bound_texture: Option<TextureId> = None;

    for cmd in frame.commands {
        let GpuCommand::Draw { topology, first, count } = *cmd else {
            state.apply(cmd);
            continue;
        };

        let key = PipelineKey::new(&state, topology);
        if bound_key != Some(key) {
            let Some(pipeline) = backend.pipelines.get(&key) else {
                log::warn!("no pipeline for {key:?}; draw skipped");
                continue;
            };
            rpass.set_pipeline(pipeline);
            bound_key = Some(key);
        }

        let reference = state.stencil_func.reference;
        if bound_reference != Some(reference) {
            rpass.set_stencil_reference(reference);
            bound_reference = Some(reference);
        }

        if bound_block != Some(state.uniform_block) {
            let offset = frame.uniforms.byte_offset(state.uniform_block) as u32;
            rpass.set_bind_group(0, uniforms, &[offset]);
            bound_block = Some(state.uniform_block);
        }

        let Some(texture) = textures.resolve(state.texture) else {
            continue;
        };
        if bound_texture != Some(texture.id) {
            rpass.set_bind_group(1, texture.handle.bind_group(), &[]);
            bound_texture = Some(texture.id);
        }

        match topology {
            Topology::TriangleFan => {
                if count >= 3 {
                    rpass.draw_indexed(0..(count - 2) * 3, first as i32, 0..1);
                }
            }
            Topology::TriangleStrip | Topology::TriangleList => {
                rpass.draw(first..first + count, 0..1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn fan_indices_share_the_first_vertex() {
        let indices: Vec<u32> = (1..5u32 - 1).flat_map(|i| [0, i, i + 1]).collect();
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }
}
