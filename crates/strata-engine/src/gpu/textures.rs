use crate::error::RenderError;
use crate::texture::{
    TextureBackend, TextureDesc, TextureFlags, TextureKind, TextureRegion, mip_chain,
    mip_level_count,
};

use super::Gpu;
use super::error_scope::validated;
use super::pipeline::texture_bind_group_layout;

/// GPU side of one registered texture.
pub struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    /// CPU copy of level 0, kept for mipmapped textures so partial updates can
    /// rebuild the chain.
    shadow: Option<Vec<u8>>,
}

impl GpuTexture {
    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// wgpu texture storage.
///
/// wgpu has no mipmap generation, so mip chains are built on the CPU (box
/// filter) and uploaded level by level.
pub struct WgpuTextures {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    debug: bool,
}

impl WgpuTextures {
    pub fn new(gpu: &Gpu, debug: bool) -> Self {
        Self {
            device: gpu.device().clone(),
            queue: gpu.queue().clone(),
            layout: texture_bind_group_layout(gpu.device()),
            debug,
        }
    }

    pub(crate) fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Wraps a texture owned elsewhere, for
    /// [`TextureRegistry::register_external`](crate::texture::TextureRegistry::register_external).
    ///
    /// The texture needs `TEXTURE_BINDING` usage and a filterable float format.
    pub fn wrap(&self, texture: wgpu::Texture, flags: TextureFlags) -> GpuTexture {
        let bind_group = self.bind(&texture, flags);
        GpuTexture {
            texture,
            bind_group,
            shadow: None,
        }
    }

    fn bind(&self, texture: &wgpu::Texture, flags: TextureFlags) -> wgpu::BindGroup {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&sampler_descriptor(flags));
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("strata texture bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }

    /// Writes `region` of mip `level`, reading `data` from `offset` with rows
    /// `bytes_per_row` apart.
    fn write(
        &self,
        texture: &wgpu::Texture,
        level: u32,
        region: TextureRegion,
        offset: u64,
        bytes_per_row: u32,
        data: &[u8],
    ) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: level,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: region.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(region.height),
            },
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn write_mips(&self, texture: &wgpu::Texture, desc: &TextureDesc, base: &[u8]) {
        let bpp = desc.kind.bytes_per_pixel();
        for (i, level) in mip_chain(base, desc.width, desc.height, bpp).iter().enumerate() {
            let region = TextureRegion::new(0, 0, level.width, level.height);
            self.write(texture, i as u32 + 1, region, 0, level.width * bpp as u32, &level.pixels);
        }
    }
}

fn format(kind: TextureKind) -> wgpu::TextureFormat {
    match kind {
        TextureKind::Rgba => wgpu::TextureFormat::Rgba8Unorm,
        TextureKind::Alpha => wgpu::TextureFormat::R8Unorm,
    }
}

fn sampler_descriptor(flags: TextureFlags) -> wgpu::SamplerDescriptor<'static> {
    let address = |repeat| {
        if repeat {
            wgpu::AddressMode::Repeat
        } else {
            wgpu::AddressMode::ClampToEdge
        }
    };
    let nearest = flags.contains(TextureFlags::NEAREST);
    let filter = if nearest { wgpu::FilterMode::Nearest } else { wgpu::FilterMode::Linear };
    let mipmap_filter = if nearest { wgpu::MipmapFilterMode::Nearest } else { wgpu::MipmapFilterMode::Linear };

    wgpu::SamplerDescriptor {
        label: Some("strata texture sampler"),
        address_mode_u: address(flags.contains(TextureFlags::REPEAT_X)),
        address_mode_v: address(flags.contains(TextureFlags::REPEAT_Y)),
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter,
        ..Default::default()
    }
}

impl TextureBackend for WgpuTextures {
    type Handle = GpuTexture;

    fn create(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<GpuTexture, RenderError> {
        let mipmaps = desc.flags.contains(TextureFlags::GENERATE_MIPMAPS);
        let mip_level_count = if mipmaps { mip_level_count(desc.width, desc.height) } else { 1 };
        if data.is_some_and(|d| d.len() < desc.byte_len()) {
            return Err(RenderError::InvalidTexture(format!(
                "pixel buffer too short for {}x{} {:?}",
                desc.width, desc.height, desc.kind
            )));
        }

        validated(&self.device, self.debug, "texture create", || {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("strata texture"),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: format(desc.kind),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            let shadow = mipmaps.then(|| match data {
                Some(d) => d[..desc.byte_len()].to_vec(),
                None => vec![0; desc.byte_len()],
            });

            if let Some(data) = data {
                let full = TextureRegion::full(desc);
                let row = desc.width * desc.kind.bytes_per_pixel() as u32;
                self.write(&texture, 0, full, 0, row, &data[..desc.byte_len()]);
                if mipmaps {
                    self.write_mips(&texture, desc, data);
                }
            }

            let bind_group = self.bind(&texture, desc.flags);
            Ok(GpuTexture {
                texture,
                bind_group,
                shadow,
            })
        })
    }

    fn update(
        &mut self,
        handle: &mut GpuTexture,
        desc: &TextureDesc,
        region: TextureRegion,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let layout = region.validate(desc, data)?;

        validated(&self.device, self.debug, "texture update", || {
            self.write(
                &handle.texture,
                0,
                region,
                layout.offset as u64,
                layout.bytes_per_row,
                data,
            );

            if let Some(shadow) = handle.shadow.as_mut() {
                region.copy_into(desc, layout, data, shadow);
                self.write_mips(&handle.texture, desc, shadow);
            }
        });
        Ok(())
    }

    fn destroy(&mut self, handle: GpuTexture) {
        handle.texture.destroy();
    }
}
