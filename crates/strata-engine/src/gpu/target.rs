/// Target for drawing (encoder + color view + its size in physical pixels).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            encoder,
            color_view,
            width,
            height,
        }
    }
}

/// Stencil attachment matching the current target size.
///
/// Recreated only when the target size changes; its contents never outlive a
/// pass.
#[derive(Default)]
pub(crate) struct StencilBuffer {
    view: Option<wgpu::TextureView>,
    size: (u32, u32),
}

impl StencilBuffer {
    pub(crate) const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Stencil8;

    pub(crate) fn view(&mut self, device: &wgpu::Device, width: u32, height: u32) -> &wgpu::TextureView {
        let size = (width.max(1), height.max(1));
        if self.size != size {
            self.view = None;
        }

        self.view.get_or_insert_with(|| {
            log::debug!("stencil buffer resized to {}x{}", size.0, size.1);
            self.size = size;
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("strata stencil"),
                size: wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Self::FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            texture.create_view(&wgpu::TextureViewDescriptor::default())
        })
    }
}
