use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use image::RgbaImage;

use crate::coords::Size;
use crate::texture::TextureCreator;

/// Sampling filter used when textures are scaled.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

impl TextureFilter {
    fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
            TextureFilter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// GPU-resident RGBA texture with its bind group.
///
/// Cloning adds a reference; the GPU memory is released when the last clone is
/// dropped (after any frame that recorded it has been submitted).
#[derive(Clone)]
pub struct GpuTexture(Rc<GpuTextureInner>);

struct GpuTextureInner {
    label: String,
    size: Size,
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    #[inline]
    pub fn size(&self) -> Size {
        self.0.size
    }

    #[inline]
    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.0.bind_group
    }
}

impl PartialEq for GpuTexture {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for GpuTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuTexture")
            .field("label", &self.0.label)
            .field("size", &self.0.size)
            .finish()
    }
}

impl Drop for GpuTextureInner {
    fn drop(&mut self) {
        log::trace!("releasing GPU texture {}", self.label);
    }
}

/// Bind group layout + sampler shared by every sprite texture.
pub(super) struct TextureBindings {
    pub layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

impl TextureBindings {
    pub(super) fn new(device: &wgpu::Device, filter: TextureFilter) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit texture bgl"),
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
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter.to_wgpu(),
            min_filter: filter.to_wgpu(),
            ..Default::default()
        });

        Self { layout, sampler }
    }
}

/// Uploads decoded images as [`GpuTexture`]s on the render target's device.
pub struct GpuTextureCreator<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    bindings: &'a TextureBindings,
}

impl<'a> GpuTextureCreator<'a> {
    pub(super) fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        bindings: &'a TextureBindings,
    ) -> Self {
        Self { device, queue, bindings }
    }
}

impl TextureCreator for GpuTextureCreator<'_> {
    type Handle = GpuTexture;

    fn create_texture(&mut self, image: &RgbaImage, label: &str) -> Result<GpuTexture> {
        let (width, height) = image.dimensions();
        anyhow::ensure!(width > 0 && height > 0, "cannot create an empty texture");

        let max = self.device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            width <= max && height <= max,
            "{width}x{height} exceeds the device texture limit of {max}px"
        );

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bindings.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.bindings.sampler),
                },
            ],
        });

        log::debug!("uploaded texture {label} ({width}x{height})");

        Ok(GpuTexture(Rc::new(GpuTextureInner {
            label: label.to_string(),
            size: Size::new(width, height),
            _texture: texture,
            bind_group,
        })))
    }
}
