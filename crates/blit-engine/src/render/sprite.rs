use anyhow::Result;
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::paint::BlendMode;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::DrawList;
use crate::texture::TextureCreator;

use super::batch::{encode, SpriteInstance};
use super::common::{
    logical_clip_to_scissor, target_ubo_min_binding_size, QuadVertex, TargetUniform, QUAD_INDICES,
    QUAD_VERTICES,
};
use super::gpu_texture::{GpuTexture, GpuTextureCreator, TextureBindings, TextureFilter};

/// Replays a recorded [`DrawList`] onto the surface.
///
/// Every item becomes one instanced quad: texture copies sample their source
/// rect, shapes sample a built-in 1×1 white texture. There is one pipeline per
/// [`BlendMode`]; consecutive items sharing texture, blend mode and clip are
/// drawn with a single call.
///
/// The frame is cleared with the list's clear color even when nothing else was
/// recorded.
pub struct SpriteRenderer {
    bindings: TextureBindings,
    white: GpuTexture,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipelines: Option<[wgpu::RenderPipeline; 4]>,

    target_bgl: Option<wgpu::BindGroupLayout>,
    target_bind_group: Option<wgpu::BindGroup>,
    target_ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl SpriteRenderer {
    /// Creates the renderer and its texture bindings.
    ///
    /// Textures must be created through [`texture_creator`](Self::texture_creator)
    /// of the renderer that draws them.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, filter: TextureFilter) -> Result<Self> {
        let bindings = TextureBindings::new(device, filter);

        let white_px = RgbaImage::from_pixel(1, 1, image::Rgba([0xFF; 4]));
        let white = GpuTextureCreator::new(device, queue, &bindings)
            .create_texture(&white_px, "blit white")?;

        Ok(Self {
            bindings,
            white,
            pipeline_format: None,
            pipelines: None,
            target_bgl: None,
            target_bind_group: None,
            target_ubo: None,
            quad_vbo: None,
            quad_ibo: None,
            instance_vbo: None,
            instance_capacity: 0,
        })
    }

    /// Texture factory bound to this renderer's bind group layout.
    pub fn texture_creator<'a>(
        &'a self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
    ) -> GpuTextureCreator<'a> {
        GpuTextureCreator::new(device, queue, &self.bindings)
    }

    /// Clears `target` and draws everything recorded in `list`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        list: &DrawList<GpuTexture>,
    ) {
        self.ensure_pipelines(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx);

        let (instances, batches) = encode(list.items(), GpuTexture::size);

        // Mutating methods must happen before borrowing pipelines/buffers immutably.
        self.write_target_uniform(ctx);
        if !instances.is_empty() {
            self.ensure_instance_capacity(ctx, instances.len());
            if let Some(vbo) = self.instance_vbo.as_ref() {
                ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&instances));
            }
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blit sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(list.clear_color().to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if instances.is_empty() {
            return;
        }

        let Some(pipelines) = self.pipelines.as_ref() else { return };
        let Some(target_bind_group) = self.target_bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };

        rpass.set_bind_group(0, target_bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for batch in &batches {
            let Some((sx, sy, sw, sh)) =
                logical_clip_to_scissor(batch.clip, ctx.target, ctx.scale_factor)
            else {
                continue;
            };

            let texture = batch.texture.as_ref().unwrap_or(&self.white);
            rpass.set_pipeline(&pipelines[batch.blend.index()]);
            rpass.set_bind_group(1, texture.bind_group(), &[]);
            rpass.set_scissor_rect(sx, sy, sw, sh);
            rpass.draw_indexed(0..6, 0, batch.instances.clone());
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipelines.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let target_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit target bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: target_ubo_min_binding_size(),
                },
                count: None,
            }],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit sprite pipeline layout"),
            bind_group_layouts: &[&target_bgl, &self.bindings.layout],
            immediate_size: 0,
        });

        let pipelines = BlendMode::ALL.map(|mode| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("blit sprite pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[QuadVertex::layout(), SpriteInstance::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: mode.to_wgpu(),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        });

        log::debug!("sprite pipelines built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipelines = Some(pipelines);
        self.target_bgl = Some(target_bgl);

        self.target_bind_group = None;
        self.target_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.target_bind_group.is_some() && self.target_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.target_bgl.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blit target ubo"),
            size: std::mem::size_of::<TargetUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit target bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.target_ubo = Some(ubo);
        self.target_bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blit quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blit quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn write_target_uniform(&mut self, ctx: &RenderCtx<'_>) {
        let Some(ubo) = self.target_ubo.as_ref() else { return };
        let u = TargetUniform {
            size: [
                (ctx.target.width as f32).max(1.0),
                (ctx.target.height as f32).max(1.0),
            ],
            _pad: [0.0; 2],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required_instances: usize) {
        if required_instances <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required_instances.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<SpriteInstance>()) as u64;

        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("blit sprite instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}
