use crate::constants::*;
use glam::Mat4;
use icefield_core::{DirectionalLight, Model, SceneRenderer, SceneState, ViewportMetrics};
use web_sys as web;

mod helpers;
mod mesh;
mod shadow;

use mesh::{GpuMesh, Vertex};
use shadow::ShadowPass;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    shadow: [f32; 4],
}

impl Globals {
    fn new(view_proj: Mat4, light: &DirectionalLight, shadow_texel: f32) -> Self {
        let dir = light.direction_to_light();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: light.shadow_view_projection().to_cols_array_2d(),
            light_dir: [dir.x, dir.y, dir.z, light.intensity],
            light_color: [light.color.x, light.color.y, light.color.z, AMBIENT_STRENGTH],
            shadow: [
                SHADOW_COMPARE_BIAS,
                shadow_texel,
                if light.cast_shadow { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// WebGPU scene renderer: a shadow depth pass, then a lit 4x MSAA pass
/// resolved onto a transparent canvas.
pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    mesh_bgl: wgpu::BindGroupLayout,
    lit_pipeline: wgpu::RenderPipeline,
    shadow: ShadowPass,
    _msaa_tex: wgpu::Texture,
    msaa_view: wgpu::TextureView,
    _depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,
    meshes: Vec<GpuMesh>,
}

impl GpuRenderer {
    pub async fn new(
        canvas: &web::HtmlCanvasElement,
        viewport: &ViewportMetrics,
        light: &DirectionalLight,
    ) -> anyhow::Result<Self> {
        let (width, height) = viewport.backing_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = helpers::pick_surface_format(&caps)
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: helpers::pick_alpha_mode(&caps),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let globals_buffer =
            helpers::uniform_buffer(&device, "globals", std::mem::size_of::<Globals>());
        let shadow = ShadowPass::new(&device, &shader, &globals_buffer, light.shadow.map_size);

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[
                helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Depth,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow.sampler),
                },
            ],
        });
        let mesh_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });

        let lit_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit_pl"),
            bind_group_layouts: &[&globals_bgl, &mesh_bgl],
            push_constant_ranges: &[],
        });
        let lit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit_pipeline"),
            layout: Some(&lit_pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: MSAA_SAMPLES,
                ..Default::default()
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let (msaa_tex, msaa_view) = helpers::create_texture(
            &device,
            "msaa_color",
            width,
            height,
            MSAA_SAMPLES,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let (depth_tex, depth_view) = helpers::create_texture(
            &device,
            "scene_depth",
            width,
            height,
            MSAA_SAMPLES,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        log::info!(
            "[gpu] {}x{} {:?} alpha={:?} msaa={} shadow_map={}",
            width,
            height,
            format,
            config.alpha_mode,
            MSAA_SAMPLES,
            shadow.size
        );
        Ok(Self {
            surface,
            device,
            queue,
            config,
            globals_buffer,
            globals_bind_group,
            mesh_bgl,
            lit_pipeline,
            shadow,
            _msaa_tex: msaa_tex,
            msaa_view,
            _depth_tex: depth_tex,
            depth_view,
            meshes: Vec::new(),
        })
    }

    fn acquire_frame(&mut self) -> anyhow::Result<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                Ok(self.surface.get_current_texture()?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl SceneRenderer for GpuRenderer {
    type Error = anyhow::Error;

    fn upload_model(&mut self, model: &Model) -> anyhow::Result<()> {
        self.meshes = model
            .meshes
            .iter()
            .filter_map(|m| GpuMesh::upload(&self.device, &self.mesh_bgl, m))
            .collect();
        if self.meshes.is_empty() {
            anyhow::bail!("model has no drawable triangles");
        }
        log::info!("[gpu] uploaded {} meshes", self.meshes.len());
        Ok(())
    }

    fn render(&mut self, scene: &SceneState) -> anyhow::Result<()> {
        let globals = Globals::new(
            scene.camera.view_projection(),
            &scene.light,
            1.0 / self.shadow.size.max(1) as f32,
        );
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let frame = self.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        if scene.light.cast_shadow {
            self.shadow.encode(&mut encoder, &self.meshes);
        }
        {
            let [r, g, b, a] = CLEAR_RGBA;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.msaa_view,
                    resolve_target: Some(&view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Discard,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.lit_pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            for mesh in &self.meshes {
                mesh.draw(&mut rpass, Some(1));
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
