use std::collections::HashMap;

use wgpu::*;

use crate::controller::frame_loop::{FramePlan, GlobalUniform, ObjectUniform};
use crate::error::ShaderError;
use crate::utils::{MeshBuffer, Vertex};
use crate::view::gpu_init::GpuContext;
use crate::view::shader::ShaderProgram;
use crate::view::subroutine::SubroutineTable;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// The ground is always shaded with this model.
pub const GROUND_SUBROUTINE: &str = "Lambert";

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_layout_entry() -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding: 0,
        visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// A uniform buffer with its bind group.
pub struct UniformBinding {
    pub buffer: Buffer,
    pub bind_group: BindGroup,
}

impl UniformBinding {
    fn new(device: &Device, layout: &BindGroupLayout, label: &str, size: u64) -> Self {
        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
        });
        Self { buffer, bind_group }
    }
}

/// Index of a compiled shading variant inside [`ShadingPipelines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantHandle(usize);

/// Dispatch table: one pipeline per subroutine name, in fill mode and, when
/// the device can rasterize lines, in line mode.
pub struct ShadingPipelines {
    lookup: HashMap<String, usize>,
    fill: Vec<RenderPipeline>,
    line: Option<Vec<RenderPipeline>>,
}

impl ShadingPipelines {
    pub fn build(
        device: &Device,
        program: &ShaderProgram,
        table: &SubroutineTable,
        layout: &PipelineLayout,
        format: TextureFormat,
        wireframe: bool,
    ) -> Result<Self, ShaderError> {
        device.push_error_scope(ErrorFilter::Validation);

        let mut lookup = HashMap::new();
        let mut fill = Vec::new();
        let mut line = wireframe.then(Vec::new);
        for name in table.iter() {
            if lookup.contains_key(name) {
                continue;
            }
            lookup.insert(name.to_string(), fill.len());
            fill.push(create_variant_pipeline(device, layout, program, name, format, PolygonMode::Fill));
            if let Some(line) = line.as_mut() {
                line.push(create_variant_pipeline(device, layout, program, name, format, PolygonMode::Line));
            }
        }

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Device {
                label: "shading pipelines".to_string(),
                message: err.to_string(),
            });
        }

        tracing::debug!("Built {} shading pipelines (wireframe: {})", fill.len(), wireframe);
        Ok(Self { lookup, fill, line })
    }

    pub fn resolve(&self, name: &str) -> Option<VariantHandle> {
        self.lookup.get(name).copied().map(VariantHandle)
    }

    pub fn supports_wireframe(&self) -> bool {
        self.line.is_some()
    }

    pub fn pipeline(&self, handle: VariantHandle, wireframe: bool) -> &RenderPipeline {
        match (&self.line, wireframe) {
            (Some(line), true) => &line[handle.0],
            _ => &self.fill[handle.0],
        }
    }
}

fn create_variant_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    program: &ShaderProgram,
    entry_point: &str,
    format: TextureFormat,
    polygon_mode: PolygonMode,
) -> RenderPipeline {
    let label = format!("{entry_point} {polygon_mode:?}");
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(label.as_str()),
        layout: Some(layout),
        vertex: VertexState {
            module: &program.vertex,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &program.fragment,
            entry_point: Some(entry_point),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

#[derive(Debug, Clone, Copy)]
struct ActiveVariant {
    selection: usize,
    handle: VariantHandle,
}

/// GPU-side state for the two scene objects and the shading dispatch table
pub struct RenderState {
    depth_texture: Texture,
    depth_view: TextureView,
    clear_color: Color,

    pipelines: ShadingPipelines,
    ground_variant: VariantHandle,
    active: Option<ActiveVariant>,

    globals: UniformBinding,
    plane_uniforms: UniformBinding,
    mesh_uniforms: UniformBinding,
    plane_mesh: MeshBuffer,
    main_mesh: MeshBuffer,
}

impl RenderState {
    pub fn new(
        gpu: &GpuContext,
        program: &ShaderProgram,
        table: &SubroutineTable,
        plane_mesh: MeshBuffer,
        main_mesh: MeshBuffer,
        clear_color: [f64; 4],
    ) -> Result<Self, ShaderError> {
        let device = gpu.device.as_ref();
        let (width, height) = (gpu.config.width, gpu.config.height);

        let globals_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[uniform_layout_entry()],
        });
        let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("object_bgl"),
            entries: &[uniform_layout_entry()],
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("illumination_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let pipelines =
            ShadingPipelines::build(device, program, table, &pipeline_layout, gpu.format, gpu.supports_wireframe())?;
        if !pipelines.supports_wireframe() {
            tracing::warn!("POLYGON_MODE_LINE unsupported, wireframe toggle will draw filled");
        }
        let ground_variant = pipelines
            .resolve(GROUND_SUBROUTINE)
            .ok_or_else(|| ShaderError::MissingVariant(GROUND_SUBROUTINE.to_string()))?;

        let global_size = std::mem::size_of::<GlobalUniform>() as u64;
        let object_size = std::mem::size_of::<ObjectUniform>() as u64;
        let globals = UniformBinding::new(device, &globals_layout, "globals", global_size);
        let plane_uniforms = UniformBinding::new(device, &object_layout, "plane_uniforms", object_size);
        let mesh_uniforms = UniformBinding::new(device, &object_layout, "mesh_uniforms", object_size);

        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        let [r, g, b, a] = clear_color;

        Ok(Self {
            depth_texture,
            depth_view,
            clear_color: Color { r, g, b, a },
            pipelines,
            ground_variant,
            active: None,
            globals,
            plane_uniforms,
            mesh_uniforms,
            plane_mesh,
            main_mesh,
        })
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    /// Pipeline handle for the current selection. Resolved by name only when
    /// the selection index changes.
    fn active_variant(&mut self, selection: Option<(usize, &str)>) -> Option<VariantHandle> {
        let (index, name) = selection?;
        match self.active {
            Some(active) if active.selection == index => Some(active.handle),
            _ => {
                let handle = self.pipelines.resolve(name)?;
                tracing::debug!("Resolved subroutine {name} to {handle:?}");
                self.active = Some(ActiveVariant { selection: index, handle });
                Some(handle)
            }
        }
    }

    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        plan: &FramePlan,
    ) -> Result<(), SurfaceError> {
        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());

        queue.write_buffer(&self.globals.buffer, 0, bytemuck::bytes_of(&plan.globals));
        queue.write_buffer(&self.plane_uniforms.buffer, 0, bytemuck::bytes_of(&plan.plane));
        queue.write_buffer(&self.mesh_uniforms.buffer, 0, bytemuck::bytes_of(&plan.mesh));

        let mesh_variant = self.active_variant(plan.subroutine.as_ref().map(|(i, n)| (*i, n.as_str())));

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_bind_group(0, &self.globals.bind_group, &[]);

            // PLANE
            rp.set_pipeline(self.pipelines.pipeline(self.ground_variant, plan.wireframe));
            rp.set_bind_group(1, &self.plane_uniforms.bind_group, &[]);
            self.plane_mesh.draw(&mut rp);

            // MAIN MESH
            if let Some(handle) = mesh_variant {
                rp.set_pipeline(self.pipelines.pipeline(handle, plan.wireframe));
                rp.set_bind_group(1, &self.mesh_uniforms.bind_group, &[]);
                self.main_mesh.draw(&mut rp);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
