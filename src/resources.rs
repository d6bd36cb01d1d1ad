//! GPU working set owned by one live compressor configuration.
//!
//! One generation of resources exists per (shader, config, preview) triple:
//! the intermediate block-record surface, the optional full-resolution
//! preview surface, the staging buffer bridging block records into the
//! compressed destination, and the kernel pipeline with its bind group
//! layouts. Reinitializing with an unchanged generation is a no-op; any
//! difference tears down the old set and rebuilds. The fullscreen triangle
//! survives every reinitialize.

use std::sync::OnceLock;

use wgpu::util::DeviceExt;

use crate::block::BYTES_PER_BLOCK;
use crate::config::{CompressorConfig, CompressorSettings};
use crate::error::CompressResult;
use crate::kernel;
use crate::tables;

/// Format of the intermediate surface: one 128-bit block record per texel.
pub const BLOCK_RECORD_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Uint;

/// Format of the preview surface and the expected fallback format when
/// preview decode is active (texture copies require matching formats).
pub const PREVIEW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A single clip-space triangle over-covering the viewport. One triangle
/// instead of a two-triangle quad, so no diagonal seam can show up.
const FULLSCREEN_TRIANGLE: [[f32; 2]; 3] = [[-1.0, -1.0], [-1.0, 3.0], [3.0, -1.0]];

const FULLSCREEN_VERTEX_ATTRS: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x2];

/// Rounds a row of block records up to the copy alignment wgpu demands.
pub(crate) fn aligned_bytes_per_row(width_blocks: u32) -> u32 {
    let bytes = width_blocks * BYTES_PER_BLOCK;
    bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Everything tied to one configuration generation.
pub(crate) struct WorkingSet {
    pub config: CompressorConfig,
    shader_id: wgpu::Id<wgpu::ShaderModule>,
    preview_active: bool,
    pub pipeline: wgpu::RenderPipeline,
    pub call_layout: wgpu::BindGroupLayout,
    /// Quantization tables, bound at group 1 for the 6x6 variant only.
    pub table_bind_group: Option<wgpu::BindGroup>,
    pub intermediate: wgpu::Texture,
    /// Derived handle, recomputed on first use after any reset. Never
    /// carried across generations.
    intermediate_view: OnceLock<wgpu::TextureView>,
    pub preview: Option<wgpu::Texture>,
    pub preview_view: Option<wgpu::TextureView>,
    pub staging: wgpu::Buffer,
}

impl WorkingSet {
    pub fn matches(
        &self,
        shader: &wgpu::ShaderModule,
        config: &CompressorConfig,
        settings: &CompressorSettings,
    ) -> bool {
        self.shader_id == shader.global_id()
            && self.config == *config
            && self.preview_active == settings.decompress_preview
    }

    pub fn intermediate_view(&self) -> &wgpu::TextureView {
        self.intermediate_view
            .get_or_init(|| self.intermediate.create_view(&wgpu::TextureViewDescriptor::default()))
    }
}

/// Owner of the GPU working set and the shared fullscreen mesh.
pub struct EncoderResources {
    fullscreen: Option<wgpu::Buffer>,
    set: Option<WorkingSet>,
}

impl Default for EncoderResources {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderResources {
    pub fn new() -> Self {
        Self {
            fullscreen: None,
            set: None,
        }
    }

    /// Builds (or reuses) the working set for `config`. An initialize that
    /// changes nothing reuses every live resource; otherwise the previous
    /// generation is dropped before the new one is allocated.
    pub fn initialize(
        &mut self,
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        config: CompressorConfig,
        settings: &CompressorSettings,
    ) -> CompressResult<()> {
        config.validate()?;

        if let Some(set) = &self.set {
            if set.matches(shader, &config, settings) {
                log::debug!("[EncoderResources] configuration unchanged, reusing working set");
                return Ok(());
            }
            log::debug!(
                "[EncoderResources] configuration changed, rebuilding \
                 ({}x{} {:?} -> {}x{} {:?})",
                set.config.width,
                set.config.height,
                set.config.block_size,
                config.width,
                config.height,
                config.block_size
            );
        }
        self.set = None;

        if self.fullscreen.is_none() {
            self.fullscreen = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("astc fullscreen triangle"),
                contents: bytemuck::cast_slice(&FULLSCREEN_TRIANGLE),
                usage: wgpu::BufferUsages::VERTEX,
            }));
        }

        self.set = Some(build_working_set(device, shader, config, settings));
        Ok(())
    }

    /// Releases every owned resource. Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.set.is_some() || self.fullscreen.is_some() {
            log::debug!("[EncoderResources] releasing working set");
        }
        self.set = None;
        self.fullscreen = None;
    }

    pub(crate) fn working_set(&self) -> Option<&WorkingSet> {
        self.set.as_ref()
    }

    pub(crate) fn fullscreen_buffer(&self) -> Option<&wgpu::Buffer> {
        self.fullscreen.as_ref()
    }
}

impl Drop for EncoderResources {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn build_working_set(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    config: CompressorConfig,
    settings: &CompressorSettings,
) -> WorkingSet {
    let block_width = config.block_width();
    let block_height = config.block_height();
    log::debug!(
        "[EncoderResources] allocating {}x{} block-record surface for {:?}",
        block_width,
        block_height,
        config.block_size
    );

    let intermediate = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("astc block records"),
        size: wgpu::Extent3d {
            width: block_width,
            height: block_height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: BLOCK_RECORD_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let (preview, preview_view) = if settings.decompress_preview {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("astc preview decode"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PREVIEW_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (Some(texture), Some(view))
    } else {
        (None, None)
    };

    // Staging sized for mip 0 also covers every smaller mip.
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("astc block staging"),
        size: aligned_bytes_per_row(block_width) as u64 * block_height as u64,
        usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let call_layout = create_call_layout(device, settings.decompress_preview);

    let (table_layout, table_bind_group) = if config.block_size.uses_quant_tables() {
        let (layout, bind_group) = create_table_bindings(device);
        (Some(layout), Some(bind_group))
    } else {
        (None, None)
    };

    let mut group_layouts = vec![&call_layout];
    if let Some(layout) = &table_layout {
        group_layouts.push(layout);
    }
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("astc encode layout"),
        bind_group_layouts: &group_layouts,
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("astc encode"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: kernel::VERTEX_ENTRY_POINT,
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &FULLSCREEN_VERTEX_ATTRS,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: config.block_size.fragment_entry_point(),
            targets: &[Some(wgpu::ColorTargetState {
                format: BLOCK_RECORD_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    WorkingSet {
        config,
        shader_id: shader.global_id(),
        preview_active: settings.decompress_preview,
        pipeline,
        call_layout,
        table_bind_group,
        intermediate,
        intermediate_view: OnceLock::new(),
        preview,
        preview_view,
        staging,
    }
}

fn create_call_layout(device: &wgpu::Device, preview: bool) -> wgpu::BindGroupLayout {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: kernel::BINDING_SOURCE_TEXTURE,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: kernel::BINDING_ENCODE_PARAMS,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
    ];
    if preview {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: kernel::BINDING_PREVIEW_SURFACE,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: PREVIEW_FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        });
    }
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("astc encode call"),
        entries: &entries,
    })
}

fn create_table_bindings(device: &wgpu::Device) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
    let storage_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("astc quant tables"),
        entries: &[
            storage_entry(kernel::BINDING_QUINT_TABLE),
            storage_entry(kernel::BINDING_COLOR_QUANT_TABLE),
        ],
    });

    let quint = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("astc quint table"),
        contents: bytemuck::cast_slice(tables::quint_index_table()),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let color = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("astc color quant table"),
        contents: bytemuck::cast_slice(tables::color_quant_table()),
        usage: wgpu::BufferUsages::STORAGE,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("astc quant tables"),
        layout: &layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: kernel::BINDING_QUINT_TABLE,
                resource: quint.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: kernel::BINDING_COLOR_QUANT_TABLE,
                resource: color.as_entire_binding(),
            },
        ],
    });
    (layout, bind_group)
}
