//! Pipeline orchestrator: one encode dispatch + one logical copy per call.
//!
//! All GPU work is recorded into a caller-supplied command encoder and takes
//! effect when the caller submits it; nothing here blocks on the device.
//! Consecutive calls recorded into the same encoder execute in submission
//! order, which is what makes reusing the intermediate surfaces across calls
//! safe. Two orchestrators must never share surfaces; give each concurrent
//! compression stream its own `TextureCompressor`.

use wgpu::util::DeviceExt;

use crate::block::BlockSize;
use crate::config::{CompressorConfig, CompressorSettings};
use crate::error::CompressResult;
use crate::kernel::{self, EncodeParams};
use crate::output::{self, OutputTexture};
use crate::resources::{aligned_bytes_per_row, EncoderResources};

const NOT_INITIALIZED: &str = "TextureCompressor used before a successful initialize";

/// GPU texture compressor. Owns the working surfaces and records compression
/// passes; the destination texture and the encoder kernel belong to the
/// caller.
pub struct TextureCompressor {
    settings: CompressorSettings,
    resources: EncoderResources,
}

impl TextureCompressor {
    pub fn new(settings: CompressorSettings) -> Self {
        Self {
            settings,
            resources: EncoderResources::new(),
        }
    }

    /// Prepares the working set for `config` using the caller's encoder
    /// kernel. Calling again with an identical configuration is a cheap
    /// no-op; any change reallocates the dependent resources.
    pub fn initialize(
        &mut self,
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        config: CompressorConfig,
    ) -> CompressResult<()> {
        self.resources
            .initialize(device, shader, config, &self.settings)
    }

    /// Releases all GPU resources. Idempotent; dropping the compressor has
    /// the same effect.
    pub fn teardown(&mut self) {
        self.resources.teardown();
    }

    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }

    /// Replaces the runtime switches. A changed `decompress_preview` takes
    /// effect on the next `initialize`; the other flags apply immediately.
    pub fn set_settings(&mut self, settings: CompressorSettings) {
        self.settings = settings;
    }

    /// The live configuration, if initialized.
    pub fn config(&self) -> Option<CompressorConfig> {
        self.resources.working_set().map(|set| set.config)
    }

    pub fn block_size(&self) -> Option<BlockSize> {
        self.config().map(|config| config.block_size)
    }

    /// Dimensions of the intermediate block-record surface.
    pub fn intermediate_size(&self) -> Option<(u32, u32)> {
        self.config()
            .map(|config| (config.block_width(), config.block_height()))
    }

    /// The intermediate block-record texture, exposed for diagnostics.
    pub fn intermediate_texture(&self) -> Option<&wgpu::Texture> {
        self.resources.working_set().map(|set| &set.intermediate)
    }

    /// Creates the destination texture for the live configuration: the
    /// compressed format matching the block size, or `fallback_format` when
    /// compression is disabled or preview decode is active. Fails without
    /// creating anything if any mip level breaks block alignment.
    ///
    /// # Panics
    ///
    /// Panics if called before a successful `initialize`.
    pub fn create_output_texture(
        &self,
        device: &wgpu::Device,
        mip_count: u32,
        slice_count: u32,
        srgb: bool,
        fallback_format: wgpu::TextureFormat,
    ) -> CompressResult<OutputTexture> {
        let config = self.config().expect(NOT_INITIALIZED);
        output::create_output_texture(
            device,
            config,
            &self.settings,
            mip_count,
            slice_count,
            srgb,
            fallback_format,
        )
    }

    /// Records one compression of `source` mip `source_mip` into
    /// `(dest_slice, dest_mip)` of `dest`: exactly one kernel dispatch over
    /// the block footprint viewport plus one logical copy into the
    /// destination. With compression disabled this degrades to a plain
    /// region copy; with preview decode active the full-resolution decoded
    /// surface is published instead of the block records.
    ///
    /// The destination must match what `create_output_texture` produces for
    /// the live configuration; mismatched destinations are a precondition
    /// violation and are not validated here.
    ///
    /// # Panics
    ///
    /// Panics if called before a successful `initialize`.
    pub fn compress(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::Texture,
        source_mip: u32,
        dest: &wgpu::Texture,
        dest_slice: u32,
        dest_mip: u32,
        srgb: bool,
    ) {
        let set = self.resources.working_set().expect(NOT_INITIALIZED);
        let config = set.config;

        if !self.settings.enable_compression {
            encoder.copy_texture_to_texture(
                wgpu::ImageCopyTexture {
                    texture: source,
                    mip_level: source_mip,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyTexture {
                    texture: dest,
                    mip_level: dest_mip,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: dest_slice,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: config.width >> source_mip,
                    height: config.height >> source_mip,
                    depth_or_array_layers: 1,
                },
            );
            return;
        }

        let fullscreen = self.resources.fullscreen_buffer().expect(NOT_INITIALIZED);
        let viewport_width = config.block_width() >> source_mip;
        let viewport_height = config.block_height() >> source_mip;

        // Re-evaluated every call; the color-space mode can change between
        // calls and must never be baked into the pipeline.
        let gamma_correct = self.settings.linear_color_space && srgb;
        let params = EncodeParams::new(
            config.width >> source_mip,
            config.height >> source_mip,
            source_mip,
            gamma_correct,
        );
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("astc encode params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let source_view = source.create_view(&wgpu::TextureViewDescriptor::default());
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: kernel::BINDING_SOURCE_TEXTURE,
                resource: wgpu::BindingResource::TextureView(&source_view),
            },
            wgpu::BindGroupEntry {
                binding: kernel::BINDING_ENCODE_PARAMS,
                resource: params_buffer.as_entire_binding(),
            },
        ];
        if let Some(preview_view) = &set.preview_view {
            entries.push(wgpu::BindGroupEntry {
                binding: kernel::BINDING_PREVIEW_SURFACE,
                resource: wgpu::BindingResource::TextureView(preview_view),
            });
        }
        let call_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("astc encode call"),
            layout: &set.call_layout,
            entries: &entries,
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("astc encode"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: set.intermediate_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_viewport(
                0.0,
                0.0,
                viewport_width as f32,
                viewport_height as f32,
                0.0,
                1.0,
            );
            pass.set_scissor_rect(0, 0, viewport_width, viewport_height);
            pass.set_pipeline(&set.pipeline);
            pass.set_bind_group(0, &call_bind_group, &[]);
            if let Some(tables) = &set.table_bind_group {
                pass.set_bind_group(1, tables, &[]);
            }
            pass.set_vertex_buffer(0, fullscreen.slice(..));
            pass.draw(0..3, 0..1);
        }

        if let Some(preview) = &set.preview {
            // Publish the decoded texels at full source resolution.
            let edge = config.block_size.edge();
            encoder.copy_texture_to_texture(
                wgpu::ImageCopyTexture {
                    texture: preview,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyTexture {
                    texture: dest,
                    mip_level: dest_mip,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: dest_slice,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: viewport_width * edge,
                    height: viewport_height * edge,
                    depth_or_array_layers: 1,
                },
            );
        } else {
            // The destination is block-compressed; wgpu only allows
            // texture-to-texture copies between copy-compatible formats, so
            // the block records take a round trip through the staging buffer.
            let edge = config.block_size.edge();
            let layout = wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(aligned_bytes_per_row(viewport_width)),
                rows_per_image: None,
            };
            encoder.copy_texture_to_buffer(
                wgpu::ImageCopyTexture {
                    texture: &set.intermediate,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyBuffer {
                    buffer: &set.staging,
                    layout,
                },
                wgpu::Extent3d {
                    width: viewport_width,
                    height: viewport_height,
                    depth_or_array_layers: 1,
                },
            );
            encoder.copy_buffer_to_texture(
                wgpu::ImageCopyBuffer {
                    buffer: &set.staging,
                    layout,
                },
                wgpu::ImageCopyTexture {
                    texture: dest,
                    mip_level: dest_mip,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: dest_slice,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: viewport_width * edge,
                    height: viewport_height * edge,
                    depth_or_array_layers: 1,
                },
            );
        }
    }
}
