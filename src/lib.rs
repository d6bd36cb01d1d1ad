//! Real-time GPU ASTC texture compression for wgpu.
//!
//! Compresses a source texture into an ASTC block-compressed texture entirely
//! on the GPU: a fragment pass packs one 128-bit block record per footprint
//! into an intermediate surface, and a copy step moves the records into the
//! caller's destination texture at the requested mip and array slice. The
//! compressed bytes never touch the host.
//!
//! The per-block bit-packing shader is supplied by the caller as a
//! `wgpu::ShaderModule` satisfying the contract in [`kernel`]. Platforms that
//! cannot sample ASTC get a preview-decode path (the kernel also writes fully
//! decoded texels into a storage surface, which is published instead), and a
//! global escape hatch degrades compression to a plain region copy.
//!
//! ```no_run
//! # fn demo(device: &wgpu::Device, shader: &wgpu::ShaderModule,
//! #        source: &wgpu::Texture) -> gpu_astc::CompressResult<()> {
//! use gpu_astc::{BlockSize, CompressorConfig, CompressorSettings, TextureCompressor};
//!
//! let mut compressor = TextureCompressor::new(CompressorSettings::for_device(device));
//! compressor.initialize(device, shader, CompressorConfig::new(256, 256, BlockSize::Astc4x4))?;
//!
//! let output = compressor.create_output_texture(
//!     device, 1, 1, false, wgpu::TextureFormat::Rgba8Unorm)?;
//! let mut encoder = device.create_command_encoder(&Default::default());
//! compressor.compress(device, &mut encoder, source, 0, &output.texture, 0, 0, false);
//! // submit `encoder` on the queue; ordering within it is submission order
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod compressor;
pub mod config;
pub mod error;
pub mod kernel;
pub mod output;
pub mod resources;
pub mod tables;

pub use block::{BlockSize, BYTES_PER_BLOCK};
pub use compressor::TextureCompressor;
pub use config::{CompressorConfig, CompressorSettings};
pub use error::{CompressError, CompressResult};
pub use kernel::EncodeParams;
pub use output::OutputTexture;
pub use resources::{EncoderResources, BLOCK_RECORD_FORMAT, PREVIEW_FORMAT};
