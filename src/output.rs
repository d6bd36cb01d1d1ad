//! Destination texture creation.
//!
//! The output factory picks the compressed format matching the live block
//! size, falls back to the caller's uncompressed format whenever the
//! destination has to hold plain texels (compression disabled or preview
//! decode active), and refuses to create anything whose mip chain would
//! break block alignment. wgpu textures carry no host-readable backing, so
//! the resource is GPU-only from the moment it exists.

use crate::config::{CompressorConfig, CompressorSettings};
use crate::error::CompressResult;

/// Destination resource plus its fixed sampling state. Ownership belongs to
/// the caller; the compressor only writes into it.
pub struct OutputTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

pub(crate) fn select_format(
    config: &CompressorConfig,
    settings: &CompressorSettings,
    srgb: bool,
    fallback_format: wgpu::TextureFormat,
) -> wgpu::TextureFormat {
    if !settings.enable_compression || settings.decompress_preview {
        fallback_format
    } else {
        config.block_size.texture_format(srgb)
    }
}

pub(crate) fn create_output_texture(
    device: &wgpu::Device,
    config: CompressorConfig,
    settings: &CompressorSettings,
    mip_count: u32,
    slice_count: u32,
    srgb: bool,
    fallback_format: wgpu::TextureFormat,
) -> CompressResult<OutputTexture> {
    config.validate_mip_chain(mip_count)?;
    let format = select_format(&config, settings, srgb, fallback_format);
    log::debug!(
        "[OutputTexture] creating {}x{} x{} slices, {} mips, {:?}",
        config.width,
        config.height,
        slice_count,
        mip_count,
        format
    );

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("astc output"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: slice_count.max(1),
        },
        mip_level_count: mip_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(if slice_count > 1 {
            wgpu::TextureViewDimension::D2Array
        } else {
            wgpu::TextureViewDimension::D2
        }),
        ..Default::default()
    });

    // Fixed policy for compressed output: trilinear filtering, clamped
    // addressing.
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("astc output sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });

    Ok(OutputTexture {
        texture,
        view,
        sampler,
    })
}
