//! Binding contract for the external encoder kernel.
//!
//! The per-block bit-packing shader is supplied by the caller as a
//! `wgpu::ShaderModule`; this crate never inspects its source. What it does
//! pin down is the interface both sides must agree on: entry-point names per
//! block-size variant, bind group slots, and the per-call parameter block.
//!
//! Group 0 is rebuilt every compress call:
//! - `@binding(0)` source texture (`texture_2d<f32>`, all mips)
//! - `@binding(1)` `EncodeParams` uniform
//! - `@binding(2)` preview surface (`rgba8unorm` write-only storage texture),
//!   present only when preview-decode is active
//!
//! Group 1 exists only for the 6x6 variant:
//! - `@binding(0)` quint-index table (read-only storage, 125 x f32)
//! - `@binding(1)` color-quant table (read-only storage, 256 x f32)
//!
//! The fragment output is one `vec4<u32>` block record per footprint pixel,
//! written to the intermediate `Rgba32Uint` attachment.

use crate::block::BlockSize;

/// Vertex entry point drawing the over-covering fullscreen triangle.
pub const VERTEX_ENTRY_POINT: &str = "vs_fullscreen";

/// Group 0 binding slots.
pub const BINDING_SOURCE_TEXTURE: u32 = 0;
pub const BINDING_ENCODE_PARAMS: u32 = 1;
pub const BINDING_PREVIEW_SURFACE: u32 = 2;

/// Group 1 (6x6 only) binding slots.
pub const BINDING_QUINT_TABLE: u32 = 0;
pub const BINDING_COLOR_QUANT_TABLE: u32 = 1;

impl BlockSize {
    /// Fragment entry point implementing this footprint's encoder variant.
    /// Closed dispatch table, resolved once at initialization.
    pub fn fragment_entry_point(self) -> &'static str {
        match self {
            BlockSize::Astc4x4 => "fs_encode_4x4",
            BlockSize::Astc5x5 => "fs_encode_5x5",
            BlockSize::Astc6x6 => "fs_encode_6x6",
        }
    }
}

/// Per-call kernel parameters, laid out to match the WGSL uniform struct.
///
/// `dest_rect` packs (width, height, 1/width, 1/height) of the destination
/// mip in texels; the reciprocals let the kernel turn normalized coordinates
/// into texel coordinates without a division per invocation. `srgb` enables
/// the gamma-correct encode variant and is re-evaluated on every call.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EncodeParams {
    pub dest_rect: [f32; 4],
    pub source_mip: u32,
    pub srgb: u32,
    pub _pad: [u32; 2],
}

impl EncodeParams {
    pub fn new(dest_width: u32, dest_height: u32, source_mip: u32, srgb: bool) -> Self {
        Self {
            dest_rect: [
                dest_width as f32,
                dest_height as f32,
                1.0 / dest_width as f32,
                1.0 / dest_height as f32,
            ],
            source_mip,
            srgb: srgb as u32,
            _pad: [0; 2],
        }
    }
}
