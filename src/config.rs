//! Compressor configuration and runtime switches.

use crate::block::BlockSize;
use crate::error::{CompressError, CompressResult};

/// Immutable per-generation configuration. Changing any field requires a
/// reinitialize, which reallocates every dependent GPU resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressorConfig {
    pub width: u32,
    pub height: u32,
    pub block_size: BlockSize,
}

impl CompressorConfig {
    pub fn new(width: u32, height: u32, block_size: BlockSize) -> Self {
        Self {
            width,
            height,
            block_size,
        }
    }

    /// Checks that both dimensions are exact multiples of the block edge.
    pub fn validate(&self) -> CompressResult<()> {
        let edge = self.block_size.edge();
        if self.width == 0 || self.height == 0 || self.width % edge != 0 || self.height % edge != 0
        {
            return Err(CompressError::UnalignedSource {
                width: self.width,
                height: self.height,
                edge,
            });
        }
        Ok(())
    }

    /// Checks that every level of an `mip_count`-deep chain stays
    /// block-aligned, down to the smallest.
    pub fn validate_mip_chain(&self, mip_count: u32) -> CompressResult<()> {
        let edge = self.block_size.edge();
        let stride = edge << (mip_count.saturating_sub(1));
        if mip_count == 0 || self.width % stride != 0 || self.height % stride != 0 {
            return Err(CompressError::UnalignedMip {
                width: self.width,
                height: self.height,
                edge,
                mip_count,
            });
        }
        Ok(())
    }

    /// Width of the intermediate block-record surface.
    pub fn block_width(&self) -> u32 {
        self.width / self.block_size.edge()
    }

    /// Height of the intermediate block-record surface.
    pub fn block_height(&self) -> u32 {
        self.height / self.block_size.edge()
    }
}

/// Runtime switches, passed in explicitly so both branches of every toggle
/// stay testable without shared static state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressorSettings {
    /// Escape hatch for platforms without reliable compressed-texture
    /// support: when false, compression degrades to a plain region copy.
    pub enable_compression: bool,
    /// When the active backend cannot sample the compressed format, the
    /// kernel additionally decodes each block into a full-resolution preview
    /// surface and the copy step publishes that instead.
    pub decompress_preview: bool,
    /// Active color-management mode. The gamma-correct kernel variant runs
    /// only when this is true and the caller asks for sRGB-aware encoding.
    pub linear_color_space: bool,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            enable_compression: true,
            decompress_preview: false,
            linear_color_space: true,
        }
    }
}

impl CompressorSettings {
    /// Derives the preview-decode requirement from what the device actually
    /// supports instead of a build-type split.
    pub fn for_device(device: &wgpu::Device) -> Self {
        let astc_supported = device
            .features()
            .contains(wgpu::Features::TEXTURE_COMPRESSION_ASTC);
        if !astc_supported {
            log::warn!(
                "[CompressorSettings] backend cannot sample ASTC, enabling preview decode"
            );
        }
        Self {
            decompress_preview: !astc_supported,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_config_validates() {
        for size in BlockSize::ALL {
            let edge = size.edge();
            let config = CompressorConfig::new(edge * 13, edge * 7, size);
            assert!(config.validate().is_ok());
            assert_eq!(config.block_width(), 13);
            assert_eq!(config.block_height(), 7);
        }
    }

    #[test]
    fn misaligned_config_is_rejected() {
        let config = CompressorConfig::new(255, 256, BlockSize::Astc4x4);
        assert_eq!(
            config.validate(),
            Err(CompressError::UnalignedSource {
                width: 255,
                height: 256,
                edge: 4,
            })
        );
        assert!(CompressorConfig::new(0, 64, BlockSize::Astc4x4)
            .validate()
            .is_err());
    }

    #[test]
    fn mip_chain_must_stay_aligned_at_every_level() {
        let config = CompressorConfig::new(256, 256, BlockSize::Astc4x4);
        // 256 / 2^m stays a multiple of 4 down to m = 6 (mip dims 4x4).
        for mip_count in 1..=7 {
            assert!(config.validate_mip_chain(mip_count).is_ok());
        }
        assert!(config.validate_mip_chain(8).is_err());
        assert!(config.validate_mip_chain(0).is_err());
    }

    #[test]
    fn mip_chain_respects_odd_block_edges() {
        let config = CompressorConfig::new(240, 240, BlockSize::Astc5x5);
        assert!(config.validate_mip_chain(1).is_ok());
        // 240 / 2 = 120 is a multiple of 5, 240 / 4 = 60 as well,
        // 240 / 8 = 30, 240 / 16 = 15, but 240 / 32 is not whole.
        assert!(config.validate_mip_chain(5).is_ok());
        assert!(config.validate_mip_chain(6).is_err());
    }
}
