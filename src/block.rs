//! ASTC block footprint selection.
//!
//! The block size decides which kernel variant runs, how the intermediate
//! block-record surface is dimensioned, and which compressed texture format
//! the output factory requests. The set is closed; anything else is a
//! configuration error, never a silent default.

use wgpu::{AstcBlock, AstcChannel, TextureFormat};

use crate::error::{CompressError, CompressResult};

/// Bytes in one packed ASTC block record (4 x 32-bit words) for every
/// supported footprint.
pub const BYTES_PER_BLOCK: u32 = 16;

/// Spatial footprint, in source texels, covered by one compressed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSize {
    Astc4x4,
    Astc5x5,
    Astc6x6,
}

impl BlockSize {
    /// All supported footprints, smallest first.
    pub const ALL: [BlockSize; 3] = [BlockSize::Astc4x4, BlockSize::Astc5x5, BlockSize::Astc6x6];

    /// Side length of the block footprint in source texels.
    pub fn edge(self) -> u32 {
        match self {
            BlockSize::Astc4x4 => 4,
            BlockSize::Astc5x5 => 5,
            BlockSize::Astc6x6 => 6,
        }
    }

    /// Parses a block edge length. Unrecognized edges are rejected.
    pub fn from_edge(edge: u32) -> CompressResult<Self> {
        match edge {
            4 => Ok(BlockSize::Astc4x4),
            5 => Ok(BlockSize::Astc5x5),
            6 => Ok(BlockSize::Astc6x6),
            _ => Err(CompressError::UnsupportedBlockSize { edge }),
        }
    }

    /// The compressed texture format produced for this footprint.
    pub fn texture_format(self, srgb: bool) -> TextureFormat {
        let block = match self {
            BlockSize::Astc4x4 => AstcBlock::B4x4,
            BlockSize::Astc5x5 => AstcBlock::B5x5,
            BlockSize::Astc6x6 => AstcBlock::B6x6,
        };
        let channel = if srgb {
            AstcChannel::UnormSrgb
        } else {
            AstcChannel::Unorm
        };
        TextureFormat::Astc { block, channel }
    }

    /// True when the kernel variant for this footprint consumes the
    /// quantization lookup tables.
    pub fn uses_quant_tables(self) -> bool {
        matches!(self, BlockSize::Astc6x6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_cover_supported_footprints() {
        assert_eq!(BlockSize::Astc4x4.edge(), 4);
        assert_eq!(BlockSize::Astc5x5.edge(), 5);
        assert_eq!(BlockSize::Astc6x6.edge(), 6);
    }

    #[test]
    fn from_edge_round_trips() {
        for size in BlockSize::ALL {
            assert_eq!(BlockSize::from_edge(size.edge()), Ok(size));
        }
    }

    #[test]
    fn from_edge_rejects_unknown() {
        for edge in [0, 1, 3, 7, 8, 12] {
            assert_eq!(
                BlockSize::from_edge(edge),
                Err(CompressError::UnsupportedBlockSize { edge })
            );
        }
    }

    #[test]
    fn texture_format_tracks_srgb() {
        assert_eq!(
            BlockSize::Astc4x4.texture_format(false),
            TextureFormat::Astc {
                block: AstcBlock::B4x4,
                channel: AstcChannel::Unorm,
            }
        );
        assert_eq!(
            BlockSize::Astc6x6.texture_format(true),
            TextureFormat::Astc {
                block: AstcBlock::B6x6,
                channel: AstcChannel::UnormSrgb,
            }
        );
    }

    #[test]
    fn only_6x6_uses_tables() {
        assert!(!BlockSize::Astc4x4.uses_quant_tables());
        assert!(!BlockSize::Astc5x5.uses_quant_tables());
        assert!(BlockSize::Astc6x6.uses_quant_tables());
    }
}
