//! Error types for the compression pipeline.
//!
//! Configuration and alignment problems are deterministic caller mistakes and
//! surface synchronously at setup time, before any per-frame recording starts.
//! There are no transient failure modes here; GPU allocation failure is fatal
//! and propagates through wgpu's uncaptured-error path.

/// Result alias used throughout the crate.
pub type CompressResult<T> = Result<T, CompressError>;

/// Errors reported at initialization and output-texture creation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompressError {
    /// The requested block footprint is not one of the supported variants.
    #[error("unsupported ASTC block edge {edge} (supported: 4, 5, 6)")]
    UnsupportedBlockSize { edge: u32 },

    /// Source dimensions are not exact multiples of the block edge.
    #[error("source {width}x{height} is not aligned to the {edge}x{edge} block footprint")]
    UnalignedSource { width: u32, height: u32, edge: u32 },

    /// Some mip level of the requested chain breaks block alignment.
    #[error(
        "source {width}x{height} cannot hold {mip_count} mips of {edge}x{edge} blocks \
         (every level must stay a multiple of the block edge)"
    )]
    UnalignedMip {
        width: u32,
        height: u32,
        edge: u32,
        mip_count: u32,
    },
}
