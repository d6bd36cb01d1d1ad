//! Quantization lookup tables for the 6x6 kernel variant.
//!
//! The ASTC bit-packing scheme for the 6x6 configuration quantizes weight
//! triplets through a quint-index table and color endpoints through a
//! 256-entry quantization table. Both are uploaded as read-only storage
//! buffers and sampled by index inside the kernel; every entry carries a
//! +0.5 bias so a truncating fetch on the GPU lands on the intended integer.
//!
//! The other kernel variants never reference these tables.

use lazy_static::lazy_static;
use static_assertions::const_assert_eq;

/// Entry count of the quint-index table (5^3 packed triplets).
pub const QUINT_TABLE_LEN: usize = 125;

/// Entry count of the color-endpoint quantization table.
pub const COLOR_QUANT_TABLE_LEN: usize = 256;

#[rustfmt::skip]
const RAW_QUINT_TABLE: [u32; QUINT_TABLE_LEN] = [
    0, 1, 2, 3, 4,       8, 9, 10, 11, 12,        16, 17, 18, 19, 20,      24, 25, 26, 27, 28,      5, 13, 21, 29, 6,
    32, 33, 34, 35, 36,  40, 41, 42, 43, 44,      48, 49, 50, 51, 52,      56, 57, 58, 59, 60,      37, 45, 53, 61, 14,
    64, 65, 66, 67, 68,  72, 73, 74, 75, 76,      80, 81, 82, 83, 84,      88, 89, 90, 91, 92,      69, 77, 85, 93, 22,
    96, 97, 98, 99, 100, 104, 105, 106, 107, 108, 112, 113, 114, 115, 116, 120, 121, 122, 123, 124, 101, 109, 117, 125, 30,
    102, 103, 70, 71, 38, 110, 111, 78, 79, 46,   118, 119, 86, 87, 54,    126, 127, 94, 95, 62,    39, 47, 55, 63, 31,
];

#[rustfmt::skip]
const RAW_COLOR_QUANT_TABLE: [u32; COLOR_QUANT_TABLE_LEN] = [
    0, 0, 16, 16, 16, 32, 32, 32, 48, 48, 48, 48, 64, 64, 64, 2,
    2, 2, 18, 18, 18, 34, 34, 34, 50, 50, 50, 50, 66, 66, 66, 4,
    4, 4, 20, 20, 20, 36, 36, 36, 36, 52, 52, 52, 68, 68, 68, 6,
    6, 6, 22, 22, 22, 38, 38, 38, 38, 54, 54, 54, 70, 70, 70, 8,
    8, 8, 24, 24, 24, 24, 40, 40, 40, 56, 56, 56, 72, 72, 72, 10,
    10, 10, 26, 26, 26, 26, 42, 42, 42, 58, 58, 58, 74, 74, 74, 12,
    12, 12, 12, 28, 28, 28, 44, 44, 44, 60, 60, 60, 76, 76, 76, 14,
    14, 14, 14, 30, 30, 30, 46, 46, 46, 62, 62, 62, 78, 78, 78, 78,
    79, 79, 79, 79, 63, 63, 63, 47, 47, 47, 31, 31, 31, 15, 15, 15,
    15, 77, 77, 77, 61, 61, 61, 45, 45, 45, 29, 29, 29, 13, 13, 13,
    13, 75, 75, 75, 59, 59, 59, 43, 43, 43, 27, 27, 27, 27, 11, 11,
    11, 73, 73, 73, 57, 57, 57, 41, 41, 41, 25, 25, 25, 25, 9, 9,
    9, 71, 71, 71, 55, 55, 55, 39, 39, 39, 39, 23, 23, 23, 7, 7,
    7, 69, 69, 69, 53, 53, 53, 37, 37, 37, 37, 21, 21, 21, 5, 5,
    5, 67, 67, 67, 51, 51, 51, 51, 35, 35, 35, 19, 19, 19, 3, 3,
    3, 65, 65, 65, 49, 49, 49, 49, 33, 33, 33, 17, 17, 17, 1, 1,
];

const_assert_eq!(RAW_QUINT_TABLE.len(), QUINT_TABLE_LEN);
const_assert_eq!(RAW_COLOR_QUANT_TABLE.len(), COLOR_QUANT_TABLE_LEN);

fn biased<const N: usize>(raw: &[u32; N]) -> [f32; N] {
    let mut out = [0.0f32; N];
    for (slot, value) in out.iter_mut().zip(raw.iter()) {
        *slot = *value as f32 + 0.5;
    }
    out
}

lazy_static! {
    static ref QUINT_TABLE: [f32; QUINT_TABLE_LEN] = biased(&RAW_QUINT_TABLE);
    static ref COLOR_QUANT_TABLE: [f32; COLOR_QUANT_TABLE_LEN] = biased(&RAW_COLOR_QUANT_TABLE);
}

/// Quint-index lookup table, biased for truncating GPU fetch.
pub fn quint_index_table() -> &'static [f32; QUINT_TABLE_LEN] {
    &QUINT_TABLE
}

/// Color-endpoint quantization table, biased for truncating GPU fetch.
pub fn color_quant_table() -> &'static [f32; COLOR_QUANT_TABLE_LEN] {
    &COLOR_QUANT_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quint_table_has_125_biased_entries() {
        let table = quint_index_table();
        assert_eq!(table.len(), 125);
        for (got, raw) in table.iter().zip(RAW_QUINT_TABLE.iter()) {
            assert_eq!(*got, *raw as f32 + 0.5);
        }
    }

    #[test]
    fn color_quant_table_has_256_biased_entries() {
        let table = color_quant_table();
        assert_eq!(table.len(), 256);
        for (got, raw) in table.iter().zip(RAW_COLOR_QUANT_TABLE.iter()) {
            assert_eq!(*got, *raw as f32 + 0.5);
        }
    }

    #[test]
    fn quint_table_is_a_permutation_of_seven_bit_codes() {
        let mut seen = [false; 128];
        for value in RAW_QUINT_TABLE {
            assert!(value < 128);
            assert!(!seen[value as usize], "duplicate quint code {value}");
            seen[value as usize] = true;
        }
    }

    #[test]
    fn color_quant_spot_values() {
        assert_eq!(quint_index_table()[0], 0.5);
        assert_eq!(quint_index_table()[124], 31.5);
        assert_eq!(color_quant_table()[0], 0.5);
        assert_eq!(color_quant_table()[255], 1.5);
    }
}
