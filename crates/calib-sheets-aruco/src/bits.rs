//! Marker bit matrices and the packed byte encoding used by ArUco dictionaries.
//!
//! Marker bits are packed MSB-first in row-major order, contiguously across
//! bytes. When `N²` is not a multiple of 8, the bits of the final byte are
//! right-aligned (its unused high-order bits come first and are skipped).
//! A set bit is a white cell.

/// Square `N × N` grid of marker bits, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitMatrix {
    size: usize,
    bits: Vec<bool>,
}

impl BitMatrix {
    /// Build a matrix by evaluating `f(x, y)` for every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut bits = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                bits.push(f(x, y));
            }
        }
        Self { size, bits }
    }

    /// Side length `N`.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bit at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.size + x]
    }

    /// Row-major view of all bits.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Number of set (white) bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Surround the matrix with `border_bits` cells of background (black).
    pub fn bordered(&self, border_bits: usize) -> BorderedBitMatrix {
        BorderedBitMatrix {
            inner: self.clone(),
            border_bits,
        }
    }

    /// Pack into the dictionary byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let total = self.bits.len();
        let mut out = Vec::with_capacity(packed_len(self.size));
        let mut current = 0u8;
        let mut filled = 0;
        for &bit in &self.bits {
            current = (current << 1) | u8::from(bit);
            filled += 1;
            if filled == 8 {
                out.push(current);
                current = 0;
                filled = 0;
            }
        }
        if total % 8 != 0 {
            out.push(current);
        }
        out
    }
}

/// Number of bytes needed to store one `size × size` marker.
#[inline]
pub fn packed_len(size: usize) -> usize {
    (size * size).div_ceil(8)
}

/// Unpack one marker.
///
/// `bytes` must hold at least [`packed_len`]`(size)` bytes.
pub(crate) fn unpack_bits(bytes: &[u8], size: usize) -> BitMatrix {
    let total = size * size;
    let mut bits = Vec::with_capacity(total);
    let mut byte_idx = 0;
    let mut bit_idx = first_bit_in_byte(byte_idx, total);

    while bits.len() < total {
        bits.push(bytes[byte_idx] & (0x80 >> bit_idx) != 0);
        bit_idx += 1;
        if bit_idx == 8 && bits.len() < total {
            byte_idx += 1;
            bit_idx = first_bit_in_byte(byte_idx, total);
        }
    }

    BitMatrix { size, bits }
}

/// Offset of the first valid bit in byte `byte_idx`; non-zero only for a
/// final byte holding fewer than 8 bits.
#[inline]
fn first_bit_in_byte(byte_idx: usize, total: usize) -> usize {
    let end = 8 * (byte_idx + 1);
    end.saturating_sub(total)
}

/// A [`BitMatrix`] framed by a solid background border.
///
/// Coordinates are in the bordered frame: the inner bit `(x, y)` lives at
/// `(x + border_bits, y + border_bits)`. Any cell outside the inner matrix,
/// including cells beyond the border, reads as background (`false`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BorderedBitMatrix {
    inner: BitMatrix,
    border_bits: usize,
}

impl BorderedBitMatrix {
    /// Inner marker size `N`.
    #[inline]
    pub fn marker_size(&self) -> usize {
        self.inner.size
    }

    #[inline]
    pub fn border_bits(&self) -> usize {
        self.border_bits
    }

    /// Full side length `N + 2·border_bits`.
    #[inline]
    pub fn side(&self) -> usize {
        self.inner.size + 2 * self.border_bits
    }

    /// The unbordered bits.
    #[inline]
    pub fn inner(&self) -> &BitMatrix {
        &self.inner
    }

    /// Bit at bordered coordinates `(x, y)`.
    pub fn get(&self, x: isize, y: isize) -> bool {
        let b = self.border_bits as isize;
        let n = self.inner.size as isize;
        let (ix, iy) = (x - b, y - b);
        if ix < 0 || iy < 0 || ix >= n || iy >= n {
            return false;
        }
        self.inner.get(ix as usize, iy as usize)
    }
}
