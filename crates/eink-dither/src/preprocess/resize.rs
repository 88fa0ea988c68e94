//! Fixed-point bilinear resampling.
//!
//! Coordinates and weights carry 10 fractional bits ([`FIXED_ONE`] = 1024),
//! so the whole resample runs without floating point.

use crate::color::BYTES_PER_PIXEL;
use crate::error::{rgb888_len, DitherError};

/// Number of fractional bits in coordinates and weights.
pub const FIXED_SHIFT: u32 = 10;

/// 1.0 in fixed point.
pub const FIXED_ONE: u64 = 1 << FIXED_SHIFT;

/// Resample `src` (`src_w x src_h`) into `dst` (`dst_w x dst_h`).
///
/// For destination pixel `(x, y)` the source coordinate is
/// `fx = x * (src_w * 1024 / dst_w)` (and likewise `fy`). The four
/// neighbors `(x1, y1)`, `(x1 + 1, y1)`, `(x1, y1 + 1)`, `(x1 + 1, y1 + 1)`
/// are blended by the fractional remainders; indices past the last
/// row/column are clamped to it. Scaling to the same size is exact.
///
/// # Errors
///
/// [`DitherError::InvalidDimensions`] if any dimension is zero or a slice
/// length is not `w * h * 3`. `dst` is not written in that case.
pub fn resize_bilinear(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    dst: &mut [u8],
    dst_w: usize,
    dst_h: usize,
) -> Result<(), DitherError> {
    if src.len() != rgb888_len(src_w, src_h)? || dst.len() != rgb888_len(dst_w, dst_h)? {
        return Err(DitherError::InvalidDimensions);
    }

    let scale_x = (src_w as u64 * FIXED_ONE) / dst_w as u64;
    let scale_y = (src_h as u64 * FIXED_ONE) / dst_h as u64;
    let last_x = src_w - 1;
    let last_y = src_h - 1;

    for y in 0..dst_h {
        let fy = y as u64 * scale_y;
        let y1 = ((fy >> FIXED_SHIFT) as usize).min(last_y);
        let y2 = (y1 + 1).min(last_y);
        let wy = fy - ((y1 as u64) << FIXED_SHIFT);
        let wy1 = FIXED_ONE - wy;

        let row1 = y1 * src_w;
        let row2 = y2 * src_w;

        for x in 0..dst_w {
            let fx = x as u64 * scale_x;
            let x1 = ((fx >> FIXED_SHIFT) as usize).min(last_x);
            let x2 = (x1 + 1).min(last_x);
            let wx = fx - ((x1 as u64) << FIXED_SHIFT);
            let wx1 = FIXED_ONE - wx;

            let top_left = (row1 + x1) * BYTES_PER_PIXEL;
            let top_right = (row1 + x2) * BYTES_PER_PIXEL;
            let bottom_left = (row2 + x1) * BYTES_PER_PIXEL;
            let bottom_right = (row2 + x2) * BYTES_PER_PIXEL;
            let out = (y * dst_w + x) * BYTES_PER_PIXEL;

            for c in 0..BYTES_PER_PIXEL {
                let acc = src[top_left + c] as u64 * wx1 * wy1
                    + src[top_right + c] as u64 * wx * wy1
                    + src[bottom_left + c] as u64 * wx1 * wy
                    + src[bottom_right + c] as u64 * wx * wy;
                dst[out + c] = (acc >> (2 * FIXED_SHIFT)).min(255) as u8;
            }
        }
    }

    Ok(())
}

/// Allocating variant of [`resize_bilinear`].
///
/// Returns a new `dst_w * dst_h * 3` buffer, or
/// [`DitherError::Allocation`] if it cannot be reserved.
pub fn scale_rgb888(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Result<Vec<u8>, DitherError> {
    let len = rgb888_len(dst_w, dst_h)?;
    let mut dst = Vec::new();
    dst.try_reserve_exact(len)
        .map_err(|_| DitherError::Allocation)?;
    dst.resize(len, 0);
    resize_bilinear(src, src_w, src_h, &mut dst, dst_w, dst_h)?;
    Ok(dst)
}
