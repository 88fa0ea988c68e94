//! Error diffusion dithering onto the six-color palette.
//!
//! # Architecture
//!
//! [`FloydSteinberg`] implements the [`Dither`] trait, which quantizes a
//! mutable working copy in place. [`dither_rgb888`] and
//! [`dither_rgb888_with_workspace`] wrap it: they validate buffer sizes,
//! set up the working copy and leave the source untouched.
//!
//! The working copy is a full-image RGB888 buffer rather than a window of
//! error rows: propagated error is folded straight into the neighbor's
//! bytes and clamped to `0..=255` on every update.
//!
//! # Example
//!
//! ```
//! use eink_dither::{dither_rgb888, FloydSteinberg, PALETTE};
//!
//! let src = vec![128u8; 4 * 4 * 3];
//! let mut dst = vec![0u8; src.len()];
//! dither_rgb888(&FloydSteinberg, &src, &mut dst, 4, 4, &PALETTE).unwrap();
//! assert!(dst.iter().all(|&v| v == 0 || v == 255));
//! ```

mod floyd_steinberg;
mod kernel;

pub use floyd_steinberg::FloydSteinberg;
pub use kernel::{Kernel, FLOYD_STEINBERG};

use crate::color::{Rgb888, BYTES_PER_PIXEL};
use crate::error::{rgb888_len, DitherError};
use crate::palette::Palette;

/// Trait for error diffusion dithering algorithms.
///
/// Error diffusion works by:
/// 1. For each pixel, find the nearest palette color
/// 2. Compute the quantization error (working value - palette value)
/// 3. Distribute that error to neighboring unprocessed pixels
///
/// Because error only ever moves to pixels later in scan order, a single
/// pass is enough and no decision is revisited.
pub trait Dither {
    /// Quantize `work` in scan order, writing the chosen palette colors to
    /// `out`.
    ///
    /// `work` is scratch space: diffused error is accumulated into it.
    /// Both slices must be exactly `width * height * 3` bytes.
    fn dither_in_place(
        &self,
        work: &mut [u8],
        out: &mut [u8],
        width: usize,
        height: usize,
        palette: &Palette,
    );
}

/// Dither `src` into `dst`, allocating a private working copy.
///
/// `src` and `dst` must both be `width * height * 3` bytes. On any error
/// (bad dimensions, working copy allocation failure) `dst` is left as it
/// was.
pub fn dither_rgb888<D: Dither + ?Sized>(
    ditherer: &D,
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    palette: &Palette,
) -> Result<(), DitherError> {
    let len = check_buffers(src, dst, width, height)?;

    let mut work = Vec::new();
    work.try_reserve_exact(len)
        .map_err(|_| DitherError::Allocation)?;
    work.extend_from_slice(src);

    ditherer.dither_in_place(&mut work, dst, width, height, palette);
    Ok(())
}

/// Dither `src` into `dst` using a caller-provided working buffer.
///
/// Lets the caller decide where the working copy lives. `work` is
/// overwritten with a copy of `src` first and holds garbage afterwards.
pub fn dither_rgb888_with_workspace<D: Dither + ?Sized>(
    ditherer: &D,
    src: &[u8],
    dst: &mut [u8],
    work: &mut [u8],
    width: usize,
    height: usize,
    palette: &Palette,
) -> Result<(), DitherError> {
    let len = check_buffers(src, dst, width, height)?;
    if work.len() != len {
        return Err(DitherError::InvalidDimensions);
    }
    work.copy_from_slice(src);

    ditherer.dither_in_place(work, dst, width, height, palette);
    Ok(())
}

fn check_buffers(
    src: &[u8],
    dst: &[u8],
    width: usize,
    height: usize,
) -> Result<usize, DitherError> {
    let len = rgb888_len(width, height)?;
    if src.len() != len || dst.len() != len {
        return Err(DitherError::InvalidDimensions);
    }
    Ok(len)
}

/// Add `error * weight / divisor` to one channel, clamped to `0..=255`.
///
/// Division truncates toward zero, so small negative errors vanish the
/// same way small positive ones do.
#[inline]
fn diffuse_channel(value: u8, error: i32, weight: i32, divisor: i32) -> u8 {
    (value as i32 + error * weight / divisor).clamp(0, 255) as u8
}

/// Core error diffusion loop parameterized by kernel.
///
/// Scans row-major, left to right, top to bottom. Kernel taps that land
/// outside the image are skipped (no wraparound).
pub(crate) fn dither_with_kernel(
    work: &mut [u8],
    out: &mut [u8],
    width: usize,
    height: usize,
    palette: &Palette,
    kernel: &Kernel,
) {
    let divisor = kernel.divisor as i32;

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let pixel = Rgb888::read(work, idx);

            let chosen = palette.color(palette.nearest_index(pixel));
            chosen.write(out, idx);

            let error = [
                pixel.r as i32 - chosen.r as i32,
                pixel.g as i32 - chosen.g as i32,
                pixel.b as i32 - chosen.b as i32,
            ];
            if error == [0, 0, 0] {
                continue;
            }

            for &(dx, dy, weight) in kernel.entries {
                let nx = x as i64 + dx as i64;
                let ny = y as i64 + dy as i64;
                if nx < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let n = (ny as usize * width + nx as usize) * BYTES_PER_PIXEL;
                for c in 0..BYTES_PER_PIXEL {
                    work[n + c] = diffuse_channel(work[n + c], error[c], weight as i32, divisor);
                }
            }
        }
    }
}
