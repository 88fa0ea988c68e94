//! Floyd-Steinberg error diffusion dithering algorithm.
//!
//! Floyd-Steinberg is the most widely known error diffusion algorithm.
//! It distributes 100% of the quantization error to 4 neighbors.

use crate::palette::Palette;

use super::{dither_with_kernel, Dither, FLOYD_STEINBERG};

/// Floyd-Steinberg error diffusion dithering.
///
/// # Algorithm
///
/// The Floyd-Steinberg kernel distributes error to 4 neighbors:
///
/// ```text
///        X   7
///    3   5   1
/// ```
///
/// Weights: 7/16 right, 3/16 bottom-left, 5/16 bottom, 1/16 bottom-right.
/// Scanning is plain left-to-right on every row.
///
/// # Example
///
/// ```
/// use eink_dither::{Dither, FloydSteinberg, PALETTE};
///
/// let mut work = vec![200u8, 30, 30, 200, 30, 30];
/// let mut out = vec![0u8; work.len()];
/// FloydSteinberg.dither_in_place(&mut work, &mut out, 2, 1, &PALETTE);
/// assert_eq!(&out[..3], &[255, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FloydSteinberg;

impl Dither for FloydSteinberg {
    fn dither_in_place(
        &self,
        work: &mut [u8],
        out: &mut [u8],
        width: usize,
        height: usize,
        palette: &Palette,
    ) {
        dither_with_kernel(work, out, width, height, palette, &FLOYD_STEINBERG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb888;
    use crate::dither::dither_rgb888;
    use crate::palette::{PaletteColor, PALETTE};
    use pretty_assertions::assert_eq;

    fn solid(width: usize, height: usize, color: Rgb888) -> Vec<u8> {
        color.to_bytes().repeat(width * height)
    }

    fn run(src: &[u8], width: usize, height: usize) -> Vec<u8> {
        let mut dst = vec![0u8; src.len()];
        dither_rgb888(&FloydSteinberg, src, &mut dst, width, height, &PALETTE).unwrap();
        dst
    }

    fn indices(dst: &[u8]) -> Vec<usize> {
        dst.chunks(3)
            .map(|p| PALETTE.nearest_index(Rgb888::new(p[0], p[1], p[2])))
            .collect()
    }

    #[test]
    fn test_floyd_steinberg_mid_grey_checkerboard() {
        let src = solid(4, 4, Rgb888::new(128, 128, 128));
        let out = indices(&run(&src, 4, 4));

        #[rustfmt::skip]
        let expected = vec![
            1, 0, 1, 0,
            0, 1, 0, 1,
            1, 0, 1, 0,
            0, 1, 0, 1,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_floyd_steinberg_100_percent_propagation() {
        // Average brightness of the output should roughly match the input.
        let (width, height) = (16, 16);
        let src = solid(width, height, Rgb888::new(77, 77, 77));
        let out = run(&src, width, height);

        let white = indices(&out).iter().filter(|&&i| i == 1).count();
        let ratio = white as f32 / (width * height) as f32;
        assert!(
            (ratio - 77.0 / 255.0).abs() < 0.1,
            "Expected ~0.30 white ratio, got {ratio}"
        );
    }

    #[test]
    fn test_floyd_steinberg_exact_palette_colors_pass_through() {
        let mut src = Vec::new();
        for color in PaletteColor::ALL {
            src.extend_from_slice(&color.rgb().to_bytes());
        }
        let out = run(&src, 6, 1);
        assert_eq!(out, src);
    }

    #[test]
    fn test_floyd_steinberg_dark_red_center_goes_black() {
        // Dark red: the border stays red while the negative error it
        // leaves behind accumulates in the center pixel, which goes black.
        let src = solid(3, 3, Rgb888::new(200, 30, 30));
        let out = indices(&run(&src, 3, 3));
        #[rustfmt::skip]
        let expected = vec![
            2, 2, 2,
            2, 0, 2,
            2, 2, 2,
        ];
        assert_eq!(out, expected);
    }

    #[test]
    fn test_floyd_steinberg_single_column_skips_side_neighbors() {
        let src = solid(1, 5, Rgb888::new(128, 128, 128));
        let out = indices(&run(&src, 1, 5));
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|&i| i == 0 || i == 1));
    }
}
