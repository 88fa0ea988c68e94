//! Error diffusion kernel definitions.

/// An error diffusion kernel.
///
/// Each entry is an offset `(dx, dy)` from the current pixel and a weight.
/// A neighbor receives `error * weight / divisor`. Entries only point at
/// pixels later in scan order (`dy > 0`, or `dy == 0` and `dx > 0`).
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// (dx, dy, weight) entries for error diffusion.
    pub entries: &'static [(i32, i32, u8)],

    /// Total divisor for normalizing weights.
    pub divisor: u8,
}

impl Kernel {
    /// Sum of all weights. Equal to `divisor` when the kernel propagates
    /// the whole error.
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|&(_, _, w)| w as u32).sum()
    }
}

/// Floyd-Steinberg dithering kernel.
///
/// Distributes error to 4 neighbors with 100% total propagation (16/16).
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
};
