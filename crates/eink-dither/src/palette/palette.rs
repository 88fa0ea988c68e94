//! The fixed six-color palette.

use crate::color::Rgb888;

/// Number of entries in the palette.
pub const PALETTE_SIZE: usize = 6;

/// One of the six colors a panel can display.
///
/// The discriminant is the palette index. Order matters: when two entries
/// are equally close to a pixel, the one with the lower index wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PaletteColor {
    Black = 0,
    White = 1,
    Red = 2,
    Green = 3,
    Blue = 4,
    Yellow = 5,
}

impl PaletteColor {
    /// All entries in index order.
    pub const ALL: [PaletteColor; PALETTE_SIZE] = [
        PaletteColor::Black,
        PaletteColor::White,
        PaletteColor::Red,
        PaletteColor::Green,
        PaletteColor::Blue,
        PaletteColor::Yellow,
    ];

    /// Look up an entry by palette index.
    ///
    /// Returns `None` for indices outside `0..6`.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Palette index of this entry.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The RGB value this entry is rendered with.
    #[inline]
    pub fn rgb(self) -> Rgb888 {
        PALETTE.colors[self as usize]
    }

    /// Lowercase name, as used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            PaletteColor::Black => "black",
            PaletteColor::White => "white",
            PaletteColor::Red => "red",
            PaletteColor::Green => "green",
            PaletteColor::Blue => "blue",
            PaletteColor::Yellow => "yellow",
        }
    }
}

/// The six-color output palette.
///
/// There is exactly one instance, [`PALETTE`]; it cannot be modified.
///
/// # Example
///
/// ```
/// use eink_dither::{PaletteColor, Rgb888, PALETTE};
///
/// let nearest = PALETTE.find_nearest(Rgb888::new(250, 240, 20));
/// assert_eq!(nearest, PaletteColor::Yellow);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb888; PALETTE_SIZE],
}

/// Black, white, red, green, blue, yellow, in index order.
pub const PALETTE: Palette = Palette {
    colors: [
        Rgb888::new(0, 0, 0),
        Rgb888::new(255, 255, 255),
        Rgb888::new(255, 0, 0),
        Rgb888::new(0, 255, 0),
        Rgb888::new(0, 0, 255),
        Rgb888::new(255, 255, 0),
    ],
};

impl Palette {
    /// Number of colors (always 6).
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The RGB value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 6`.
    #[inline]
    pub fn color(&self, index: usize) -> Rgb888 {
        self.colors[index]
    }

    /// Iterate over the entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PaletteColor, Rgb888)> + '_ {
        self.colors
            .iter()
            .enumerate()
            .map(|(i, &rgb)| (PaletteColor::ALL[i], rgb))
    }

    /// Index of the entry closest to `pixel`.
    ///
    /// Linear scan with a strict `<` comparison: on an exact tie the
    /// earlier entry is kept.
    #[inline]
    pub fn nearest_index(&self, pixel: Rgb888) -> usize {
        let mut best = 0;
        let mut best_dist = u32::MAX;
        for (i, &entry) in self.colors.iter().enumerate() {
            let dist = pixel.distance_sq(entry);
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }

    /// Entry closest to `pixel`. See [`nearest_index`](Self::nearest_index).
    pub fn find_nearest(&self, pixel: Rgb888) -> PaletteColor {
        PaletteColor::ALL[self.nearest_index(pixel)]
    }
}

/// Index in `0..6` of the palette entry closest to `(r, g, b)`.
///
/// Total and deterministic over every byte triple; exact ties go to the
/// lowest index.
#[inline]
pub fn nearest_color(r: u8, g: u8, b: u8) -> usize {
    PALETTE.nearest_index(Rgb888::new(r, g, b))
}
