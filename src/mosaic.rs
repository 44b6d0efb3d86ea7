//! End-of-round mosaic
//!
//! One tile per collected coin, shuffled, laid row-major into the smallest
//! square grid that fits them. The last row may be short.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::sim::Counts;

/// Tile color, one per coin kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileColor {
    Blue,
    Green,
    Red,
}

impl TileColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            TileColor::Blue => [0x1e, 0x6f, 0xe8],
            TileColor::Green => [0x2f, 0xb3, 0x4a],
            TileColor::Red => [0xe0, 0x2f, 0x2f],
        }
    }

    /// CSS color string for canvas fills
    pub fn css(self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Shuffled tile layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mosaic {
    side: usize,
    tiles: Vec<TileColor>,
}

/// Smallest `side` with `side * side >= total`
fn grid_side(total: usize) -> usize {
    let mut side = (total as f64).sqrt().ceil() as usize;
    while side * side < total {
        side += 1;
    }
    while side > 0 && (side - 1) * (side - 1) >= total {
        side -= 1;
    }
    side
}

/// Build a mosaic from collected counts, shuffling with `rng`
pub fn generate<R: Rng + ?Sized>(counts: &Counts, rng: &mut R) -> Mosaic {
    let mut tiles = Vec::with_capacity(counts.total() as usize);
    tiles.extend(std::iter::repeat_n(TileColor::Blue, counts.blue as usize));
    tiles.extend(std::iter::repeat_n(TileColor::Green, counts.green as usize));
    tiles.extend(std::iter::repeat_n(TileColor::Red, counts.red as usize));
    tiles.shuffle(rng);

    Mosaic {
        side: grid_side(tiles.len()),
        tiles,
    }
}

impl Mosaic {
    /// Grid width and height in tiles
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn total(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Flattened row-major tiles
    pub fn tiles(&self) -> &[TileColor] {
        &self.tiles
    }

    /// Tile at column `x`, row `y`; `None` for unused cells
    pub fn cell(&self, x: usize, y: usize) -> Option<TileColor> {
        if x >= self.side || y >= self.side {
            return None;
        }
        self.tiles.get(y * self.side + x).copied()
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[TileColor]> {
        self.tiles.chunks(self.side.max(1))
    }

    pub fn count(&self, color: TileColor) -> usize {
        self.tiles.iter().filter(|t| **t == color).count()
    }
}
