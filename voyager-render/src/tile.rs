/// Edge length of a square tile, in samples.
pub const TILE_SIZE: u32 = 64;

/// A rectangular block of grid cells handed to one worker task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Grid x of the top-left cell.
    pub x: u32,
    /// Grid y of the top-left cell.
    pub y: u32,
    /// Width in cells (smaller at the right edge).
    pub width: u32,
    /// Height in cells (smaller at the bottom edge).
    pub height: u32,
}

impl Tile {
    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Split a `width × height` grid into row-major tiles of at most
/// [`TILE_SIZE`] cells per side.
pub fn build_tile_grid(width: u32, height: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < height {
        let th = TILE_SIZE.min(height - y);
        let mut x = 0;
        while x < width {
            let tw = TILE_SIZE.min(width - x);
            tiles.push(Tile {
                x,
                y,
                width: tw,
                height: th,
            });
            x += tw;
        }
        y += th;
    }
    tiles
}
