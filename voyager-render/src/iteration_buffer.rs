use crate::tile::Tile;

/// Per-sample iteration counts for a full grid, row-major.
///
/// A count equal to `max_iterations` marks a sample that never escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationBuffer {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub data: Vec<u32>,
}

impl IterationBuffer {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            data: vec![max_iterations; size],
        }
    }

    /// Copy a tile's row-major counts into its slot in the buffer.
    pub fn blit_tile(&mut self, tile: &Tile, tile_data: &[u32]) {
        for ty in 0..tile.height {
            let buf_y = tile.y + ty;
            if buf_y >= self.height {
                break;
            }
            let dst_start = (buf_y * self.width + tile.x) as usize;
            let src_start = (ty * tile.width) as usize;
            let copy_w = tile.width.min(self.width - tile.x) as usize;
            self.data[dst_start..dst_start + copy_w]
                .copy_from_slice(&tile_data[src_start..src_start + copy_w]);
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn is_stable(&self, count: u32) -> bool {
        count >= self.max_iterations
    }

    /// Number of samples that reached the iteration cap.
    pub fn stable_count(&self) -> usize {
        self.data.iter().filter(|&&n| self.is_stable(n)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_all_stable() {
        let buf = IterationBuffer::new(3, 2, 50);
        assert_eq!(buf.data.len(), 6);
        assert_eq!(buf.stable_count(), 6);
    }

    #[test]
    fn blit_places_tile_rows() {
        let mut buf = IterationBuffer::new(4, 3, 10);
        let tile = Tile {
            x: 2,
            y: 1,
            width: 2,
            height: 2,
        };
        buf.blit_tile(&tile, &[1, 2, 3, 4]);
        assert_eq!(buf.get(2, 1), 1);
        assert_eq!(buf.get(3, 1), 2);
        assert_eq!(buf.get(2, 2), 3);
        assert_eq!(buf.get(3, 2), 4);
        assert_eq!(buf.get(0, 0), 10);
        assert_eq!(buf.stable_count(), 8);
    }
}
