use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use voyager_core::{IterationEngine, RecurrenceKind, SampleGrid};

use crate::error::RenderError;
use crate::iteration_buffer::IterationBuffer;
use crate::tile::{build_tile_grid, Tile};

/// The result of sampling a full grid.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub iterations: IterationBuffer,
    pub elapsed: Duration,
    pub tiles_rendered: usize,
    pub kind: RecurrenceKind,
}

/// Distributes grid tiles over a fixed-size worker pool.
///
/// The pool is built once and never resized. Each pool task iterates with
/// its own clone of the engine, so rebinding state inside terms is never
/// touched by two samples at once.
pub struct Sampler {
    pool: rayon::ThreadPool,
}

impl Sampler {
    /// Build a pool of `threads` workers, or one per available core.
    pub fn new(threads: Option<usize>) -> Result<Self, RenderError> {
        let threads = threads.filter(|&n| n > 0).unwrap_or_else(default_threads);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("voyager-worker-{i}"))
            .build()?;
        debug!(threads, "sampler pool ready");
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Iterate every cell of `grid` and place each count in its grid slot.
    ///
    /// The first sample that fails aborts the render and is reported with
    /// its grid position.
    pub fn render(
        &self,
        engine: &IterationEngine,
        grid: &SampleGrid,
    ) -> Result<RenderResult, RenderError> {
        let start = Instant::now();
        let max_iterations = engine.params().max_iterations;

        let tiles = build_tile_grid(grid.width(), grid.height());
        let tile_count = tiles.len();
        debug!(
            tile_count,
            width = grid.width(),
            height = grid.height(),
            kind = %engine.kind(),
            "starting tiled render"
        );

        let tile_data: Vec<Vec<u32>> = self.pool.install(|| {
            tiles
                .par_iter()
                .map_init(|| engine.clone(), |engine, tile| render_tile(engine, grid, tile))
                .collect::<Result<_, _>>()
        })?;

        let mut iterations = IterationBuffer::new(grid.width(), grid.height(), max_iterations);
        for (tile, data) in tiles.iter().zip(&tile_data) {
            iterations.blit_tile(tile, data);
        }

        let elapsed = start.elapsed();
        info!(
            elapsed_ms = elapsed.as_millis(),
            tiles_rendered = tile_count,
            kind = %engine.kind(),
            stable = iterations.stable_count(),
            "render complete"
        );

        Ok(RenderResult {
            iterations,
            elapsed,
            tiles_rendered: tile_count,
            kind: engine.kind(),
        })
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Iterate one tile row-major.
fn render_tile(
    engine: &mut IterationEngine,
    grid: &SampleGrid,
    tile: &Tile,
) -> Result<Vec<u32>, RenderError> {
    let mut data = Vec::with_capacity(tile.sample_count());
    for ty in 0..tile.height {
        for tx in 0..tile.width {
            let (x, y) = (tile.x + tx, tile.y + ty);
            let count = engine
                .iterate(&grid.point(x, y))
                .map_err(|source| RenderError::Sample { x, y, source })?;
            data.push(count);
        }
    }
    Ok(data)
}
