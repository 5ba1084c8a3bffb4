mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info, warn};

use voyager_core::{IterationEngine, PrecisionMode, RecurrenceKind};
use voyager_render::{export_png, Sampler};

use config::{CliError, RenderConfig, DEFAULT_CONFIG_PATH};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &std::path::Path) -> Result<(), CliError> {
    info!("Starting Fractal Voyager");
    let config = RenderConfig::load(path)?;

    let engine = IterationEngine::new(&config.engine)?;
    if config.engine.params.precision.mode == PrecisionMode::Hardware
        && matches!(engine.kind(), RecurrenceKind::General { .. })
    {
        warn!(
            "hardware precision only applies to the pure Mandelbrot recurrence; \
             iterating in arbitrary precision"
        );
    }
    info!(
        kind = %engine.kind(),
        formula = %config.engine.recurrence.describe(),
        "Engine configured"
    );

    let grid = config.grid.build(engine.bits())?;
    let sampler = Sampler::new(config.threads)?;
    info!(threads = sampler.threads(), "Rendering {}x{}", grid.width(), grid.height());

    let result = sampler.render(&engine, &grid)?;
    export_png(&result.iterations, &config.output, &config.export_metadata(&result))?;
    info!(
        elapsed_ms = result.elapsed.as_millis(),
        "Wrote {}",
        config.output.display()
    );
    Ok(())
}
