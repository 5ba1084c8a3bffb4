use voyager_core::{
    ArithmeticError, BigComplex, CoefficientConfig, ComplexLiteral, EngineConfig, IterationEngine,
    IterationParams, Precision, PrecisionMode, RecurrenceKind, SampleGrid, TermConfig,
};

/// Iterate every cell of a grid on one thread and collect counts row-major.
fn render_grid(
    engine: &mut IterationEngine,
    grid: &SampleGrid,
) -> Result<Vec<u32>, ArithmeticError> {
    let mut counts = Vec::with_capacity(grid.len());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            counts.push(engine.iterate(&grid.point(x, y))?);
        }
    }
    Ok(counts)
}

fn params(mode: PrecisionMode) -> IterationParams {
    IterationParams::new(64, Precision::new(20, mode).unwrap(), 2.0).unwrap()
}

fn engine(mode: PrecisionMode) -> IterationEngine {
    IterationEngine::new(&EngineConfig::mandelbrot(params(mode))).unwrap()
}

fn overview(bits: u32) -> SampleGrid {
    SampleGrid::parse("-0.75", "0", "0.08", 40, 30, bits).unwrap()
}

#[test]
fn headless_mandelbrot_render() {
    let mut engine = engine(PrecisionMode::Arbitrary);
    let grid = overview(engine.bits());

    let counts = render_grid(&mut engine, &grid).unwrap();

    assert_eq!(counts.len(), 40 * 30);
    let stable = counts.iter().filter(|&&n| n == 64).count();
    assert!(stable > 0, "should have some stable samples");
    assert!(stable < counts.len(), "should have some escaped samples");
}

#[test]
fn hardware_and_arbitrary_paths_agree_on_overview() {
    let mut hardware = engine(PrecisionMode::Hardware);
    let mut arbitrary = engine(PrecisionMode::Arbitrary);
    assert_eq!(hardware.kind(), RecurrenceKind::PureMandelbrotHardware);

    // Exactly representable coordinates keep both paths on the same orbit.
    let grid = SampleGrid::parse("-0.5", "0", "0.125", 24, 16, arbitrary.bits()).unwrap();
    let fast = render_grid(&mut hardware, &grid).unwrap();
    let slow = render_grid(&mut arbitrary, &grid).unwrap();
    let differing = fast.iter().zip(&slow).filter(|(a, b)| a != b).count();
    // Orbits near the boundary may diverge once rounding differs.
    assert!(differing * 20 < fast.len(), "{differing} of {} differ", fast.len());
}

#[test]
fn headless_render_is_deterministic() {
    let config = EngineConfig::mandelbrot(params(PrecisionMode::Arbitrary));
    let mut first = IterationEngine::new(&config).unwrap();
    let mut second = IterationEngine::new(&config).unwrap();
    let grid = overview(first.bits());

    assert_eq!(
        render_grid(&mut first, &grid).unwrap(),
        render_grid(&mut second, &grid).unwrap(),
        "two identical renders must produce identical results"
    );
}

#[test]
fn headless_general_render() {
    // z ← (z² + sin(z)·0.25 + c)
    let mut config = EngineConfig::mandelbrot(params(PrecisionMode::Arbitrary));
    config.recurrence.terms.push(TermConfig {
        function: "sin".into(),
        b: ComplexLiteral::real("0.25"),
        a: ComplexLiteral::one(),
        t: ComplexLiteral::one(),
        p: ComplexLiteral::one(),
        q: ComplexLiteral::one(),
        extras: vec![],
        substitute: vec![false, false, true, false, false],
    });
    let mut engine = IterationEngine::new(&config).unwrap();
    assert_eq!(engine.kind(), RecurrenceKind::General { terms: 2 });

    let grid = SampleGrid::parse("-0.5", "0", "0.2", 16, 12, engine.bits()).unwrap();
    let counts = render_grid(&mut engine, &grid).unwrap();
    assert!(counts.iter().any(|&n| n == 64));
    assert!(counts.iter().any(|&n| n < 64));
}

#[test]
fn headless_division_by_zero_surfaces() {
    let mut config = EngineConfig::mandelbrot(params(PrecisionMode::Arbitrary));
    config.recurrence.denominator = CoefficientConfig::substituted(ComplexLiteral::one());
    let mut engine = IterationEngine::new(&config).unwrap();
    let c = BigComplex::from_f64(engine.bits(), 0.25, 0.0);
    assert_eq!(engine.iterate(&c), Err(ArithmeticError::DivisionByZero));
}
