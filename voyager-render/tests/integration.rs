use voyager_core::{
    ComplexLiteral, EngineConfig, IterationEngine, IterationParams, Precision, PrecisionMode,
    RecurrenceKind, SampleGrid, TermConfig,
};
use voyager_render::{export_png, ExportMetadata, Sampler};

fn mandelbrot(mode: PrecisionMode, max_iterations: u32) -> IterationEngine {
    let precision = Precision::new(24, mode).unwrap();
    let params = IterationParams::new(max_iterations, precision, 2.0).unwrap();
    IterationEngine::new(&EngineConfig::mandelbrot(params)).unwrap()
}

#[test]
fn end_to_end_mandelbrot_render() {
    let engine = mandelbrot(PrecisionMode::Hardware, 128);
    let grid = SampleGrid::parse("-0.75", "0", "0.02", 200, 150, engine.bits()).unwrap();
    let sampler = Sampler::new(None).unwrap();

    let result = sampler.render(&engine, &grid).unwrap();

    assert_eq!(result.iterations.width, 200);
    assert_eq!(result.iterations.height, 150);
    assert_eq!(result.iterations.data.len(), 200 * 150);
    assert!(result.tiles_rendered > 0);
    assert!(result.elapsed.as_nanos() > 0);

    // The centre of the main cardioid never escapes; the far left edge does.
    assert_eq!(result.iterations.get(110, 75), 128);
    assert!(result.iterations.get(0, 0) < 128);
}

#[test]
fn render_determinism_across_pool_sizes() {
    let engine = mandelbrot(PrecisionMode::Arbitrary, 48);
    let grid = SampleGrid::parse("-0.75", "0.1", "0.03", 96, 72, engine.bits()).unwrap();

    let r1 = Sampler::new(Some(1)).unwrap().render(&engine, &grid).unwrap();
    let r2 = Sampler::new(Some(4)).unwrap().render(&engine, &grid).unwrap();

    assert_eq!(
        r1.iterations.data, r2.iterations.data,
        "renders must be deterministic"
    );
}

#[test]
fn end_to_end_general_render_and_export() {
    let params = IterationParams::new(32, Precision::arbitrary(20).unwrap(), 2.0).unwrap();
    let mut config = EngineConfig::mandelbrot(params);
    config.recurrence.terms[0].p = ComplexLiteral::real("3");
    config.recurrence.terms.push(TermConfig {
        function: "gamma".into(),
        b: ComplexLiteral::real("0.01"),
        a: ComplexLiteral::one(),
        t: ComplexLiteral::real("2"),
        p: ComplexLiteral::one(),
        q: ComplexLiteral::one(),
        extras: vec![],
        substitute: vec![false, false, false, true, false],
    });
    let engine = IterationEngine::new(&config).unwrap();
    assert_eq!(engine.kind(), RecurrenceKind::General { terms: 2 });

    let grid = SampleGrid::parse("0.013", "0.017", "0.1", 24, 18, engine.bits()).unwrap();
    let result = Sampler::new(Some(2)).unwrap().render(&engine, &grid).unwrap();
    assert_eq!(result.iterations.data.len(), 24 * 18);

    let dir = std::env::temp_dir().join("voyager_integration_export");
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join("general.png");
    let meta = ExportMetadata {
        kind: result.kind.to_string(),
        formula: "z^3 + 0.01·gamma(2^z) + c".into(),
        center_re: "0.013".into(),
        center_im: "0.017".into(),
        spacing: "0.1".into(),
        max_iterations: 32,
        precision_digits: 20,
        escape_radius: 2.0,
    };
    export_png(&result.iterations, &path, &meta).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
    let _ = std::fs::remove_dir_all(&dir);
}
