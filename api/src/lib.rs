//! The API

#[macro_use]
extern crate log;
#[macro_use]
extern crate pest_derive;

use gonio::common::*;
use gonio::config::*;
use gonio::error::*;
use gonio::geometry::*;
use gonio::light::*;
use gonio::stats::*;
use gonio::validation::*;
use lights::Aggregate;
use output::*;
use photometry::*;
use sampler::*;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod parser;

pub use parser::SceneDescription;

/// Returns the capabilities of a rendering backend. Only the analytic backend
/// can measure radiance.
///
/// * `name` - Backend name.
pub fn renderer_info(name: &str) -> RendererInfo {
    RendererInfo::new(name, name.eq_ignore_ascii_case(ANALYTIC_RENDERER))
}

/// What to generate and where to write it.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerateRequest {
    /// Sampling configuration.
    pub config: SamplingConfig,

    /// Fixture name written to the label block and the sidecar.
    pub fixture_name: String,

    /// Declared total luminous flux. When absent the flux computed from the
    /// lights is used.
    pub total_lumens: Option<Float>,

    /// Destination of the LM-63 file. The sidecar is written next to it.
    pub ies_path: PathBuf,

    /// Replace existing files.
    pub overwrite: bool,

    /// Photometric constants.
    pub constants: PhotometryConstants,

    /// Seconds per sample used for the time estimate.
    pub time_per_sample: Float,
}

impl GenerateRequest {
    /// Returns a request with the preview preset and default constants.
    ///
    /// * `fixture_name` - Fixture name.
    /// * `ies_path`     - Destination of the LM-63 file.
    pub fn new(fixture_name: &str, ies_path: &Path) -> Self {
        Self {
            config: SamplingConfig::preview(),
            fixture_name: fixture_name.to_string(),
            total_lumens: None,
            ies_path: ies_path.to_path_buf(),
            overwrite: false,
            constants: PhotometryConstants::default(),
            time_per_sample: DEFAULT_TIME_PER_SAMPLE,
        }
    }
}

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerateReport {
    /// LM-63 file.
    pub ies_path: PathBuf,

    /// Metadata sidecar.
    pub metadata_path: PathBuf,

    /// Flux the data was calibrated to.
    pub total_lumens: Float,

    /// Grid points.
    pub total_points: usize,

    /// Grid points that could not be measured.
    pub failed_points: usize,

    /// Cells estimated from neighbours.
    pub filled_cells: usize,

    /// Sampling time in seconds.
    pub elapsed_seconds: Float,

    /// Photometric center in world coordinates.
    pub center: Point3f,

    /// Candela statistics.
    pub candela: Option<Statistics>,

    /// Scene validation warnings.
    pub warnings: Vec<String>,
}

impl fmt::Display for GenerateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IES file: {}", self.ies_path.display())?;
        writeln!(f, "Metadata: {}", self.metadata_path.display())?;
        writeln!(f, "Photometric center: {}", self.center)?;
        writeln!(f, "Total lumens: {:.2}", self.total_lumens)?;
        writeln!(
            f,
            "Points: {} ({} failed, {} filled) in {}",
            self.total_points,
            self.failed_points,
            self.filled_cells,
            format_duration(self.elapsed_seconds)
        )?;
        if let Some(stats) = &self.candela {
            writeln!(f, "Candela: {stats}")?;
        }
        Ok(())
    }
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerateOutcome {
    /// Files were written.
    Completed(GenerateReport),

    /// The sweep was cancelled; partial measurements were dumped.
    Cancelled {
        /// Points visited before cancellation.
        completed: usize,

        /// Points in the grid.
        total: usize,

        /// Partial dump.
        dump_path: PathBuf,
    },
}

/// A validated scene ready to be measured.
pub struct Generator {
    /// The request.
    request: GenerateRequest,

    /// Validation outcome.
    validation: SceneValidation,

    /// Accepted lights.
    lights: Vec<LightSource>,

    /// Center, flux and breakdown of the lights.
    aggregate: Aggregate,

    /// Flux the data will be calibrated to.
    total_lumens: Float,
}

impl Generator {
    /// Validates the configuration and the scene and aggregates the lights.
    /// Nothing is measured or written.
    ///
    /// * `scene`   - Scene description.
    /// * `request` - What to generate.
    pub fn prepare(scene: &SceneDescription, request: GenerateRequest) -> Result<Self> {
        let mut request = request;
        request.config = request.config.validated()?;

        let renderer = renderer_info(&scene.renderer);
        let validation = validate_scene(&scene.lights, &renderer, &scene.units, &request.constants);
        for w in validation.warnings.iter() {
            warn!("{w}");
        }
        let sources = validation.clone().into_result()?;

        let aggregate = lights::aggregate(&sources, &scene.fixture_origin, &request.constants)?;

        let total_lumens = request.total_lumens.unwrap_or(aggregate.total_lumens);
        if !(total_lumens.is_finite() && total_lumens > 0.0) {
            return Err(GonioError::calibration(
                "total luminous flux must be positive",
                total_lumens,
                None,
            ));
        }

        if !request.overwrite {
            for path in [request.ies_path.clone(), metadata_path(&request.ies_path)] {
                if path.exists() {
                    return Err(GonioError::output(
                        "file already exists; enable overwrite to replace it",
                        &path,
                        None,
                    ));
                }
            }
        }

        let config = request.config;
        info!(
            "'{}': {config}, {} points, estimated {}",
            request.fixture_name,
            config.total_sampling_points(),
            config.estimate_time(request.time_per_sample)
        );

        Ok(Self {
            request,
            validation,
            lights: sources,
            aggregate,
            total_lumens,
        })
    }

    /// Returns the scene validation outcome.
    pub fn validation(&self) -> &SceneValidation {
        &self.validation
    }

    /// Returns the accepted lights.
    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    /// Returns the light aggregate.
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// Returns the flux the data will be calibrated to.
    pub fn total_lumens(&self) -> Float {
        self.total_lumens
    }

    /// Returns the validated sampling configuration.
    pub fn config(&self) -> &SamplingConfig {
        &self.request.config
    }

    /// Measures the scene and writes the LM-63 file and its sidecar. A
    /// cancelled sweep writes a partial dump instead.
    ///
    /// * `oracle`   - The rendering backend.
    /// * `observer` - Receives sweep progress.
    /// * `cancel`   - Cancellation token.
    pub fn run<O: RadianceOracle>(
        &self,
        oracle: &mut O,
        observer: &mut dyn ProgressObserver,
        cancel: &CancelToken,
    ) -> Result<GenerateOutcome> {
        let config = &self.request.config;
        let name = &self.request.fixture_name;
        let ies_path = &self.request.ies_path;

        let grid = plan_grid(config, &self.aggregate.center);
        let sweep = sampler::sweep(oracle, &grid, config.samples, observer, cancel)?;

        if let SweepStatus::Cancelled { completed } = sweep.status {
            let dump = SamplingDump::new(name, config, &sweep);
            let dump_path = dump_path(ies_path);
            write_sampling_dump(&dump, &dump_path, true)?;
            warn!(
                "Cancelled after {completed} of {} points; partial data in {}",
                grid.len(),
                dump_path.display()
            );
            return Ok(GenerateOutcome::Cancelled {
                completed,
                total: grid.len(),
                dump_path,
            });
        }

        let mut result = sweep.result.clone();
        let filled_cells = result.fill_gaps();
        if filled_cells > 0 {
            warn!("Estimated {filled_cells} unmeasured cell(s) from their neighbours");
        }

        let data = calibrate(&result, self.total_lumens, config.distance, name)?;

        let header = Lm63Header {
            input_watts: self.aggregate.lights.iter().map(|l| l.power_watts).sum(),
            ..Default::default()
        };
        let text = to_lm63(&data, &header)?;
        write_ies_file(&text, ies_path, self.request.overwrite)?;

        let summary = SamplingSummary::new(config, &sweep, filled_cells);
        let metadata = generate_metadata(name, &self.aggregate, self.total_lumens, Some(summary));
        let metadata_path = metadata_path(ies_path);
        write_metadata_file(&metadata, &metadata_path, self.request.overwrite)?;

        Ok(GenerateOutcome::Completed(GenerateReport {
            ies_path: ies_path.clone(),
            metadata_path,
            total_lumens: self.total_lumens,
            total_points: grid.len(),
            failed_points: sweep.failures.len(),
            filled_cells,
            elapsed_seconds: sweep.result.elapsed_seconds,
            center: self.aggregate.center,
            candela: data.statistics(),
            warnings: self.validation.warnings.clone(),
        }))
    }
}

/// Prepares a scene and measures it with the analytic backend.
///
/// * `scene`    - Scene description.
/// * `request`  - What to generate.
/// * `observer` - Receives sweep progress.
/// * `cancel`   - Cancellation token.
pub fn generate(
    scene: &SceneDescription,
    request: GenerateRequest,
    observer: &mut dyn ProgressObserver,
    cancel: &CancelToken,
) -> Result<GenerateOutcome> {
    let generator = Generator::prepare(scene, request)?;
    let mut oracle = AnalyticOracle::new(generator.lights().to_vec());
    generator.run(&mut oracle, observer, cancel)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use std::fs;

    const BULB: &str = r#"
Renderer "analytic"
FixtureName "Bulb"
FixtureOrigin [0 0 0]
LightSource "point" "string name" "bulb" "point3 from" [0 0 1] "float power" [1]
"#;

    fn request(dir: &Path) -> GenerateRequest {
        let mut r = GenerateRequest::new("Bulb", &dir.join("bulb.ies"));
        r.config = SamplingConfig::new(15.0, 2.0, 1);
        r
    }

    fn completed(outcome: GenerateOutcome) -> GenerateReport {
        match outcome {
            GenerateOutcome::Completed(report) => report,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn renderer_capabilities() {
        assert!(renderer_info("analytic").can_measure);
        assert!(renderer_info("Analytic").can_measure);
        assert!(!renderer_info("cycles").can_measure);
    }

    #[test]
    fn point_light_is_isotropic() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str(BULB).unwrap();
        let mut r = request(dir.path());
        r.total_lumens = Some(1000.0);

        let report = completed(generate(&scene, r, &mut NoProgress, &CancelToken::never()).unwrap());
        assert_eq!(report.total_points, 13 * 24);
        assert_eq!(report.failed_points, 0);
        assert_eq!(report.filled_cells, 0);
        assert_eq!(report.center, Point3f::new(0.0, 0.0, 1.0));

        let stats = report.candela.unwrap();
        let expected = 1000.0 / (4.0 * PI);
        assert!((stats.mean - expected).abs() / expected < 0.01, "{stats}");
        assert!(approx_eq!(f64, stats.min, stats.max, epsilon = 1e-9));

        let text = fs::read_to_string(&report.ies_path).unwrap();
        assert!(text.starts_with("IESNA:LM-63-2002\r\n"));
        assert!(text.contains("[LUMINAIRE] Bulb\r\n"));
        assert!(text.contains("\r\n13 24 1 2 0 0 0\r\n"));
        assert!(text.contains("\r\n1000.00 1.00 2.000 1.00 1 1.00\r\n"));

        let json = fs::read_to_string(&report.metadata_path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["fixture_name"], "Bulb");
        assert_eq!(v["total_lumens"], 1000.0);
        assert_eq!(v["photometric_center"]["world_coordinates"]["z"], 1.0);
        assert_eq!(v["sampling"]["total_points"], 312);
    }

    #[test]
    fn flux_defaults_to_light_power() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str(BULB).unwrap();
        let generator = Generator::prepare(&scene, request(dir.path())).unwrap();
        assert!(approx_eq!(f64, generator.total_lumens(), 683.0, ulps = 4));
        assert_eq!(generator.lights().len(), 1);
        assert!(generator.validation().is_valid);
        assert_eq!(generator.config().num_theta(), 13);
    }

    #[test]
    fn non_positive_flux_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str(BULB).unwrap();
        let mut r = request(dir.path());
        r.total_lumens = Some(0.0);
        match Generator::prepare(&scene, r) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Calibration),
            Ok(_) => panic!("expected calibration error"),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str(BULB).unwrap();
        let mut r = request(dir.path());
        r.config.angular_interval = 0.5;
        match Generator::prepare(&scene, r) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Validation),
            Ok(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn unsupported_renderer_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = SceneDescription::parse_str(BULB).unwrap();
        scene.renderer = String::from("cycles");
        match Generator::prepare(&scene, request(dir.path())) {
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::Validation);
                assert!(e.to_string().contains("cannot measure"));
            }
            Ok(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn scene_without_lights_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str("LightSource \"spot\" \"float power\" [1]").unwrap();
        match Generator::prepare(&scene, request(dir.path())) {
            Err(e) => assert!(e.to_string().contains("no supported light sources")),
            Ok(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn cancelled_run_writes_partial_dump() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str(BULB).unwrap();
        let r = request(dir.path());
        let ies_path = r.ies_path.clone();

        let (handle, token) = cancel_channel();
        handle.cancel();
        match generate(&scene, r, &mut NoProgress, &token).unwrap() {
            GenerateOutcome::Cancelled {
                completed,
                total,
                dump_path,
            } => {
                assert_eq!(completed, 0);
                assert_eq!(total, 312);
                assert_eq!(dump_path, dir.path().join("bulb_partial.json"));
                assert!(dump_path.is_file());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!ies_path.exists());
    }

    #[test]
    fn existing_output_is_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str(BULB).unwrap();
        let r = request(dir.path());
        fs::write(&r.ies_path, "keep").unwrap();

        match Generator::prepare(&scene, r.clone()) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Output),
            Ok(_) => panic!("expected output error"),
        }
        assert_eq!(fs::read_to_string(&r.ies_path).unwrap(), "keep");

        let mut r = r;
        r.overwrite = true;
        let report = completed(generate(&scene, r, &mut NoProgress, &CancelToken::never()).unwrap());
        assert!(fs::read_to_string(&report.ies_path).unwrap().starts_with("IESNA"));
    }

    #[test]
    fn progress_is_reported_for_every_point() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneDescription::parse_str(BULB).unwrap();
        let mut calls = 0;
        let mut last = (0, 0);
        let mut observer = |done: usize, total: usize| {
            calls += 1;
            last = (done, total);
        };
        completed(generate(&scene, request(dir.path()), &mut observer, &CancelToken::never()).unwrap());
        assert_eq!(calls, 312);
        assert_eq!(last, (312, 312));
    }
}
