//! Application related stuff

use crate::common::*;
use crate::config::*;
use crate::light::*;
use clap::Parser;
use std::path::PathBuf;

lazy_static! {
    /// The global application options.
    pub static ref OPTIONS: Options = Options::parse();
}

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Sampling preset.
    #[arg(
        long,
        value_enum,
        default_value_t = Preset::Preview,
        help = "Sampling preset; --interval, --distance and --samples override it."
    )]
    pub preset: Preset,

    /// Angular interval override.
    #[arg(long, short = 'i', value_name = "DEGREES", help = "Angular step between grid points.")]
    pub interval: Option<Float>,

    /// Distance override.
    #[arg(long, short = 'd', value_name = "METERS", help = "Sensor distance from the photometric center.")]
    pub distance: Option<Float>,

    /// Samples override.
    #[arg(long, short = 's', value_name = "NUM", help = "Oracle samples per measurement.")]
    pub samples: Option<u32>,

    /// Declared total flux.
    #[arg(
        long,
        short = 'l',
        value_name = "LUMENS",
        help = "Total luminous flux to calibrate against. Defaults to the flux of the scene lights."
    )]
    pub lumens: Option<Float>,

    /// Fixture name.
    #[arg(long, short = 'n', value_name = "NAME", help = "Fixture name written to the label block.")]
    pub name: Option<String>,

    /// Path to the IES file.
    #[arg(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        help = "Write the IES file to the given path (single scene only)."
    )]
    pub ies_file: Option<PathBuf>,

    /// Output directory used when no output file is given.
    #[arg(long, value_name = "DIR", default_value = ".", help = "Directory for generated files.")]
    pub outdir: PathBuf,

    /// Replace existing files.
    #[arg(long, help = "Overwrite existing output files.")]
    pub overwrite: bool,

    /// Only validate scenes and configuration.
    #[arg(long = "validate-only", help = "Validate the scene and configuration and exit.")]
    pub validate_only: bool,

    /// Sweep time limit.
    #[arg(
        long = "time-limit",
        value_name = "SECS",
        help = "Cancel the sweep after the given number of seconds."
    )]
    pub time_limit: Option<u64>,

    /// Base time per measurement for the estimate.
    #[arg(
        long = "time-per-sample",
        value_name = "SECS",
        default_value_t = DEFAULT_TIME_PER_SAMPLE,
        help = "Estimated time of one measurement at 64 samples."
    )]
    pub time_per_sample: Float,

    /// Luminous efficacy.
    #[arg(
        long,
        value_name = "LM/W",
        default_value_t = LUMINOUS_EFFICACY,
        help = "Luminous efficacy used to convert watts to lumens."
    )]
    pub efficacy: Float,

    /// Suppress all text output other than error messages.
    #[arg(long, short = 'q', help = "Suppress all text output other than error messages.")]
    pub quiet: bool,

    /// Scene file paths.
    #[arg(required = true, value_name = "SCENE", help = "Scene files")]
    pub paths: Vec<String>,
}

impl Options {
    /// Returns the sampling configuration from the preset and overrides.
    pub fn sampling_config(&self) -> SamplingConfig {
        let preset = SamplingConfig::from_preset(self.preset);
        SamplingConfig::new(
            self.interval.unwrap_or(preset.angular_interval),
            self.distance.unwrap_or(preset.distance),
            self.samples.unwrap_or(preset.samples),
        )
    }

    /// Returns the photometric constants.
    pub fn constants(&self) -> PhotometryConstants {
        if self.efficacy.is_finite() && self.efficacy > 0.0 {
            PhotometryConstants {
                luminous_efficacy: self.efficacy,
                ..Default::default()
            }
        } else {
            warn!("Invalid efficacy {}; using {LUMINOUS_EFFICACY}", self.efficacy);
            PhotometryConstants::default()
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_preview() {
        let o = Options::try_parse_from(["ies-gonio", "lamp.scene"]).unwrap();
        assert_eq!(o.sampling_config(), SamplingConfig::preview());
        assert_eq!(o.paths, vec!["lamp.scene"]);
        assert_eq!(o.outdir, PathBuf::from("."));
        assert_eq!(o.constants(), PhotometryConstants::default());
        assert!(!o.overwrite);
        assert!(o.lumens.is_none());
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let o = Options::try_parse_from([
            "ies-gonio",
            "--preset",
            "production",
            "--samples",
            "16",
            "--efficacy",
            "100",
            "a.scene",
            "b.scene",
        ])
        .unwrap();
        assert_eq!(o.sampling_config(), SamplingConfig::new(5.0, 5.0, 16));
        assert_eq!(o.constants().luminous_efficacy, 100.0);
        assert_eq!(o.paths.len(), 2);
    }

    #[test]
    fn scene_is_required() {
        assert!(Options::try_parse_from(["ies-gonio"]).is_err());
    }

    #[test]
    fn invalid_efficacy_falls_back() {
        let o = Options::try_parse_from(["ies-gonio", "--efficacy", "0", "a.scene"]).unwrap();
        assert_eq!(o.constants(), PhotometryConstants::default());
    }
}
