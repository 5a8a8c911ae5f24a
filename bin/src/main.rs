#[macro_use]
extern crate log;

use api::*;
use gonio::app::*;
use gonio::error::*;
use gonio::fileutil::*;
use gonio::validation::*;
use indicatif::{ProgressBar, ProgressStyle};
use output::default_output_path;
use sampler::*;
use std::path::Path;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    if OPTIONS.ies_file.is_some() && OPTIONS.paths.len() > 1 {
        warn!("--outfile is ignored when more than one scene is given");
    }

    // Process scene descriptions. In case of error report it and continue.
    let mut failed = 0;
    for path in OPTIONS.paths.iter() {
        match process_scene(path) {
            Ok(true) => (),
            Ok(false) => failed += 1,
            Err(e) => {
                error!("{path}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}

/// Processes one scene. Returns false when the sweep was cancelled.
///
/// * `path` - Scene file path.
fn process_scene(path: &str) -> Result<bool> {
    let abs_path = absolute_path(path).map_err(|e| {
        GonioError::validation("parser", format!("invalid scene path '{path}'"), vec![e])
    })?;
    let scene_path = Path::new(&abs_path);
    let scene = SceneDescription::from_file(scene_path)?;

    let fixture_name = OPTIONS
        .name
        .clone()
        .or_else(|| scene.fixture_name.clone())
        .unwrap_or_else(|| file_stem(scene_path));

    if OPTIONS.validate_only {
        return validate_only(&scene).map(|_| true);
    }

    let ies_path = match &OPTIONS.ies_file {
        Some(file) if OPTIONS.paths.len() == 1 => file.clone(),
        _ => default_output_path(&fixture_name, &OPTIONS.outdir),
    };

    let request = GenerateRequest {
        config: OPTIONS.sampling_config(),
        fixture_name,
        total_lumens: OPTIONS.lumens,
        ies_path,
        overwrite: OPTIONS.overwrite,
        constants: OPTIONS.constants(),
        time_per_sample: OPTIONS.time_per_sample,
    };
    let generator = Generator::prepare(&scene, request)?;

    let (handle, token) = cancel_channel();
    if let Some(secs) = OPTIONS.time_limit {
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            handle.cancel();
        });
    }

    let total = generator.config().total_sampling_points();
    let progress = create_progress_bar(total as u64);
    progress.set_message("Sampling");
    let mut observer = |completed: usize, _total: usize| progress.set_position(completed as u64);

    let mut oracle = AnalyticOracle::new(generator.lights().to_vec());
    let outcome = generator.run(&mut oracle, &mut observer, &token);

    let outcome = outcome?;
    Ok(finish(&outcome, &progress, OPTIONS.quiet))
}

/// Closes the progress bar and reports how a run ended. Returns true when
/// files were written.
///
/// * `outcome`  - How the run ended.
/// * `progress` - The sweep progress bar.
/// * `quiet`    - Suppress the report.
fn finish(outcome: &GenerateOutcome, progress: &ProgressBar, quiet: bool) -> bool {
    match outcome {
        GenerateOutcome::Completed(report) => {
            progress.finish_with_message("Sampling complete");
            if !quiet {
                print!("{report}");
            }
            true
        }
        GenerateOutcome::Cancelled {
            completed,
            total,
            dump_path,
        } => {
            progress.abandon_with_message("Sampling cancelled");
            warn!(
                "Time limit reached after {completed} of {total} points; partial data written to '{}'",
                dump_path.display()
            );
            false
        }
    }
}

/// Prints the scene validation and the time estimate without sampling.
fn validate_only(scene: &SceneDescription) -> Result<()> {
    let config = OPTIONS.sampling_config().validated()?;
    let renderer = renderer_info(&scene.renderer);
    let validation = validate_scene(&scene.lights, &renderer, &scene.units, &OPTIONS.constants());

    if !OPTIONS.quiet {
        print!("{validation}");
        println!("Sampling: {config}");
        println!(
            "Points: {}, estimated time {}",
            config.total_sampling_points(),
            config.estimate_time(OPTIONS.time_per_sample)
        );
    }
    validation.into_result().map(|_| ())
}

/// Returns a progress bar for the sweep; hidden when running quietly.
///
/// * `len` - Number of grid points.
fn create_progress_bar(len: u64) -> ProgressBar {
    if OPTIONS.quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{msg} [{elapsed_precise}] [{wide_bar}] {pos}/{len} ({eta})",
    ) {
        progress.set_style(style.progress_chars("=> "));
    }
    progress
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gonio::geometry::*;
    use std::path::PathBuf;

    #[test]
    fn cancelled_run_is_not_a_success() {
        let outcome = GenerateOutcome::Cancelled {
            completed: 5,
            total: 684,
            dump_path: PathBuf::from("lamp_partial.json"),
        };
        assert!(!finish(&outcome, &ProgressBar::hidden(), true));
    }

    #[test]
    fn completed_run_is_a_success() {
        let report = GenerateReport {
            ies_path: PathBuf::from("lamp.ies"),
            metadata_path: PathBuf::from("lamp_metadata.json"),
            total_lumens: 1000.0,
            total_points: 684,
            failed_points: 0,
            filled_cells: 0,
            elapsed_seconds: 1.0,
            center: Point3f::ZERO,
            candela: None,
            warnings: vec![],
        };
        assert!(finish(&GenerateOutcome::Completed(report), &ProgressBar::hidden(), true));
    }
}
