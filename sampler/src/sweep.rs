//! Sampling Sweep

use crate::oracle::*;
use crate::planner::*;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use gonio::common::*;
use gonio::error::*;
use gonio::geometry::*;
use gonio::sampling::*;
use serde::Serialize;
use std::cell::Cell;
use std::time::Instant;

/// Receives sweep progress.
pub trait ProgressObserver {
    /// Called after every measurement attempt.
    ///
    /// * `completed` - Number of placements visited so far.
    /// * `total`     - Number of placements in the grid.
    fn on_progress(&mut self, completed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> ProgressObserver for F {
    fn on_progress(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Observer that ignores progress.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _completed: usize, _total: usize) {}
}

/// Sending side of a cancellation channel.
#[derive(Clone)]
pub struct CancelHandle {
    sender: Sender<()>,
}

impl CancelHandle {
    /// Requests cancellation. Repeated requests are ignored.
    pub fn cancel(&self) {
        let _ = self.sender.try_send(());
    }
}

/// Receiving side of a cancellation channel, polled between measurements.
pub struct CancelToken {
    receiver: Receiver<()>,
    cancelled: Cell<bool>,
}

impl CancelToken {
    /// Returns a token that is never cancelled.
    pub fn never() -> Self {
        let (_, token) = cancel_channel();
        token
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        if !self.cancelled.get() {
            match self.receiver.try_recv() {
                Ok(()) => self.cancelled.set(true),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
            }
        }
        self.cancelled.get()
    }
}

/// Returns a connected cancellation handle and token.
pub fn cancel_channel() -> (CancelHandle, CancelToken) {
    let (sender, receiver) = bounded(1);
    (
        CancelHandle { sender },
        CancelToken {
            receiver,
            cancelled: Cell::new(false),
        },
    )
}

/// A placement that could not be measured.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleFailure {
    /// Vertical angle θ in degrees.
    pub theta: Float,

    /// Horizontal angle Ø in degrees.
    pub phi: Float,

    /// Sensor position.
    pub position: Point3f,

    /// Reason for the failure.
    pub message: String,
}

/// How a sweep ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SweepStatus {
    /// Every placement was visited.
    Completed,

    /// Cancelled after visiting `completed` placements.
    Cancelled { completed: usize },
}

/// Outcome of a sweep.
#[derive(Clone, Debug)]
pub struct Sweep {
    /// The measurements; unmeasured cells are NaN.
    pub result: SamplingResult,

    /// Placements that failed.
    pub failures: Vec<SampleFailure>,

    /// How the sweep ended.
    pub status: SweepStatus,
}

impl Sweep {
    /// Returns true if the sweep was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, SweepStatus::Cancelled { .. })
    }
}

/// Visits every grid placement in order and measures it.
///
/// Placements that fail with a `Sampling` error or return a non-finite or
/// negative reading are recorded and left NaN. Any other error aborts the
/// sweep. Cancellation is honoured between measurements. The sensor is
/// released on every exit path.
///
/// * `oracle`   - The rendering backend.
/// * `grid`     - The placements.
/// * `quality`  - Samples per measurement.
/// * `observer` - Receives progress after every measurement.
/// * `cancel`   - Cancellation token.
pub fn sweep<O: RadianceOracle>(
    oracle: &mut O,
    grid: &SamplingGrid,
    quality: u32,
    observer: &mut dyn ProgressObserver,
    cancel: &CancelToken,
) -> Result<Sweep> {
    let total = grid.len();
    let mut result = SamplingResult::new_unsampled(
        grid.vertical_angles.clone(),
        grid.horizontal_angles.clone(),
        grid.center,
    );
    let mut failures = vec![];
    let mut status = SweepStatus::Completed;

    info!("Sampling {total} points with '{}'", oracle.name());
    let start = Instant::now();
    let mut guard = SensorGuard::new(oracle);

    for (n, point) in grid.points.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Sweep cancelled after {n} of {total} points");
            status = SweepStatus::Cancelled { completed: n };
            break;
        }

        let failure = match guard.measure(&point.position, &grid.center, quality) {
            Ok(v) if v.is_finite() && v >= 0.0 => {
                result.luminance[point.row][point.col] = v;
                None
            }
            Ok(v) => Some(format!("invalid reading {v}")),
            Err(GonioError::Sampling { message, .. }) => Some(message),
            Err(e) => return Err(e),
        };

        if let Some(message) = failure {
            let e = GonioError::sampling(message.clone(), point.position, point.theta, point.phi);
            warn!("{e}");
            failures.push(SampleFailure {
                theta: point.theta,
                phi: point.phi,
                position: point.position,
                message,
            });
        }

        result.total_samples = n + 1;
        observer.on_progress(n + 1, total);
    }

    drop(guard);
    result.elapsed_seconds = start.elapsed().as_secs_f64();

    if !failures.is_empty() {
        warn!("{} of {total} points failed", failures.len());
    }
    info!(
        "Sampled {} points in {}",
        result.total_samples,
        result.elapsed_time_formatted()
    );

    Ok(Sweep {
        result,
        failures,
        status,
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gonio::config::*;

    /// Oracle that counts sensor lifecycle calls and misbehaves on request.
    #[derive(Default)]
    struct MockOracle {
        created: usize,
        released: usize,
        calls: usize,
        sampling_errors: Vec<usize>,
        bad_readings: Vec<(usize, Float)>,
        fatal_at: Option<usize>,
    }

    impl RadianceOracle for MockOracle {
        type Sensor = u32;

        fn name(&self) -> &str {
            "mock"
        }

        fn create_sensor(&mut self, _position: &Point3f, _aim: &Point3f) -> Result<u32> {
            self.created += 1;
            Ok(7)
        }

        fn measure(&mut self, sensor: &mut u32, position: &Point3f, _aim: &Point3f, _quality: u32) -> Result<Float> {
            assert_eq!(*sensor, 7);
            let call = self.calls;
            self.calls += 1;
            if self.fatal_at == Some(call) {
                return Err(GonioError::validation("mock", "backend lost", vec![]));
            }
            if self.sampling_errors.contains(&call) {
                return Err(GonioError::sampling("render failed", *position, 0.0, 0.0));
            }
            if let Some((_, v)) = self.bad_readings.iter().find(|(c, _)| *c == call) {
                return Ok(*v);
            }
            Ok(1.0 + call as Float)
        }

        fn release_sensor(&mut self, sensor: u32) {
            assert_eq!(sensor, 7);
            self.released += 1;
        }
    }

    fn grid() -> SamplingGrid {
        // 5 x 8 = 40 points.
        plan_grid(&SamplingConfig::new(45.0, 1.0, 1), &Point3f::ZERO)
    }

    #[test]
    fn completes_and_releases_sensor() {
        let mut oracle = MockOracle::default();
        let mut progress = vec![];
        let mut observer = |c: usize, t: usize| progress.push((c, t));
        let s = sweep(&mut oracle, &grid(), 1, &mut observer, &CancelToken::never()).unwrap();

        assert_eq!(s.status, SweepStatus::Completed);
        assert!(!s.is_cancelled());
        assert!(s.failures.is_empty());
        assert_eq!(s.result.total_samples, 40);
        assert!(s.result.validate_data_integrity());
        assert_eq!(s.result.luminance[0][0], 1.0);
        assert_eq!(s.result.luminance[1][0], 9.0);
        assert_eq!((oracle.created, oracle.released), (1, 1));

        assert_eq!(progress.len(), 40);
        assert!(progress.windows(2).all(|w| w[1].0 == w[0].0 + 1));
        assert_eq!(progress[39], (40, 40));
    }

    #[test]
    fn failures_are_recorded_and_skipped() {
        let mut oracle = MockOracle {
            sampling_errors: vec![3],
            bad_readings: vec![(5, -2.0), (6, Float::NAN), (7, Float::INFINITY)],
            ..Default::default()
        };
        let g = grid();
        let s = sweep(&mut oracle, &g, 1, &mut NoProgress, &CancelToken::never()).unwrap();

        assert_eq!(s.status, SweepStatus::Completed);
        assert_eq!(s.failures.len(), 4);
        assert_eq!(s.failures[0].message, "render failed");
        assert_eq!((s.failures[0].theta, s.failures[0].phi), (0.0, 135.0));
        assert_eq!(s.failures[0].position, g.points[3].position);
        assert!(s.failures[1].message.contains("invalid reading"));
        assert_eq!(s.result.missing_cells(), 4);
        assert!(s.result.luminance[0][3].is_nan());
        assert!(s.result.luminance[0][7].is_nan());
        assert_eq!(oracle.calls, 40);
        assert_eq!((oracle.created, oracle.released), (1, 1));
    }

    #[test]
    fn fatal_error_propagates_and_releases_sensor() {
        let mut oracle = MockOracle {
            fatal_at: Some(10),
            ..Default::default()
        };
        let r = sweep(&mut oracle, &grid(), 1, &mut NoProgress, &CancelToken::never());
        match r {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Validation),
            Ok(_) => panic!("expected fatal error"),
        }
        assert_eq!(oracle.calls, 11);
        assert_eq!((oracle.created, oracle.released), (1, 1));
    }

    #[test]
    fn cancellation_between_samples() {
        let mut oracle = MockOracle::default();
        let (handle, token) = cancel_channel();
        let mut observer = |c: usize, _t: usize| {
            if c == 5 {
                handle.cancel();
                handle.cancel();
            }
        };
        let s = sweep(&mut oracle, &grid(), 1, &mut observer, &token).unwrap();

        assert_eq!(s.status, SweepStatus::Cancelled { completed: 5 });
        assert!(s.is_cancelled());
        assert_eq!(s.result.total_samples, 5);
        assert_eq!(s.result.missing_cells(), 35);
        assert_eq!(oracle.calls, 5);
        assert_eq!((oracle.created, oracle.released), (1, 1));
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancelled_before_start_never_creates_sensor() {
        let mut oracle = MockOracle::default();
        let (handle, token) = cancel_channel();
        handle.cancel();
        let s = sweep(&mut oracle, &grid(), 1, &mut NoProgress, &token).unwrap();
        assert_eq!(s.status, SweepStatus::Cancelled { completed: 0 });
        assert_eq!((oracle.created, oracle.released), (0, 0));
    }

    #[test]
    fn dropped_handle_does_not_cancel() {
        let (handle, token) = cancel_channel();
        drop(handle);
        assert!(!token.is_cancelled());
        assert!(!CancelToken::never().is_cancelled());
    }
}
