//! Sampling waveforms over a time grid.

use crate::error::{NodalError, Result};
use crate::{DEFAULT_POINTS, DEFAULT_T_STOP};

use super::waveform::TimeWaveform;

/// Evenly spaced sample times, both ends included.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    start: f64,
    stop: f64,
    points: usize,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: DEFAULT_T_STOP,
            points: DEFAULT_POINTS,
        }
    }
}

impl TimeGrid {
    /// `points` evenly spaced times from `start` to `stop`.
    pub fn linspace(start: f64, stop: f64, points: usize) -> Result<Self> {
        if !start.is_finite() || !stop.is_finite() {
            return Err(NodalError::simulation_param("time grid bounds must be finite"));
        }
        if stop < start {
            return Err(NodalError::simulation_param(format!(
                "time grid ends before it starts ({} > {})",
                start, stop
            )));
        }
        if points == 0 {
            return Err(NodalError::simulation_param("time grid needs at least one point"));
        }
        Ok(Self { start, stop, points })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn len(&self) -> usize {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points == 0
    }

    /// Sample time at index `i`.
    pub fn time(&self, i: usize) -> f64 {
        if self.points == 1 {
            return self.start;
        }
        let step = (self.stop - self.start) / (self.points - 1) as f64;
        if i + 1 == self.points {
            self.stop
        } else {
            self.start + step * i as f64
        }
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.points).map(move |i| self.time(i))
    }
}

/// What to do when a sample cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplePolicy {
    /// Fail the whole trace on the first failing sample.
    #[default]
    AbortOnFirst,
    /// Mark failing samples and keep going; fail once `max_consecutive`
    /// samples in a row have failed.
    SkipAndContinue { max_consecutive: usize },
}

impl SamplePolicy {
    /// Skip every failing sample; only a trace with no valid sample fails.
    pub fn skip_all() -> Self {
        Self::SkipAndContinue {
            max_consecutive: usize::MAX,
        }
    }
}

/// Grid and failure policy for sampling a solution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleConfig {
    pub grid: TimeGrid,
    pub policy: SamplePolicy,
}

impl SampleConfig {
    pub fn new(grid: TimeGrid) -> Self {
        Self {
            grid,
            policy: SamplePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SamplePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// A sampled trace.
///
/// Failed samples hold `NaN` in `values` and are listed in `failed`, so a
/// consumer never mistakes them for data.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
    /// Indices of samples that could not be evaluated
    pub failed: Vec<usize>,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// True when every sample was evaluated.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// `(t, value)` pairs, `None` for failed samples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, Option<f64>)> + '_ {
        self.times
            .iter()
            .zip(&self.values)
            .map(|(&t, &v)| (t, v.is_finite().then_some(v)))
    }
}

/// Evaluate `waveform` at every grid time.
///
/// A sample fails when its value is not finite. Under
/// [`SamplePolicy::AbortOnFirst`] the first failure ends sampling; under
/// [`SamplePolicy::SkipAndContinue`] failures are recorded until a run of
/// `max_consecutive` of them, or until the grid turns out to have no valid
/// sample at all. The error carries the time the offending run started and
/// the number of failing samples on the whole grid.
pub fn sample(waveform: &TimeWaveform, grid: &TimeGrid, policy: SamplePolicy) -> Result<Samples> {
    let mut times = Vec::with_capacity(grid.len());
    let mut values = Vec::with_capacity(grid.len());
    let mut failed = Vec::new();
    let mut run_start = None;
    let mut run_len = 0usize;

    for (i, t) in grid.times().enumerate() {
        times.push(t);
        match waveform.try_evaluate(t) {
            Some(v) => {
                values.push(v);
                run_start = None;
                run_len = 0;
            }
            None => {
                values.push(f64::NAN);
                failed.push(i);
                let start = *run_start.get_or_insert(t);
                run_len += 1;

                let abort = match policy {
                    SamplePolicy::AbortOnFirst => true,
                    SamplePolicy::SkipAndContinue { max_consecutive } => run_len >= max_consecutive,
                };
                if abort {
                    let failures = count_failures(waveform, grid);
                    tracing::debug!(time = start, failures, "sampling aborted");
                    return Err(NodalError::EvaluationFailed {
                        time: start,
                        failures,
                    });
                }
            }
        }
    }

    if !times.is_empty() && failed.len() == times.len() {
        return Err(NodalError::EvaluationFailed {
            time: times[0],
            failures: failed.len(),
        });
    }
    if !failed.is_empty() {
        tracing::warn!(
            failures = failed.len(),
            first = times[failed[0]],
            "skipped samples that could not be evaluated"
        );
    }

    Ok(Samples {
        times,
        values,
        failed,
    })
}

fn count_failures(waveform: &TimeWaveform, grid: &TimeGrid) -> usize {
    grid.times()
        .filter(|&t| waveform.try_evaluate(t).is_none())
        .count()
}
