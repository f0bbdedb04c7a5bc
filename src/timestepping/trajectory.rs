//! Trajectory sampling shared by all time-steppers

use crate::error::MorResult;
use crate::vectorarrays::VectorArray;

/// Collects the states a time-stepper should return
///
/// Sample `k` is the first state reached at or after `t0 + k·DT` (up to half
/// a step), where `DT = (t1 - t0) / (num_values - 1)`. Without `num_values`
/// every step is recorded.
#[derive(Debug)]
pub(crate) struct TrajectoryRecorder {
    states: VectorArray,
    initial_time: f64,
    sample_dt: f64,
    slack: f64,
}

impl TrajectoryRecorder {
    pub(crate) fn new(
        initial_data: &VectorArray,
        initial_time: f64,
        end_time: f64,
        nt: usize,
        num_values: Option<usize>,
    ) -> Self {
        let span = end_time - initial_time;
        let dt = span / nt as f64;
        let num_values = num_values.unwrap_or(nt + 1);
        let sample_dt = if num_values > 1 {
            span / (num_values - 1) as f64
        } else {
            f64::INFINITY
        };
        Self {
            states: initial_data.clone(),
            initial_time,
            sample_dt,
            slack: 0.5 * dt.min(sample_dt),
        }
    }

    /// Offer the state reached at time `t`
    pub(crate) fn record(&mut self, t: f64, state: &VectorArray) -> MorResult<()> {
        while t - self.initial_time + self.slack >= self.states.len() as f64 * self.sample_dt {
            self.states.append(state)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> VectorArray {
        self.states
    }
}
