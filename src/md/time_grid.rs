/*
    Bullseye, deterministic relative motion prediction
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::ops::Index;

const LOG_TARGET: &str = "bullseye::time_grid";

/// Largest number of offsets a generated grid may hold.
pub const MAX_GRID_POINTS: usize = 1 << 20;

/// Number of offsets [make_time_grid] yields for these inputs, computed without allocating.
///
/// Zero for invalid inputs and for grids longer than [MAX_GRID_POINTS].
pub fn grid_len(horizon_s: f64, cadence_s: f64) -> usize {
    if !(horizon_s >= 0.0 && horizon_s.is_finite() && cadence_s > 0.0 && cadence_s.is_finite()) {
        return 0;
    }

    let quotient = (horizon_s / cadence_s).floor();
    if !(quotient < MAX_GRID_POINTS as f64) {
        return 0;
    }

    let mut k_max = quotient as usize;
    // The quotient may round up across an integer
    while k_max > 0 && (k_max as f64) * cadence_s > horizon_s {
        k_max -= 1;
    }
    k_max + 1
}

/// Ordered, non-decreasing, non-negative time offsets from the prediction epoch, in seconds.
///
/// A grid made by [make_time_grid] always starts at zero when it isn't empty. Grids built from a vector are taken
/// as is: the models check the offsets as they propagate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeGrid {
    tau: Vec<f64>,
}

impl TimeGrid {
    /// Initializes an empty grid which can be regenerated up to `capacity` offsets without allocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tau: Vec::with_capacity(capacity),
        }
    }

    pub fn tau(&self) -> &[f64] {
        &self.tau
    }

    pub fn len(&self) -> usize {
        self.tau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }

    /// Last offset of the grid, if any.
    pub fn last(&self) -> Option<f64> {
        self.tau.last().copied()
    }

    /// Replaces the offsets with 0, cadence, 2·cadence, … up to the largest multiple of the cadence which does not
    /// exceed the horizon, reusing the existing storage.
    ///
    /// A negative or non finite horizon, a non positive or non finite cadence, or a grid longer than
    /// [MAX_GRID_POINTS] yields an empty grid.
    pub fn regenerate(&mut self, horizon_s: f64, cadence_s: f64) {
        self.tau.clear();

        let count = grid_len(horizon_s, cadence_s);
        if count == 0 {
            warn!(target: LOG_TARGET, "invalid inputs: horizon={horizon_s} cadence={cadence_s}");
            return;
        }

        self.tau
            .extend((0..count).map(|k| (k as f64) * cadence_s));

        debug!(
            target: LOG_TARGET,
            "grid horizon={horizon_s} cadence={cadence_s} steps={} last={:?}",
            self.tau.len(),
            self.last()
        );
    }
}

impl From<Vec<f64>> for TimeGrid {
    fn from(tau: Vec<f64>) -> Self {
        Self { tau }
    }
}

impl Index<usize> for TimeGrid {
    type Output = f64;

    fn index(&self, k: usize) -> &f64 {
        &self.tau[k]
    }
}

/// Builds the offsets 0, cadence, 2·cadence, … not exceeding the horizon; see [TimeGrid::regenerate].
///
/// Each offset is the integer step index scaled by the cadence, so there is no accumulated rounding error.
pub fn make_time_grid(horizon_s: f64, cadence_s: f64) -> TimeGrid {
    let mut grid = TimeGrid::default();
    grid.regenerate(horizon_s, cadence_s);
    grid
}
