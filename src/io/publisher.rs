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

use super::registry::MAX_VEHICLES;
use crate::linalg::Vector3;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const LOG_TARGET: &str = "bullseye::publisher";

/// Maximum number of grid points per vehicle in a prediction buffer.
pub const MAX_STEPS: usize = 600;

/// Predicted RIC positions of every registered vehicle for one tick.
///
/// Positions are stored vehicle major: the row of vehicle `i` holds [MAX_STEPS] contiguous positions, of which the
/// first `steps` are meaningful if `valid[i]` is set. The storage is allocated once, on construction.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionBuffer {
    /// Publication sequence number, zero until first published
    pub seqno: u64,
    /// Epoch of the prediction, in seconds
    pub t0: f64,
    /// Number of grid points written per vehicle
    pub steps: usize,
    /// Whether the row of each vehicle index was written in this tick
    pub valid: [bool; MAX_VEHICLES],
    positions: Vec<Vector3<f64>>,
}

impl Default for PredictionBuffer {
    fn default() -> Self {
        Self {
            seqno: 0,
            t0: 0.0,
            steps: 0,
            valid: [false; MAX_VEHICLES],
            positions: vec![Vector3::zeros(); MAX_VEHICLES * MAX_STEPS],
        }
    }
}

impl PredictionBuffer {
    /// Full row of storage of this vehicle index.
    ///
    /// # Panics
    /// If `vehicle` is not less than [MAX_VEHICLES].
    pub fn row(&self, vehicle: usize) -> &[Vector3<f64>] {
        &self.positions[vehicle * MAX_STEPS..(vehicle + 1) * MAX_STEPS]
    }

    /// Mutable full row of storage of this vehicle index.
    ///
    /// # Panics
    /// If `vehicle` is not less than [MAX_VEHICLES].
    pub fn row_mut(&mut self, vehicle: usize) -> &mut [Vector3<f64>] {
        &mut self.positions[vehicle * MAX_STEPS..(vehicle + 1) * MAX_STEPS]
    }

    /// Returns the predicted positions of this vehicle index, if it was written in this tick.
    pub fn trajectory(&self, vehicle: usize) -> Option<&[Vector3<f64>]> {
        if vehicle < MAX_VEHICLES && self.valid[vehicle] {
            Some(&self.row(vehicle)[..self.steps])
        } else {
            None
        }
    }

    /// Prepares this buffer to be filled for a new tick. The positions are left in place.
    pub fn reset(&mut self, t0: f64, steps: usize) {
        self.t0 = t0;
        self.steps = steps.min(MAX_STEPS);
        self.valid = [false; MAX_VEHICLES];
    }
}

/// Single writer, multiple reader double buffer of predictions.
///
/// The writer fills the back buffer obtained from [Publisher::begin_write] and exposes it with
/// [Publisher::publish]. Readers always see the last published buffer, which is never written to until a later
/// publication swaps it back.
#[derive(Debug)]
pub struct Publisher {
    buffers: [Box<PredictionBuffer>; 2],
    front: AtomicUsize,
    seqno: AtomicU64,
}

impl Default for Publisher {
    fn default() -> Self {
        Self {
            buffers: [Box::default(), Box::default()],
            front: AtomicUsize::new(0),
            seqno: AtomicU64::new(0),
        }
    }
}

impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the writable back buffer.
    pub fn begin_write(&mut self) -> &mut PredictionBuffer {
        let back = 1 - self.front.load(Ordering::Acquire);
        &mut self.buffers[back]
    }

    /// Stamps the back buffer with the next sequence number and this epoch, makes it the front buffer, and returns
    /// its sequence number.
    pub fn publish(&mut self, t0: f64) -> u64 {
        let back = 1 - self.front.load(Ordering::Acquire);

        let seqno = self.seqno.fetch_add(1, Ordering::Relaxed) + 1;
        self.buffers[back].seqno = seqno;
        self.buffers[back].t0 = t0;

        self.front.store(back, Ordering::Release);

        info!(target: LOG_TARGET, "publish seqno={seqno} t0={t0} front={back}");
        seqno
    }

    /// Returns the last published buffer.
    pub fn read(&self) -> &PredictionBuffer {
        &self.buffers[self.front.load(Ordering::Acquire)]
    }

    /// Sequence number of the front buffer, zero before the first publication.
    pub fn published_seqno(&self) -> u64 {
        self.read().seqno
    }
}
