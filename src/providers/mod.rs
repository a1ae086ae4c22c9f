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

//! Exact-time state providers.
//!
//! Every provider answers a query at t0 with a state tagged at exactly t0, or with a failed status. No provider
//! ever interpolates nor returns the nearest sample.

use crate::cosmic::{AdoptedRicFrame, ChiefState, ProviderCode, VehicleState};
use crate::io::VehicleId;

mod cartesian;
pub use self::cartesian::*;

mod two_body;
pub use self::two_body::*;

mod frame;
pub use self::frame::*;

mod vehicle;
pub use self::vehicle::*;

/// Provides the chief state at an exact time.
pub trait ChiefStateProvider {
    /// On success, the returned state is tagged at exactly `t0` and has a frame identifier.
    fn get(&mut self, t0: f64) -> ChiefState;
}

/// Provides the state of a deputy vehicle at an exact time.
pub trait VehicleStateProvider {
    fn get(&mut self, id: VehicleId, t0: f64) -> VehicleState;
}

/// Provides a candidate (adopted) RIC frame at an exact time.
pub trait AdoptedFrameProvider {
    fn get(&mut self, t0: f64) -> AdoptedRicFrame;
}

impl<T: ChiefStateProvider + ?Sized> ChiefStateProvider for Box<T> {
    fn get(&mut self, t0: f64) -> ChiefState {
        (**self).get(t0)
    }
}

impl<T: ChiefStateProvider + ?Sized> ChiefStateProvider for &mut T {
    fn get(&mut self, t0: f64) -> ChiefState {
        (**self).get(t0)
    }
}

impl<T: VehicleStateProvider + ?Sized> VehicleStateProvider for Box<T> {
    fn get(&mut self, id: VehicleId, t0: f64) -> VehicleState {
        (**self).get(id, t0)
    }
}

impl<T: VehicleStateProvider + ?Sized> VehicleStateProvider for &mut T {
    fn get(&mut self, id: VehicleId, t0: f64) -> VehicleState {
        (**self).get(id, t0)
    }
}

impl<T: AdoptedFrameProvider + ?Sized> AdoptedFrameProvider for Box<T> {
    fn get(&mut self, t0: f64) -> AdoptedRicFrame {
        (**self).get(t0)
    }
}

impl<T: AdoptedFrameProvider + ?Sized> AdoptedFrameProvider for &mut T {
    fn get(&mut self, t0: f64) -> AdoptedRicFrame {
        (**self).get(t0)
    }
}

/// An adopted frame provider which never has a frame available.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoAdoptedFrame;

impl AdoptedFrameProvider for NoAdoptedFrame {
    fn get(&mut self, _t0: f64) -> AdoptedRicFrame {
        AdoptedRicFrame::failed(ProviderCode::NotAvailable, None)
    }
}

/// Whether a provider serves a single current sample or an exact-time lookup into a series of samples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ProviderMode {
    #[default]
    Current,
    TimeSeries,
}

/// Default minimum tick time between two "time missing" warnings of the same provider, in seconds.
pub const DEFAULT_WARN_PERIOD_S: f64 = 1.0;

/// Rate limits the "time missing" warnings of a provider on the requested tick time.
#[derive(Copy, Clone, Debug)]
pub(crate) struct WarnLimiter {
    period_s: f64,
    last_t0: f64,
}

impl WarnLimiter {
    /// A non-positive period disables the rate limiting.
    pub(crate) fn new(period_s: f64) -> Self {
        Self {
            period_s,
            last_t0: f64::NEG_INFINITY,
        }
    }

    pub(crate) fn should_warn(&mut self, t0: f64) -> bool {
        if self.period_s <= 0.0 {
            return true;
        }
        if t0 - self.last_t0 >= self.period_s {
            self.last_t0 = t0;
            true
        } else {
            false
        }
    }
}

/// A sample which carries its own time tag.
pub(crate) trait Timed {
    fn time(&self) -> f64;
}

/// Samples appended in any order and sorted on demand, looked up by exact time only.
#[derive(Clone, Debug)]
pub(crate) struct ExactSeries<S: Timed> {
    /// Each sample with its insertion sequence number
    samples: Vec<(u64, S)>,
    next_seq: u64,
    sorted: bool,
}

impl<S: Timed> Default for ExactSeries<S> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            next_seq: 0,
            sorted: true,
        }
    }
}

impl<S: Timed> ExactSeries<S> {
    pub(crate) fn push(&mut self, sample: S) {
        self.samples.push((self.next_seq, sample));
        self.next_seq += 1;
        self.sorted = false;
    }

    pub(crate) fn clear(&mut self) {
        self.samples.clear();
        self.samples.shrink_to_fit();
        self.next_seq = 0;
        self.sorted = true;
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    /// Most recently pushed sample, wherever sorting moved it.
    pub(crate) fn last_mut(&mut self) -> Option<&mut S> {
        self.samples
            .iter_mut()
            .max_by_key(|(seq, _)| *seq)
            .map(|(_, sample)| sample)
    }

    /// Returns the first sample tagged at exactly `t0`, or the time of the next sample after it (if any).
    pub(crate) fn find(&mut self, t0: f64) -> Result<&S, Option<f64>> {
        if !self.sorted {
            // Samples sharing a time tag keep their insertion order
            self.samples
                .sort_by(|(seq_a, a), (seq_b, b)| a.time().total_cmp(&b.time()).then(seq_a.cmp(seq_b)));
            self.sorted = true;
        }

        let idx = self.samples.partition_point(|(_, s)| s.time() < t0);
        match self.samples.get(idx) {
            Some((_, sample)) if sample.time() == t0 => Ok(sample),
            Some((_, sample)) => Err(Some(sample.time())),
            None => Err(None),
        }
    }
}
