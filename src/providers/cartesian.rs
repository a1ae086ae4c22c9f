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

use super::{ChiefStateProvider, ExactSeries, ProviderMode, Timed, WarnLimiter, DEFAULT_WARN_PERIOD_S};
use crate::cosmic::{ChiefState, FrameId, InertialState, ProviderCode};
use crate::linalg::Vector3;

const LOG_TARGET: &str = "bullseye::provider::cartesian";

/// A Cartesian state sample in the inertial frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct StateSample {
    pub(crate) t: f64,
    pub(crate) r_i: Vector3<f64>,
    pub(crate) v_i: Vector3<f64>,
}

impl Timed for StateSample {
    fn time(&self) -> f64 {
        self.t
    }
}

impl StateSample {
    pub(crate) fn to_state(self, frame_id: &FrameId) -> InertialState {
        InertialState::new(self.t, self.r_i, self.v_i, frame_id.clone())
    }
}

/// Chief state provider fed with Cartesian states, either one current state or a series of samples.
#[derive(Clone, Debug)]
pub struct CartesianChiefProvider {
    frame_id: Option<FrameId>,
    mode: ProviderMode,
    limiter: WarnLimiter,
    invalid_logged: bool,
    current: Option<StateSample>,
    samples: ExactSeries<StateSample>,
}

impl CartesianChiefProvider {
    /// Initializes a new provider. A missing frame identifier makes every query fail with `InvalidInput`.
    pub fn new(frame_id: Option<FrameId>, mode: ProviderMode, warn_period_s: f64) -> Self {
        info!(
            target: LOG_TARGET,
            "init: mode={mode:?} frame_id={} warn_period_s={warn_period_s}",
            frame_id.as_ref().map_or("(none)", |id| id.as_str()),
        );
        Self {
            frame_id,
            mode,
            limiter: WarnLimiter::new(warn_period_s),
            invalid_logged: false,
            current: None,
            samples: ExactSeries::default(),
        }
    }

    /// Initializes a provider serving the state last set with `set_current`.
    pub fn current(frame_id: FrameId) -> Self {
        Self::new(Some(frame_id), ProviderMode::Current, DEFAULT_WARN_PERIOD_S)
    }

    /// Initializes a provider serving exact-time lookups into its samples.
    pub fn time_series(frame_id: FrameId) -> Self {
        Self::new(Some(frame_id), ProviderMode::TimeSeries, DEFAULT_WARN_PERIOD_S)
    }

    pub fn mode(&self) -> ProviderMode {
        self.mode
    }

    pub fn set_current(&mut self, t: f64, r_i: Vector3<f64>, v_i: Vector3<f64>) {
        self.current = Some(StateSample { t, r_i, v_i });
        debug!(target: LOG_TARGET, "set_current: t={t}");
    }

    /// Appends a sample; samples may be added in any order.
    pub fn add_sample(&mut self, t: f64, r_i: Vector3<f64>, v_i: Vector3<f64>) {
        self.samples.push(StateSample { t, r_i, v_i });
        debug!(target: LOG_TARGET, "add_sample: t={t} count={}", self.samples.len());
    }

    pub fn clear_samples(&mut self) {
        self.samples.clear();
        debug!(target: LOG_TARGET, "clear_samples");
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl ChiefStateProvider for CartesianChiefProvider {
    fn get(&mut self, t0: f64) -> ChiefState {
        let Some(frame_id) = self.frame_id.as_ref() else {
            if !self.invalid_logged {
                self.invalid_logged = true;
                error!(target: LOG_TARGET, "invalid configuration: inertial frame identifier is missing");
            }
            return ChiefState::failed(ProviderCode::InvalidInput, None);
        };

        match self.mode {
            ProviderMode::Current => match self.current {
                Some(sample) if sample.t == t0 => sample.to_state(frame_id),
                _ => {
                    if self.limiter.should_warn(t0) {
                        warn!(
                            target: LOG_TARGET,
                            "get: time missing (mode=current) t0={t0} current_t={:?}",
                            self.current.map(|s| s.t)
                        );
                    }
                    ChiefState::failed(ProviderCode::TimeMissing, Some(frame_id.clone()))
                }
            },
            ProviderMode::TimeSeries => match self.samples.find(t0) {
                Ok(sample) => sample.to_state(frame_id),
                Err(next_t) => {
                    if self.limiter.should_warn(t0) {
                        warn!(
                            target: LOG_TARGET,
                            "get: time missing (mode=timeseries) t0={t0} next_sample_t={next_t:?} count={}",
                            self.samples.len()
                        );
                    }
                    ChiefState::failed(ProviderCode::TimeMissing, Some(frame_id.clone()))
                }
            },
        }
    }
}
