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

use super::{AdoptedFrameProvider, ExactSeries, ProviderMode, Timed, WarnLimiter, DEFAULT_WARN_PERIOD_S};
use crate::cosmic::{AdoptedRicFrame, AxisOrder, FrameId, FrameKind, OmegaCoords, ProviderCode};
use crate::linalg::{Matrix3, Vector3};

const LOG_TARGET: &str = "bullseye::provider::frame";

#[derive(Copy, Clone, Debug, PartialEq)]
struct FrameSample {
    t: f64,
    origin_i: Vector3<f64>,
    c_from_ric_to_inertial: Matrix3<f64>,
    omega_ric: Option<Vector3<f64>>,
}

impl Timed for FrameSample {
    fn time(&self) -> f64 {
        self.t
    }
}

/// Adopted RIC frame provider fed with externally computed frames.
///
/// Every frame it returns declares the Bullseye RIC kind in R, I, C order, and its angular rate (when set) in RIC
/// coordinates. Whether the frame is actually acceptable is decided by the validator, not by this provider.
#[derive(Clone, Debug)]
pub struct CartesianFrameProvider {
    frame_source_id: Option<FrameId>,
    mode: ProviderMode,
    limiter: WarnLimiter,
    invalid_logged: bool,
    current: Option<FrameSample>,
    samples: ExactSeries<FrameSample>,
}

impl CartesianFrameProvider {
    /// Initializes a new provider. A missing source identifier makes every query fail with `InvalidInput`.
    pub fn new(frame_source_id: Option<FrameId>, mode: ProviderMode, warn_period_s: f64) -> Self {
        info!(
            target: LOG_TARGET,
            "init: mode={mode:?} frame_source_id={} warn_period_s={warn_period_s}",
            frame_source_id.as_ref().map_or("(none)", |id| id.as_str()),
        );
        Self {
            frame_source_id,
            mode,
            limiter: WarnLimiter::new(warn_period_s),
            invalid_logged: false,
            current: None,
            samples: ExactSeries::default(),
        }
    }

    pub fn current(frame_source_id: FrameId) -> Self {
        Self::new(Some(frame_source_id), ProviderMode::Current, DEFAULT_WARN_PERIOD_S)
    }

    pub fn time_series(frame_source_id: FrameId) -> Self {
        Self::new(Some(frame_source_id), ProviderMode::TimeSeries, DEFAULT_WARN_PERIOD_S)
    }

    /// Sets the current frame, without angular rate.
    pub fn set_current(&mut self, t: f64, origin_i: Vector3<f64>, c_from_ric_to_inertial: Matrix3<f64>) {
        self.current = Some(FrameSample {
            t,
            origin_i,
            c_from_ric_to_inertial,
            omega_ric: None,
        });
        debug!(target: LOG_TARGET, "set_current: t={t}");
    }

    /// Sets the angular rate, in RIC coordinates, of the current frame. No-op if no current frame is set.
    pub fn set_current_omega_ric(&mut self, omega_ric: Vector3<f64>) {
        if let Some(current) = self.current.as_mut() {
            current.omega_ric = Some(omega_ric);
            debug!(target: LOG_TARGET, "set_current_omega_ric: t={}", current.t);
        }
    }

    pub fn clear_current_omega(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.omega_ric = None;
        }
        debug!(target: LOG_TARGET, "clear_current_omega");
    }

    /// Appends a frame sample, without angular rate; samples may be added in any order.
    pub fn add_sample(&mut self, t: f64, origin_i: Vector3<f64>, c_from_ric_to_inertial: Matrix3<f64>) {
        self.samples.push(FrameSample {
            t,
            origin_i,
            c_from_ric_to_inertial,
            omega_ric: None,
        });
        debug!(target: LOG_TARGET, "add_sample: t={t} count={}", self.samples.len());
    }

    /// Sets the angular rate of the most recently added sample. No-op if there are no samples.
    pub fn set_last_sample_omega_ric(&mut self, omega_ric: Vector3<f64>) {
        if let Some(last) = self.samples.last_mut() {
            last.omega_ric = Some(omega_ric);
        }
    }

    pub fn clear_samples(&mut self) {
        self.samples.clear();
        debug!(target: LOG_TARGET, "clear_samples");
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    fn to_frame(sample: &FrameSample, frame_source_id: &FrameId) -> AdoptedRicFrame {
        AdoptedRicFrame {
            time_tag: sample.t,
            origin_i: sample.origin_i,
            c_from_ric_to_inertial: sample.c_from_ric_to_inertial,
            has_omega: sample.omega_ric.is_some(),
            omega_ric: sample.omega_ric.unwrap_or_else(Vector3::zeros),
            omega_coords: if sample.omega_ric.is_some() {
                OmegaCoords::Ric
            } else {
                OmegaCoords::Unspecified
            },
            frame_kind: FrameKind::BullseyeRic,
            axis_order: AxisOrder::Ric,
            frame_source_id: Some(frame_source_id.clone()),
            status: ProviderCode::Ok,
        }
    }
}

impl AdoptedFrameProvider for CartesianFrameProvider {
    fn get(&mut self, t0: f64) -> AdoptedRicFrame {
        let Some(source_id) = self.frame_source_id.as_ref() else {
            if !self.invalid_logged {
                self.invalid_logged = true;
                error!(target: LOG_TARGET, "invalid configuration: frame source identifier is missing");
            }
            return AdoptedRicFrame::failed(ProviderCode::InvalidInput, None);
        };

        let found = match self.mode {
            ProviderMode::Current => match self.current.as_ref() {
                Some(sample) if sample.t == t0 => Ok(Self::to_frame(sample, source_id)),
                Some(sample) => Err(Some(sample.t)),
                None => Err(None),
            },
            ProviderMode::TimeSeries => self
                .samples
                .find(t0)
                .map(|sample| Self::to_frame(sample, source_id)),
        };

        found.unwrap_or_else(|other_t| {
            if self.limiter.should_warn(t0) {
                warn!(
                    target: LOG_TARGET,
                    "get: time missing (mode={:?}) t0={t0} nearest_t={other_t:?}", self.mode
                );
            }
            AdoptedRicFrame::failed(ProviderCode::TimeMissing, Some(source_id.clone()))
        })
    }
}
