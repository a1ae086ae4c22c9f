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

use super::{ExactSeries, ProviderMode, StateSample, VehicleStateProvider, WarnLimiter, DEFAULT_WARN_PERIOD_S};
use crate::cosmic::{FrameId, ProviderCode, VehicleState};
use crate::io::VehicleId;
use crate::linalg::Vector3;

const LOG_TARGET: &str = "bullseye::provider::vehicle";

#[derive(Clone, Debug, Default)]
struct VehicleTrack {
    current: Option<StateSample>,
    samples: ExactSeries<StateSample>,
}

/// Deputy vehicle state provider fed with Cartesian states, each vehicle having its own current state or series
/// of samples.
#[derive(Clone, Debug)]
pub struct CartesianVehicleProvider {
    frame_id: Option<FrameId>,
    mode: ProviderMode,
    limiter: WarnLimiter,
    invalid_logged: bool,
    tracks: Vec<(VehicleId, VehicleTrack)>,
}

impl CartesianVehicleProvider {
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
            tracks: Vec::new(),
        }
    }

    pub fn current(frame_id: FrameId) -> Self {
        Self::new(Some(frame_id), ProviderMode::Current, DEFAULT_WARN_PERIOD_S)
    }

    pub fn time_series(frame_id: FrameId) -> Self {
        Self::new(Some(frame_id), ProviderMode::TimeSeries, DEFAULT_WARN_PERIOD_S)
    }

    fn track_mut(&mut self, id: VehicleId) -> &mut VehicleTrack {
        let idx = match self.tracks.iter().position(|(vid, _)| *vid == id) {
            Some(idx) => idx,
            None => {
                self.tracks.push((id, VehicleTrack::default()));
                self.tracks.len() - 1
            }
        };
        &mut self.tracks[idx].1
    }

    pub fn set_current(&mut self, id: VehicleId, t: f64, r_i: Vector3<f64>, v_i: Vector3<f64>) {
        self.track_mut(id).current = Some(StateSample { t, r_i, v_i });
        debug!(target: LOG_TARGET, "set_current: id={id} t={t}");
    }

    /// Appends a sample for this vehicle; samples may be added in any order.
    pub fn add_sample(&mut self, id: VehicleId, t: f64, r_i: Vector3<f64>, v_i: Vector3<f64>) {
        let track = self.track_mut(id);
        track.samples.push(StateSample { t, r_i, v_i });
        debug!(target: LOG_TARGET, "add_sample: id={id} t={t} count={}", track.samples.len());
    }

    /// Removes the samples and current state of every vehicle.
    pub fn clear_samples(&mut self) {
        self.tracks.clear();
        debug!(target: LOG_TARGET, "clear_samples");
    }

    pub fn sample_count(&self, id: VehicleId) -> usize {
        self.tracks
            .iter()
            .find(|(vid, _)| *vid == id)
            .map_or(0, |(_, track)| track.samples.len())
    }
}

impl VehicleStateProvider for CartesianVehicleProvider {
    fn get(&mut self, id: VehicleId, t0: f64) -> VehicleState {
        let Some(frame_id) = self.frame_id.as_ref() else {
            if !self.invalid_logged {
                self.invalid_logged = true;
                error!(target: LOG_TARGET, "invalid configuration: inertial frame identifier is missing");
            }
            return VehicleState::failed(ProviderCode::InvalidInput, None);
        };

        let Some((_, track)) = self.tracks.iter_mut().find(|(vid, _)| *vid == id) else {
            return VehicleState::failed(ProviderCode::NotAvailable, Some(frame_id.clone()));
        };

        let found = match self.mode {
            ProviderMode::Current => match track.current {
                Some(sample) if sample.t == t0 => Ok(sample.to_state(frame_id)),
                Some(sample) => Err(Some(sample.t)),
                None => Err(None),
            },
            ProviderMode::TimeSeries => track.samples.find(t0).map(|sample| sample.to_state(frame_id)),
        };

        found.unwrap_or_else(|other_t| {
            if self.limiter.should_warn(t0) {
                warn!(
                    target: LOG_TARGET,
                    "get: time missing (mode={:?}) id={id} t0={t0} nearest_t={other_t:?}", self.mode
                );
            }
            VehicleState::failed(ProviderCode::TimeMissing, Some(frame_id.clone()))
        })
    }
}
