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

use super::ChiefStateProvider;
use crate::cosmic::{ChiefState, FrameId, ProviderCode};
use crate::linalg::Vector3;
use crate::tools::{propagate_universal, KEPLER_ITERS_PROVIDER};
use std::fmt::Display;

const LOG_TARGET: &str = "bullseye::provider::two_body";

/// Chief state provider which propagates an epoch state under point mass gravity to any requested time.
///
/// Every successful state is tagged at exactly the requested time. An invalid configuration (missing frame
/// identifier, non positive μ, non finite or zero radius epoch state) fails every query with `InvalidInput` and is
/// logged once. A propagation which yields a non finite or non positive radius fails with `InternalError`.
#[derive(Clone, Debug)]
pub struct TwoBodyChiefProvider {
    frame_id: Option<FrameId>,
    mu_m3_s2: f64,
    t_epoch_s: f64,
    r_epoch_i: Vector3<f64>,
    v_epoch_i: Vector3<f64>,
    invalid_logged: bool,
}

impl TwoBodyChiefProvider {
    pub fn new(
        frame_id: Option<FrameId>,
        mu_m3_s2: f64,
        t_epoch_s: f64,
        r_epoch_i: Vector3<f64>,
        v_epoch_i: Vector3<f64>,
    ) -> Self {
        info!(
            target: LOG_TARGET,
            "init: frame_id={} mu={mu_m3_s2} t_epoch={t_epoch_s}",
            frame_id.as_ref().map_or("(none)", |id| id.as_str()),
        );
        Self {
            frame_id,
            mu_m3_s2,
            t_epoch_s,
            r_epoch_i,
            v_epoch_i,
            invalid_logged: false,
        }
    }

    pub fn mu_m3_s2(&self) -> f64 {
        self.mu_m3_s2
    }

    pub fn epoch_s(&self) -> f64 {
        self.t_epoch_s
    }

    fn invalid(&mut self, why: impl Display) -> ChiefState {
        if !self.invalid_logged {
            self.invalid_logged = true;
            error!(target: LOG_TARGET, "invalid configuration: {why}");
        }
        ChiefState::failed(ProviderCode::InvalidInput, self.frame_id.clone())
    }
}

impl ChiefStateProvider for TwoBodyChiefProvider {
    fn get(&mut self, t0: f64) -> ChiefState {
        let Some(frame_id) = self.frame_id.clone() else {
            return self.invalid("inertial frame identifier is missing");
        };

        if !t0.is_finite() || !self.t_epoch_s.is_finite() {
            return self.invalid("non-finite time");
        }

        match propagate_universal::<KEPLER_ITERS_PROVIDER>(
            &self.r_epoch_i,
            &self.v_epoch_i,
            self.mu_m3_s2,
            t0 - self.t_epoch_s,
        ) {
            Ok((r_i, v_i)) => ChiefState::new(t0, r_i, v_i, frame_id),
            Err(e) if e.is_invalid_input() => self.invalid(e),
            Err(e) => {
                debug!(target: LOG_TARGET, "get: propagation to t0={t0} failed: {e}");
                ChiefState::failed(ProviderCode::InternalError, Some(frame_id))
            }
        }
    }
}
