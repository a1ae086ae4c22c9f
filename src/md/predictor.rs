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

use super::TimeGrid;
use crate::cosmic::{
    inertial_to_ric_relative, BullseyeFrame, BullseyeFrameSnapshot, ChiefState, OmegaCoords, ProviderCode,
};
use crate::dynamics::{EccentricLtv, Hcw, ModelError, RelStateRic, RelativeModel, YaStmParams};
use crate::io::{ConfigError, ModelKind, PredictionBuffer, PredictorConfig, Publisher, VehicleRegistry, MAX_STEPS};
use crate::linalg::Vector3;
use crate::providers::{AdoptedFrameProvider, ChiefStateProvider, VehicleStateProvider};
use crate::utils::is_finite_vec3;
use snafu::prelude::*;

const LOG_TARGET: &str = "bullseye::predictor";

/// Reason why a tick was not published.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PredictorError {
    #[snafu(display("empty prediction grid at t0 = {t0} s"))]
    EmptyGrid { t0: f64 },
    #[snafu(display("chief state unavailable at t0 = {t0} s: {status}"))]
    ChiefUnavailable { t0: f64, status: ProviderCode },
    #[snafu(display("Bullseye frame unavailable at t0 = {t0} s: {status}"))]
    FrameUnavailable { t0: f64, status: ProviderCode },
    #[snafu(display("mean motion cannot be computed at t0 = {t0} s"))]
    MeanMotionUnavailable { t0: f64 },
    #[snafu(display("relative motion model failed at t0 = {t0} s: {source}"))]
    Model { t0: f64, source: ModelError },
}

/// Returns the mean motion of the reference orbit: the frame's angular rate if it is declared in RIC and positive,
/// else |r × v| / |r|² of the chief.
pub fn mean_motion(chief: &ChiefState, frame: &BullseyeFrameSnapshot) -> Option<f64> {
    if frame.has_omega
        && frame.omega_coords == OmegaCoords::Ric
        && frame.omega_ric.z.is_finite()
        && frame.omega_ric.z > 0.0
    {
        return Some(frame.omega_ric.z);
    }

    if !is_finite_vec3(&chief.r_i) || !is_finite_vec3(&chief.v_i) {
        return None;
    }

    let r_norm = chief.r_i.norm();
    if !(r_norm > 0.0 && r_norm.is_finite()) {
        return None;
    }

    let n = chief.r_i.cross(&chief.v_i).norm() / (r_norm * r_norm);
    if n > 0.0 && n.is_finite() {
        Some(n)
    } else {
        None
    }
}

/// Predicts the RIC trajectory of every registered deputy at each tick and publishes them.
///
/// Each tick is computed for exactly one epoch: the chief, the frame, and every deputy are queried at that epoch
/// and nothing is interpolated. Any missing chief or frame skips the publication of the tick; a missing deputy
/// only invalidates its own row of the published buffer.
pub struct RelativePredictor<C, A, V>
where
    C: ChiefStateProvider,
    A: AdoptedFrameProvider,
    V: VehicleStateProvider,
{
    frame: BullseyeFrame<C, A>,
    vehicles: V,
    registry: VehicleRegistry,
    publisher: Publisher,
    config: PredictorConfig,
    grid: TimeGrid,
}

impl<C, A, V> RelativePredictor<C, A, V>
where
    C: ChiefStateProvider,
    A: AdoptedFrameProvider,
    V: VehicleStateProvider,
{
    /// Initializes a new predictor after validating its configuration. All the storage used by the ticks is
    /// allocated here.
    pub fn new(chief: C, adopted: Option<A>, vehicles: V, config: PredictorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let frame = BullseyeFrame::new(
            chief,
            adopted,
            config.frame_mode,
            config.on_adopted_invalid,
            config.tolerances,
        );

        info!(
            target: LOG_TARGET,
            "predictor ready: horizon={} cadence={} mode={:?} model={:?}",
            config.horizon,
            config.cadence,
            config.frame_mode,
            config.model
        );

        Ok(Self {
            frame,
            vehicles,
            registry: VehicleRegistry::new(),
            publisher: Publisher::new(),
            config,
            grid: TimeGrid::with_capacity(MAX_STEPS + 1),
        })
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Grid of the last tick.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn registry(&self) -> &VehicleRegistry {
        &self.registry
    }

    /// The registry indices are the rows of the published buffers.
    pub fn registry_mut(&mut self) -> &mut VehicleRegistry {
        &mut self.registry
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Last published predictions.
    pub fn latest(&self) -> &PredictionBuffer {
        self.publisher.read()
    }

    pub fn frame_mut(&mut self) -> &mut BullseyeFrame<C, A> {
        &mut self.frame
    }

    pub fn vehicle_provider_mut(&mut self) -> &mut V {
        &mut self.vehicles
    }

    /// Predicts with the configured model and publishes, returning the sequence number of the publication.
    pub fn step(&mut self, t0: f64) -> Result<u64, PredictorError> {
        self.tick(t0, None).map_err(|e| {
            warn!(target: LOG_TARGET, "tick skipped: {e}");
            e
        })
    }

    /// Predicts with the provided model instead of the configured one, and publishes.
    pub fn step_with_model(&mut self, t0: f64, model: &dyn RelativeModel) -> Result<u64, PredictorError> {
        self.tick(t0, Some(model)).map_err(|e| {
            warn!(target: LOG_TARGET, "tick skipped: {e}");
            e
        })
    }

    fn tick(&mut self, t0: f64, injected: Option<&dyn RelativeModel>) -> Result<u64, PredictorError> {
        self.grid
            .regenerate(self.config.horizon_s(), self.config.cadence_s());
        ensure!(!self.grid.is_empty(), EmptyGridSnafu { t0 });

        let (chief, snapshot) = self.frame.update_with_chief(t0);
        ensure!(
            chief.ok() && chief.frame_id.is_some(),
            ChiefUnavailableSnafu {
                t0,
                status: if chief.ok() {
                    ProviderCode::InvalidInput
                } else {
                    chief.status
                }
            }
        );
        ensure!(
            snapshot.ok(),
            FrameUnavailableSnafu {
                t0,
                status: snapshot.status
            }
        );

        let n = mean_motion(&chief, &snapshot).context(MeanMotionUnavailableSnafu { t0 })?;

        // The relative velocity is taken in the frame rotating at the snapshot rate, or at the mean motion about
        // the cross-track axis if the snapshot does not declare one in RIC.
        let omega_ric = if snapshot.has_omega && snapshot.omega_coords == OmegaCoords::Ric {
            snapshot.omega_ric
        } else {
            Vector3::new(0.0, 0.0, n)
        };
        let c_i2r = snapshot.c_from_inertial_to_ric();

        let hcw;
        let eccentric;
        let model: &dyn RelativeModel = match injected {
            Some(model) => model,
            None => match self.config.model {
                ModelKind::Hcw => {
                    hcw = Hcw::new(n);
                    &hcw
                }
                ModelKind::Eccentric {
                    mu_m3_s2,
                    max_substep_s,
                } => {
                    eccentric = EccentricLtv::new(
                        YaStmParams::builder()
                            .mu_m3_s2(mu_m3_s2)
                            .chief_r0_i(chief.r_i)
                            .chief_v0_i(chief.v_i)
                            .max_substep_s(max_substep_s)
                            .build(),
                    );
                    &eccentric
                }
            },
        };

        let steps = self.grid.len();
        let buf = self.publisher.begin_write();
        buf.reset(t0, steps);

        for (idx, &id) in self.registry.ids().iter().enumerate() {
            let deputy = self.vehicles.get(id, t0);
            if !deputy.ok() {
                debug!(target: LOG_TARGET, "vehicle {id} skipped at t0 = {t0} s: {}", deputy.status);
                continue;
            }
            if deputy.frame_id != chief.frame_id {
                debug!(
                    target: LOG_TARGET,
                    "vehicle {id} skipped at t0 = {t0} s: frame {:?} differs from chief frame {:?}",
                    deputy.frame_id,
                    chief.frame_id
                );
                continue;
            }

            let x0: RelStateRic = inertial_to_ric_relative(
                &deputy.r_i,
                &deputy.v_i,
                &chief.r_i,
                &chief.v_i,
                &c_i2r,
                &omega_ric,
            )
            .into();

            match model.predict(&x0, &self.grid, buf.row_mut(idx), None) {
                Ok(_) => buf.valid[idx] = true,
                Err(e @ ModelError::InsufficientCapacity { .. }) => {
                    return Err(PredictorError::Model { t0, source: e });
                }
                Err(e) => {
                    debug!(target: LOG_TARGET, "vehicle {id} skipped at t0 = {t0} s: {e}");
                }
            }
        }

        Ok(self.publisher.publish(t0))
    }
}
