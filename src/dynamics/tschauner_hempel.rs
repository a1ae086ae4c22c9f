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

use super::{
    usable_velocity_storage, ChiefPropagationSnafu, DynamicsError, ModelError, RelStateRic,
    RelativeDynamics, RelativeModel,
};
use crate::cosmic::EARTH_MU_M3_S2;
use crate::linalg::{Vector3, Vector6};
use crate::md::TimeGrid;
use crate::propagators::{propagate_on_grid, PropagationError, RK4Fixed, DEFAULT_MAX_SUBSTEP_S};
use crate::tools::{propagate_universal, KEPLER_ITERS_MODEL};
use crate::utils::is_finite_vec3;
use snafu::ResultExt;
use typed_builder::TypedBuilder;

/// Parameters of the eccentric reference model.
#[derive(Copy, Clone, Debug, PartialEq, TypedBuilder)]
#[builder(doc)]
pub struct YaStmParams {
    /// Gravitational parameter of the central body, in m^3/s^2
    #[builder(default = EARTH_MU_M3_S2)]
    pub mu_m3_s2: f64,
    /// Chief inertial position at the prediction epoch, in meters
    pub chief_r0_i: Vector3<f64>,
    /// Chief inertial velocity at the prediction epoch, in meters per second
    pub chief_v0_i: Vector3<f64>,
    /// Upper bound of each RK4 substep, in seconds
    #[builder(default = DEFAULT_MAX_SUBSTEP_S)]
    pub max_substep_s: f64,
}

/// Linearized relative motion about an eccentric Keplerian reference orbit (Tschauner-Hempel / Yamanaka-Ankersen
/// family), integrated with a fixed step RK4 instead of the closed-form state transition matrix.
///
/// The reference orbit is re-propagated from the epoch chief state at every stage with a fixed iteration
/// universal variable Kepler solve, so the prediction is deterministic. With x radial, y in-track, z cross-track,
/// ω = |h|/r² and ω̇ = −2ω ṙ/r:
///
/// ```text
/// ẍ = (2μ/r³ + ω²) x + 2ω ẏ + ω̇ y
/// ÿ = (ω² − μ/r³) y − 2ω ẋ − ω̇ x
/// z̈ = −μ/r³ z
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EccentricLtv {
    pub params: YaStmParams,
}

impl EccentricLtv {
    pub fn new(params: YaStmParams) -> Self {
        Self { params }
    }
}

impl RelativeDynamics for EccentricLtv {
    fn eom(&self, t: f64, state: &Vector6<f64>) -> Result<Vector6<f64>, DynamicsError> {
        let (r_i, v_i) = propagate_universal::<KEPLER_ITERS_MODEL>(
            &self.params.chief_r0_i,
            &self.params.chief_v0_i,
            self.params.mu_m3_s2,
            t,
        )
        .context(ChiefPropagationSnafu { t })?;

        let r = r_i.norm();
        let h = r_i.cross(&v_i).norm();
        if !(r > 0.0 && r.is_finite() && h > 0.0 && h.is_finite()) {
            return Err(DynamicsError::DegenerateChief { t });
        }

        let r_dot = r_i.dot(&v_i) / r;
        let omega = h / (r * r);
        let omega_dot = -2.0 * omega * r_dot / r;
        let mu_r3 = self.params.mu_m3_s2 / (r * r * r);
        let omega2 = omega * omega;

        let (x, y, z) = (state[0], state[1], state[2]);
        let (xd, yd, zd) = (state[3], state[4], state[5]);

        Ok(Vector6::new(
            xd,
            yd,
            zd,
            (2.0 * mu_r3 + omega2) * x + 2.0 * omega * yd + omega_dot * y,
            (omega2 - mu_r3) * y - 2.0 * omega * xd - omega_dot * x,
            -mu_r3 * z,
        ))
    }
}

impl RelativeModel for EccentricLtv {
    fn predict(
        &self,
        x0: &RelStateRic,
        grid: &TimeGrid,
        out_r: &mut [Vector3<f64>],
        out_v: Option<&mut [Vector3<f64>]>,
    ) -> Result<usize, ModelError> {
        let p = &self.params;
        if !(p.mu_m3_s2 > 0.0 && p.mu_m3_s2.is_finite()) {
            return Err(ModelError::InvalidInput {
                steps_written: 0,
                reason: "gravitational parameter must be finite and positive",
            });
        }
        if !(p.max_substep_s > 0.0 && p.max_substep_s.is_finite()) {
            return Err(ModelError::InvalidInput {
                steps_written: 0,
                reason: "maximum substep must be finite and positive",
            });
        }
        if !is_finite_vec3(&p.chief_r0_i) || !is_finite_vec3(&p.chief_v0_i) {
            return Err(ModelError::InvalidInput {
                steps_written: 0,
                reason: "chief epoch state is not finite",
            });
        }
        if !x0.is_finite() {
            return Err(ModelError::InvalidInput {
                steps_written: 0,
                reason: "initial relative state is not finite",
            });
        }

        let steps = grid.len();
        if steps == 0 {
            return Ok(0);
        }
        if out_r.len() < steps {
            return Err(ModelError::InsufficientCapacity {
                required: steps,
                available: out_r.len(),
            });
        }
        let mut out_v = usable_velocity_storage(out_v, steps);

        propagate_on_grid::<RK4Fixed, _, _>(
            self,
            p.max_substep_s,
            &x0.to_vector(),
            grid.tau(),
            |k, x| {
                out_r[k] = Vector3::new(x[0], x[1], x[2]);
                if let Some(out_v) = out_v.as_deref_mut() {
                    out_v[k] = Vector3::new(x[3], x[4], x[5]);
                }
            },
        )
        .map_err(|e| ModelError::InvalidInput {
            steps_written: e.steps_written(),
            reason: match e {
                PropagationError::InvalidOffset { .. } => {
                    "grid offsets must be finite and non-negative"
                }
                PropagationError::DecreasingOffset { .. } => "grid offsets must be non-decreasing",
                PropagationError::Dynamics { .. } => "reference orbit propagation failed",
                PropagationError::NonFiniteState { .. } => "relative state became non finite",
                PropagationError::InvalidSubstep { .. } => {
                    "maximum substep must be finite and positive"
                }
            },
        })
    }
}
