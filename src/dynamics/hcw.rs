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

use super::{usable_velocity_storage, ModelError, RelStateRic, RelativeModel};
use crate::linalg::Vector3;
use crate::md::TimeGrid;
use serde_derive::{Deserialize, Serialize};

/// Parameters of the circular reference model.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HcwParams {
    /// Mean motion of the reference orbit, in rad/s
    pub n_radps: f64,
}

/// Hill-Clohessy-Wiltshire closed-form solution, with x radial, y in-track, and z cross-track.
///
/// ```text
/// x(t)  = (4 − 3c) x0 + s/n ẋ0 + 2/n (1 − c) ẏ0
/// y(t)  = 6 (s − nt) x0 + y0 − 2/n (1 − c) ẋ0 + 1/n (4s − 3nt) ẏ0
/// z(t)  = c z0 + s/n ż0
/// ẋ(t) = 3n s x0 + c ẋ0 + 2s ẏ0
/// ẏ(t) = 6n (c − 1) x0 − 2s ẋ0 + (4c − 3) ẏ0
/// ż(t) = −n s z0 + c ż0
/// ```
/// where s = sin(nt) and c = cos(nt). Each grid point is evaluated independently.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hcw {
    pub params: HcwParams,
}

impl Hcw {
    pub fn new(n_radps: f64) -> Self {
        Self {
            params: HcwParams { n_radps },
        }
    }
}

impl RelativeModel for Hcw {
    fn predict(
        &self,
        x0: &RelStateRic,
        grid: &TimeGrid,
        out_r: &mut [Vector3<f64>],
        out_v: Option<&mut [Vector3<f64>]>,
    ) -> Result<usize, ModelError> {
        let n = self.params.n_radps;
        if !(n > 0.0 && n.is_finite()) {
            return Err(ModelError::InvalidInput {
                steps_written: 0,
                reason: "mean motion must be finite and positive",
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

        let (xd0, yd0, zd0) = (x0.v_ric[0], x0.v_ric[1], x0.v_ric[2]);
        let (x0, y0, z0) = (x0.r_ric[0], x0.r_ric[1], x0.r_ric[2]);
        let inv_n = 1.0 / n;

        for (k, &t) in grid.tau().iter().enumerate() {
            if !(t >= 0.0 && t.is_finite()) {
                return Err(ModelError::InvalidInput {
                    steps_written: k,
                    reason: "grid offsets must be finite and non-negative",
                });
            }

            let nt = n * t;
            let (s, c) = nt.sin_cos();

            out_r[k] = Vector3::new(
                (4.0 - 3.0 * c) * x0 + inv_n * s * xd0 + (2.0 * inv_n) * (1.0 - c) * yd0,
                6.0 * (s - nt) * x0 + y0 - (2.0 * inv_n) * (1.0 - c) * xd0
                    + inv_n * (4.0 * s - 3.0 * nt) * yd0,
                c * z0 + inv_n * s * zd0,
            );

            if let Some(out_v) = out_v.as_deref_mut() {
                out_v[k] = Vector3::new(
                    3.0 * n * s * x0 + c * xd0 + 2.0 * s * yd0,
                    6.0 * n * (c - 1.0) * x0 - 2.0 * s * xd0 + (4.0 * c - 3.0) * yd0,
                    -n * s * z0 + c * zd0,
                );
            }
        }

        Ok(steps)
    }
}
