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

use crate::linalg::Vector3;
use crate::utils::{is_finite_vec3, stumpff_cs};
use snafu::prelude::*;

/// Fixed number of Newton iterations used by the two-body chief state provider.
pub const KEPLER_ITERS_PROVIDER: usize = 12;
/// Fixed number of Newton iterations used by the eccentric reference relative dynamics, evaluated at every RK stage.
pub const KEPLER_ITERS_MODEL: usize = 8;
/// Above this magnitude of the reciprocal semi-major axis, the universal anomaly seed scales with |α|.
pub const KEPLER_ALPHA_SEED_THRESHOLD: f64 = 1e-8;

#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum KeplerError {
    #[snafu(display("Kepler propagation requires finite inputs"))]
    NonFiniteInput,
    #[snafu(display("gravitational parameter must be finite and positive, got {mu} m^3/s^2"))]
    NonPositiveMu { mu: f64 },
    #[snafu(display("initial radius must be finite and positive, got {r_m} m"))]
    DegenerateRadius { r_m: f64 },
    #[snafu(display("propagated radius is not positive or not finite: {r_m} m"))]
    PropagatedRadius { r_m: f64 },
    #[snafu(display("propagated state is not finite"))]
    NonFiniteOutput,
}

impl KeplerError {
    /// Returns true if this error is caused by the inputs rather than by the propagation itself.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteInput | Self::NonPositiveMu { .. } | Self::DegenerateRadius { .. }
        )
    }
}

/// Propagates the provided Cartesian state by `dt` seconds under point mass gravity, using the universal variable
/// formulation of Kepler's equation.
///
/// The universal anomaly is solved with exactly `ITERS` Newton iterations: there is no early exit on convergence,
/// such that identical inputs always yield bitwise identical outputs. An iteration whose derivative is zero or
/// not finite leaves the anomaly unchanged but still counts toward the budget.
///
/// Units are meters, meters per second, seconds, and m^3/s^2. `dt` may be negative.
pub fn propagate_universal<const ITERS: usize>(
    r0: &Vector3<f64>,
    v0: &Vector3<f64>,
    mu: f64,
    dt: f64,
) -> Result<(Vector3<f64>, Vector3<f64>), KeplerError> {
    ensure!(mu > 0.0 && mu.is_finite(), NonPositiveMuSnafu { mu });
    ensure!(
        dt.is_finite() && is_finite_vec3(r0) && is_finite_vec3(v0),
        NonFiniteInputSnafu
    );

    let r0_norm = r0.norm();
    ensure!(
        r0_norm > 0.0 && r0_norm.is_finite(),
        DegenerateRadiusSnafu { r_m: r0_norm }
    );

    let sqrt_mu = mu.sqrt();
    // Reciprocal of the semi-major axis
    let alpha = 2.0 / r0_norm - v0.dot(v0) / mu;

    let mut x = if alpha.abs() > KEPLER_ALPHA_SEED_THRESHOLD {
        sqrt_mu * alpha.abs() * dt
    } else {
        // Near parabolic
        sqrt_mu * dt / r0_norm
    };

    let r0_dot_v0_sqrt_mu = r0.dot(v0) / sqrt_mu;
    let one_minus_alpha_r0 = 1.0 - alpha * r0_norm;

    for _ in 0..ITERS {
        let x2 = x * x;
        let z = alpha * x2;
        let (c, s) = stumpff_cs(z);
        let x3 = x2 * x;

        let f_x = r0_dot_v0_sqrt_mu * x2 * c + one_minus_alpha_r0 * x3 * s + r0_norm * x
            - sqrt_mu * dt;
        let df_x = r0_dot_v0_sqrt_mu * x * (1.0 - z * s) + one_minus_alpha_r0 * x2 * c + r0_norm;

        if df_x == 0.0 || !df_x.is_finite() || !f_x.is_finite() {
            continue;
        }

        x -= f_x / df_x;
    }

    let x2 = x * x;
    let z = alpha * x2;
    let (c, s) = stumpff_cs(z);

    // Lagrange coefficients
    let f = 1.0 - (x2 / r0_norm) * c;
    let g = dt - (x2 * x / sqrt_mu) * s;

    let r = f * r0 + g * v0;
    let r_norm = r.norm();
    ensure!(
        r_norm > 0.0 && r_norm.is_finite(),
        PropagatedRadiusSnafu { r_m: r_norm }
    );

    let f_dot = (sqrt_mu / (r0_norm * r_norm)) * (z * s - 1.0) * x;
    let g_dot = 1.0 - (x2 / r_norm) * c;

    let v = f_dot * r0 + g_dot * v0;

    ensure!(is_finite_vec3(&r) && is_finite_vec3(&v), NonFiniteOutputSnafu);

    Ok((r, v))
}
