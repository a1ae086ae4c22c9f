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

use crate::dynamics::{DynamicsError, RelativeDynamics};
use crate::linalg::Vector6;
use crate::utils::is_finite_vec6;
use snafu::prelude::*;

mod rk_methods;
pub use self::rk_methods::*;

/// Default upper bound of a single integration substep, in seconds.
pub const DEFAULT_MAX_SUBSTEP_S: f64 = 0.25;

#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropagationError {
    #[snafu(display("encountered a dynamics error after {steps_written} grid points: {source}"))]
    Dynamics {
        steps_written: usize,
        source: DynamicsError,
    },
    #[snafu(display("relative state became non finite after {steps_written} grid points"))]
    NonFiniteState { steps_written: usize },
    #[snafu(display("grid offset #{k} ({tau} s) is negative or not finite"))]
    InvalidOffset { k: usize, tau: f64 },
    #[snafu(display("grid offset #{k} ({tau} s) precedes the previous offset ({prev} s)"))]
    DecreasingOffset { k: usize, tau: f64, prev: f64 },
    #[snafu(display("maximum substep must be finite and positive, got {max_substep} s"))]
    InvalidSubstep { max_substep: f64 },
}

impl PropagationError {
    /// Number of grid points fully propagated before the error.
    pub fn steps_written(&self) -> usize {
        match self {
            Self::Dynamics { steps_written, .. } | Self::NonFiniteState { steps_written } => {
                *steps_written
            }
            Self::InvalidOffset { k, .. } | Self::DecreasingOffset { k, .. } => *k,
            Self::InvalidSubstep { .. } => 0,
        }
    }
}

/// Number of equal substeps needed to cover `dt` without exceeding `max_substep`, i.e. ceil(dt / max_substep).
pub fn substep_count(dt: f64, max_substep: f64) -> u64 {
    // Saturating cast: callers have checked that both are finite and positive
    (dt / max_substep).ceil() as u64
}

/// Advances the state by one fixed step `h` from time `t` with the provided Runge Kutta method.
///
/// The stages are stack allocated, so the method may have at most `MAX_STAGES` stages.
pub fn rk_step<M: RK, D: RelativeDynamics + ?Sized>(
    dynamics: &D,
    t: f64,
    h: f64,
    state: &Vector6<f64>,
) -> Result<Vector6<f64>, DynamicsError> {
    let mut k = [Vector6::<f64>::zeros(); MAX_STAGES];
    k[0] = dynamics.eom(t, state)?;

    let mut a_idx: usize = 0;
    for i in 0..(M::STAGES - 1) {
        // c_i = \sum_j a_ij
        let mut ci: f64 = 0.0;
        let mut wi = Vector6::<f64>::zeros();
        for kj in &k[0..i + 1] {
            let a_ij = M::A_COEFFS[a_idx];
            ci += a_ij;
            wi += a_ij * kj;
            a_idx += 1;
        }

        k[i + 1] = dynamics.eom(t + ci * h, &(state + h * wi))?;
    }

    let mut next_state = *state;
    for (i, ki) in k[..M::STAGES].iter().enumerate() {
        next_state += h * M::B_COEFFS[i] * ki;
    }

    Ok(next_state)
}

/// Propagates the initial state through the time grid `tau`, calling `on_point(k, state)` once the state at
/// `tau[k]` is known, and returns the number of grid points propagated.
///
/// Each interval between two offsets is split into `substep_count(dt, max_substep)` equal fixed steps. The grid
/// is checked as it is traversed: a negative, non finite, or decreasing offset stops the propagation, and so does
/// any dynamics error or non finite state. The error reports how many grid points were complete.
pub fn propagate_on_grid<M, D, F>(
    dynamics: &D,
    max_substep: f64,
    x0: &Vector6<f64>,
    tau: &[f64],
    mut on_point: F,
) -> Result<usize, PropagationError>
where
    M: RK,
    D: RelativeDynamics + ?Sized,
    F: FnMut(usize, &Vector6<f64>),
{
    ensure!(
        max_substep > 0.0 && max_substep.is_finite(),
        InvalidSubstepSnafu { max_substep }
    );

    let mut state = *x0;
    let mut t_prev = 0.0;

    for (k, &t_target) in tau.iter().enumerate() {
        ensure!(
            t_target >= 0.0 && t_target.is_finite(),
            InvalidOffsetSnafu { k, tau: t_target }
        );
        ensure!(
            t_target >= t_prev,
            DecreasingOffsetSnafu {
                k,
                tau: t_target,
                prev: t_prev
            }
        );

        let dt = t_target - t_prev;
        if dt > 0.0 {
            let n_steps = substep_count(dt, max_substep);
            let h = dt / (n_steps as f64);

            let mut t = t_prev;
            for _ in 0..n_steps {
                state = rk_step::<M, D>(dynamics, t, h, &state)
                    .context(DynamicsSnafu { steps_written: k })?;
                ensure!(is_finite_vec6(&state), NonFiniteStateSnafu { steps_written: k });
                t += h;
            }
        }

        on_point(k, &state);
        t_prev = t_target;
    }

    Ok(tau.len())
}
