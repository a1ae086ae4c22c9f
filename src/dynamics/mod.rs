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

use crate::cosmic::RelState;
use crate::linalg::{Vector3, Vector6};
use crate::md::TimeGrid;
use crate::tools::KeplerError;
use snafu::prelude::*;

/// Closed-form Hill-Clohessy-Wiltshire relative motion about a circular reference orbit.
pub mod hcw;
pub use self::hcw::*;

/// Linearized relative motion about an eccentric reference orbit, numerically integrated.
pub mod tschauner_hempel;
pub use self::tschauner_hempel::*;

/// Relative position and velocity of a deputy with respect to the chief, in RIC coordinates.
///
/// The velocity is the derivative of the position taken in the rotating RIC frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RelStateRic {
    pub r_ric: Vector3<f64>,
    pub v_ric: Vector3<f64>,
}

impl RelStateRic {
    pub fn new(r_ric: Vector3<f64>, v_ric: Vector3<f64>) -> Self {
        Self { r_ric, v_ric }
    }

    pub fn zeros() -> Self {
        Self::default()
    }

    /// Returns the state as [x, y, z, ẋ, ẏ, ż].
    pub fn to_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.r_ric[0],
            self.r_ric[1],
            self.r_ric[2],
            self.v_ric[0],
            self.v_ric[1],
            self.v_ric[2],
        )
    }

    pub fn from_vector(x: &Vector6<f64>) -> Self {
        Self {
            r_ric: x.fixed_rows::<3>(0).into_owned(),
            v_ric: x.fixed_rows::<3>(3).into_owned(),
        }
    }

    pub fn is_finite(&self) -> bool {
        crate::utils::is_finite_vec3(&self.r_ric) && crate::utils::is_finite_vec3(&self.v_ric)
    }
}

impl From<RelState> for RelStateRic {
    fn from(rel: RelState) -> Self {
        Self {
            r_ric: rel.r,
            v_ric: rel.v,
        }
    }
}

/// Relative motion model errors.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ModelError {
    /// Invalid parameters, initial state, or time grid, or a non finite intermediate value. Only the first
    /// `steps_written` outputs are complete.
    #[snafu(display("invalid input after {steps_written} steps: {reason}"))]
    InvalidInput {
        steps_written: usize,
        reason: &'static str,
    },
    /// The caller provided output storage is smaller than the time grid.
    #[snafu(display("output storage holds {available} steps but the grid has {required}"))]
    InsufficientCapacity { required: usize, available: usize },
}

impl ModelError {
    /// Number of grid points fully written before the error.
    pub fn steps_written(&self) -> usize {
        match self {
            Self::InvalidInput { steps_written, .. } => *steps_written,
            Self::InsufficientCapacity { .. } => 0,
        }
    }
}

/// A relative motion model which predicts the relative state of a deputy over a time grid.
pub trait RelativeModel {
    /// Writes the relative position (and velocity, if `out_v` is provided and holds at least as many entries as the
    /// grid) at each grid offset into the caller provided storage, and returns the number of grid points written.
    ///
    /// An empty grid is a success with zero steps written.
    fn predict(
        &self,
        x0: &RelStateRic,
        grid: &TimeGrid,
        out_r: &mut [Vector3<f64>],
        out_v: Option<&mut [Vector3<f64>]>,
    ) -> Result<usize, ModelError>;
}

impl<T: RelativeModel + ?Sized> RelativeModel for &T {
    fn predict(
        &self,
        x0: &RelStateRic,
        grid: &TimeGrid,
        out_r: &mut [Vector3<f64>],
        out_v: Option<&mut [Vector3<f64>]>,
    ) -> Result<usize, ModelError> {
        (**self).predict(x0, grid, out_r, out_v)
    }
}

impl<T: RelativeModel + ?Sized> RelativeModel for Box<T> {
    fn predict(
        &self,
        x0: &RelStateRic,
        grid: &TimeGrid,
        out_r: &mut [Vector3<f64>],
        out_v: Option<&mut [Vector3<f64>]>,
    ) -> Result<usize, ModelError> {
        (**self).predict(x0, grid, out_r, out_v)
    }
}

/// Returns the velocity storage only if it can hold the whole grid.
pub(crate) fn usable_velocity_storage(
    out_v: Option<&mut [Vector3<f64>]>,
    steps: usize,
) -> Option<&mut [Vector3<f64>]> {
    out_v.filter(|v| v.len() >= steps)
}

/// Equations of motion of a relative state, [x, y, z, ẋ, ẏ, ż] in RIC.
pub trait RelativeDynamics {
    /// Returns the time derivative of the relative state at `t` seconds past the reference epoch.
    fn eom(&self, t: f64, state: &Vector6<f64>) -> Result<Vector6<f64>, DynamicsError>;
}

/// Dynamical model errors.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    #[snafu(display("chief propagation to {t} s failed: {source}"))]
    ChiefPropagation { t: f64, source: KeplerError },
    #[snafu(display("chief state at {t} s has a zero radius or angular momentum"))]
    DegenerateChief { t: f64 },
}
