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

use crate::linalg::{Matrix3, Vector3};

/// A position and velocity pair: relative and in RIC coordinates for the forward transform, absolute and inertial
/// for the inverse transform.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RelState {
    pub r: Vector3<f64>,
    pub v: Vector3<f64>,
}

/// Converts the inertial states of a deputy and of the chief into the relative state of the deputy in RIC.
///
/// The RIC velocity is the derivative of the RIC position taken in the rotating frame:
/// `v_ric = C_i2r · Δv − ω_ric × r_ric`, with ω expressed in RIC coordinates.
pub fn inertial_to_ric_relative(
    deputy_r_i: &Vector3<f64>,
    deputy_v_i: &Vector3<f64>,
    chief_r_i: &Vector3<f64>,
    chief_v_i: &Vector3<f64>,
    c_from_inertial_to_ric: &Matrix3<f64>,
    omega_ric: &Vector3<f64>,
) -> RelState {
    let dr_i = deputy_r_i - chief_r_i;
    let dv_i = deputy_v_i - chief_v_i;

    let r_ric = c_from_inertial_to_ric * dr_i;
    let v_ric = c_from_inertial_to_ric * dv_i - omega_ric.cross(&r_ric);

    RelState { r: r_ric, v: v_ric }
}

/// Converts a relative RIC state back into the absolute inertial state of the deputy.
///
/// This is the exact inverse of [inertial_to_ric_relative] for the same DCM and angular rate.
pub fn ric_to_inertial_relative(
    rel_r_ric: &Vector3<f64>,
    rel_v_ric: &Vector3<f64>,
    chief_r_i: &Vector3<f64>,
    chief_v_i: &Vector3<f64>,
    c_from_ric_to_inertial: &Matrix3<f64>,
    omega_ric: &Vector3<f64>,
) -> RelState {
    let dr_i = c_from_ric_to_inertial * rel_r_ric;
    let dv_i = c_from_ric_to_inertial * (rel_v_ric + omega_ric.cross(rel_r_ric));

    RelState {
        r: chief_r_i + dr_i,
        v: chief_v_i + dv_i,
    }
}
