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
    AxisOrder, ChiefState, FrameKind, OmegaCoords, ProviderCode, H_HAT_MIN, R_MIN_M, V_MIN_M_S,
};
use crate::linalg::{Matrix3, Vector3};
use crate::utils::is_finite_vec3;

/// A RIC frame built from a chief inertial state.
///
/// When `status` is not `Ok`, only `time_tag` and `origin_i` are meaningful: the DCM is the identity and the
/// angular rate is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructedRicFrame {
    pub time_tag: f64,
    pub origin_i: Vector3<f64>,
    /// Columns are the R, I, C unit vectors in inertial components
    pub c_from_ric_to_inertial: Matrix3<f64>,
    pub has_omega: bool,
    /// Always (0, 0, ω) in RIC coordinates
    pub omega_ric: Vector3<f64>,
    pub omega_coords: OmegaCoords,
    pub frame_kind: FrameKind,
    pub axis_order: AxisOrder,
    pub status: ProviderCode,
}

impl ConstructedRicFrame {
    fn unavailable(chief: &ChiefState, status: ProviderCode) -> Self {
        Self {
            time_tag: chief.time_tag,
            origin_i: chief.r_i,
            c_from_ric_to_inertial: Matrix3::identity(),
            has_omega: false,
            omega_ric: Vector3::zeros(),
            omega_coords: OmegaCoords::Ric,
            frame_kind: FrameKind::BullseyeRic,
            axis_order: AxisOrder::Ric,
            status,
        }
    }

    pub fn ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Returns the DCM from inertial to RIC, i.e. the transpose of the stored DCM.
    pub fn c_from_inertial_to_ric(&self) -> Matrix3<f64> {
        self.c_from_ric_to_inertial.transpose()
    }
}

/// Returns the unit vector along `v` given its precomputed norm, or None if that norm is not positive and finite.
fn unit(v: &Vector3<f64>, norm: f64) -> Option<Vector3<f64>> {
    if norm > 0.0 && norm.is_finite() {
        Some(v / norm)
    } else {
        None
    }
}

/// Builds an orthonormal right-handed RIC frame and its angular rate from the chief state.
///
/// Returns a frame whose status is:
/// + `NotAvailable` if the chief status is not `Ok`, if |r| < `R_MIN_M` or |v| < `V_MIN_M_S`, or if the
///   dimensionless angular momentum |r×v| / (|r||v|) is below `H_HAT_MIN`;
/// + `InvalidInput` if r or v is not finite;
/// + `InternalError` if the triad or the angular rate cannot be normalized after the checks above passed.
///
/// The in-track axis is built from the transverse direction h×r rather than from the velocity, and the triad is
/// then re-orthonormalized as C = R×I followed by I = C×R.
pub fn construct_ric_from_chief(chief: &ChiefState) -> ConstructedRicFrame {
    if !chief.ok() {
        return ConstructedRicFrame::unavailable(chief, ProviderCode::NotAvailable);
    }

    if !is_finite_vec3(&chief.r_i) || !is_finite_vec3(&chief.v_i) {
        return ConstructedRicFrame::unavailable(chief, ProviderCode::InvalidInput);
    }

    let r_norm = chief.r_i.norm();
    let v_norm = chief.v_i.norm();
    // Negated comparisons also reject NaN norms
    if !(r_norm >= R_MIN_M) || !(v_norm >= V_MIN_M_S) {
        return ConstructedRicFrame::unavailable(chief, ProviderCode::NotAvailable);
    }

    let h = chief.r_i.cross(&chief.v_i);
    let h_norm = h.norm();

    let h_hat = h_norm / (r_norm * v_norm);
    if !(h_hat >= H_HAT_MIN) || !h_hat.is_finite() {
        return ConstructedRicFrame::unavailable(chief, ProviderCode::NotAvailable);
    }

    let triad = || -> Option<(Vector3<f64>, Vector3<f64>, Vector3<f64>)> {
        let e_r = unit(&chief.r_i, r_norm)?;
        // The cross-track axis along h is only used to check that h is normalizable
        unit(&h, h_norm)?;
        let t_i = h.cross(&chief.r_i);
        let e_i = unit(&t_i, t_i.norm())?;

        let c_i = e_r.cross(&e_i);
        let e_c = unit(&c_i, c_i.norm())?;
        let i_i = e_c.cross(&e_r);
        let e_i = unit(&i_i, i_i.norm())?;

        if is_finite_vec3(&e_r) && is_finite_vec3(&e_i) && is_finite_vec3(&e_c) {
            Some((e_r, e_i, e_c))
        } else {
            None
        }
    };

    let Some((e_r, e_i, e_c)) = triad() else {
        return ConstructedRicFrame::unavailable(chief, ProviderCode::InternalError);
    };

    let omega = h_norm / (r_norm * r_norm);
    if !omega.is_finite() {
        return ConstructedRicFrame::unavailable(chief, ProviderCode::InternalError);
    }

    ConstructedRicFrame {
        time_tag: chief.time_tag,
        origin_i: chief.r_i,
        c_from_ric_to_inertial: Matrix3::from_columns(&[e_r, e_i, e_c]),
        has_omega: true,
        omega_ric: Vector3::new(0.0, 0.0, omega),
        omega_coords: OmegaCoords::Ric,
        frame_kind: FrameKind::BullseyeRic,
        axis_order: AxisOrder::Ric,
        status: ProviderCode::Ok,
    }
}
