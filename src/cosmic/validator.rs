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
    AdoptedRicFrame, ChiefState, ProviderCode, DCM_ORTHONORMALITY_TOL, DETERMINANT_ONE_TOL,
    REQUIRED_AXIS_ORDER, REQUIRED_FRAME_KIND, REQUIRED_OMEGA_COORDS,
};
use crate::utils::{
    abs_rel_bound, handedness_error, is_finite_mat3, is_finite_vec3, orthonormality_error,
};
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use typed_builder::TypedBuilder;

/// Tolerances used to accept an adopted RIC frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct FrameValidationTolerances {
    /// Absolute floor of the centering bound, in meters
    #[builder(default = 1e-6)]
    pub center_abs_m: f64,
    /// Centering bound growth per meter of chief radius
    #[builder(default = 1e-12)]
    pub center_rel: f64,
    /// Maximum absolute element of `C C^T - I`
    #[builder(default = DCM_ORTHONORMALITY_TOL)]
    pub ortho_max_abs: f64,
    /// Maximum of `|det(C) - 1|`
    #[builder(default = DETERMINANT_ONE_TOL)]
    pub det_one_abs: f64,
}

impl Default for FrameValidationTolerances {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Reason why an adopted frame was rejected. Checks are performed in the order of the variants and the first
/// failing check is reported.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FrameValidationError {
    #[snafu(display("chief state status is {status}"))]
    ChiefNotOk { status: ProviderCode },
    #[snafu(display("adopted frame status is {status}"))]
    FrameNotOk { status: ProviderCode },
    #[snafu(display("non finite time, vector, or matrix in the chief state or adopted frame"))]
    NonFinite,
    #[snafu(display("adopted frame time tag {time_tag} s does not match the requested {t0} s"))]
    TimeMismatch { t0: f64, time_tag: f64 },
    #[snafu(display("adopted frame does not declare itself as a Bullseye RIC frame in R, I, C order"))]
    BadDeclaration,
    #[snafu(display("adopted frame origin is {err_m} m away from the chief (bound is {bound_m} m)"))]
    CenteringMismatch { err_m: f64, bound_m: f64 },
    #[snafu(display("adopted DCM is not orthonormal: max|CC^T - I| = {max_abs:e}"))]
    NotOrthonormal { max_abs: f64 },
    #[snafu(display("adopted DCM is not right-handed: det = {det}"))]
    NotRightHanded { det: f64 },
    #[snafu(display("adopted angular rate must be expressed in RIC coordinates"))]
    OmegaBadDeclaration,
}

impl FrameValidationError {
    /// Returns the provider status code associated with this rejection.
    pub fn code(&self) -> ProviderCode {
        match self {
            Self::TimeMismatch { .. } => ProviderCode::TimeMissing,
            _ => ProviderCode::InvalidInput,
        }
    }
}

/// Validates an adopted RIC frame against the chief state at the requested time t0.
///
/// The checks short-circuit in this order: statuses, finiteness (including ω only if declared present), exact time
/// tag equality, frame kind and axis order declarations, centering within `abs + rel·|r_chief|`, orthonormality,
/// handedness, and finally the ω coordinate declaration.
pub fn validate_adopted_ric_frame(
    t0: f64,
    chief: &ChiefState,
    frame: &AdoptedRicFrame,
    tol: &FrameValidationTolerances,
) -> Result<(), FrameValidationError> {
    ensure!(
        chief.ok(),
        ChiefNotOkSnafu {
            status: chief.status
        }
    );
    ensure!(
        frame.ok(),
        FrameNotOkSnafu {
            status: frame.status
        }
    );

    ensure!(
        t0.is_finite()
            && chief.time_tag.is_finite()
            && frame.time_tag.is_finite()
            && is_finite_vec3(&chief.r_i)
            && is_finite_vec3(&chief.v_i)
            && is_finite_vec3(&frame.origin_i)
            && is_finite_mat3(&frame.c_from_ric_to_inertial)
            && (!frame.has_omega || is_finite_vec3(&frame.omega_ric)),
        NonFiniteSnafu
    );

    // No time tolerance: the adopted frame must be tagged at exactly t0.
    ensure!(
        frame.time_tag == t0,
        TimeMismatchSnafu {
            t0,
            time_tag: frame.time_tag
        }
    );

    ensure!(
        frame.frame_kind == REQUIRED_FRAME_KIND && frame.axis_order == REQUIRED_AXIS_ORDER,
        BadDeclarationSnafu
    );

    let err_m = (frame.origin_i - chief.r_i).norm();
    let bound_m = abs_rel_bound(tol.center_abs_m, tol.center_rel, chief.r_i.norm());
    ensure!(err_m <= bound_m, CenteringMismatchSnafu { err_m, bound_m });

    let max_abs = orthonormality_error(&frame.c_from_ric_to_inertial);
    ensure!(max_abs <= tol.ortho_max_abs, NotOrthonormalSnafu { max_abs });

    let det = frame.c_from_ric_to_inertial.determinant();
    ensure!(
        det.is_finite() && handedness_error(&frame.c_from_ric_to_inertial) <= tol.det_one_abs,
        NotRightHandedSnafu { det }
    );

    ensure!(
        !frame.has_omega || frame.omega_coords == REQUIRED_OMEGA_COORDS,
        OmegaBadDeclarationSnafu
    );

    Ok(())
}
