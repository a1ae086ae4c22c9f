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

use crate::linalg::{Matrix3, Vector3, Vector6};

/// Below this magnitude of `z`, the Stumpff functions are evaluated with their truncated series.
/// All users share this threshold so that they behave identically near z = 0.
pub const STUMPFF_SERIES_THRESHOLD: f64 = 1e-8;

/// Returns the Stumpff C function.
///
/// C(z) = (1 - cos(sqrt(z))) / z for z > 0, C(0) = 1/2, and (cosh(sqrt(-z)) - 1) / (-z) for z < 0.
/// Near zero, the series 1/2 - z/24 + z^2/720 - z^3/40320 is used to avoid cancellation.
pub fn stumpff_c(z: f64) -> f64 {
    if z.abs() < STUMPFF_SERIES_THRESHOLD {
        let z2 = z * z;
        return 0.5 - z / 24.0 + z2 / 720.0 - (z2 * z) / 40320.0;
    }

    if z > 0.0 {
        let s = z.sqrt();
        (1.0 - s.cos()) / z
    } else {
        let s = (-z).sqrt();
        (s.cosh() - 1.0) / (-z)
    }
}

/// Returns the Stumpff S function.
///
/// S(z) = (sqrt(z) - sin(sqrt(z))) / sqrt(z)^3 for z > 0, S(0) = 1/6, and
/// (sinh(sqrt(-z)) - sqrt(-z)) / sqrt(-z)^3 for z < 0.
/// Near zero, the series 1/6 - z/120 + z^2/5040 - z^3/362880 is used.
pub fn stumpff_s(z: f64) -> f64 {
    if z.abs() < STUMPFF_SERIES_THRESHOLD {
        let z2 = z * z;
        return (1.0 / 6.0) - z / 120.0 + z2 / 5040.0 - (z2 * z) / 362_880.0;
    }

    if z > 0.0 {
        let s = z.sqrt();
        (s - s.sin()) / (s * s * s)
    } else {
        let s = (-z).sqrt();
        (s.sinh() - s) / (s * s * s)
    }
}

/// Returns the (C, S) Stumpff pair for the provided argument.
pub fn stumpff_cs(z: f64) -> (f64, f64) {
    (stumpff_c(z), stumpff_s(z))
}

/// Returns whether all three components are finite.
pub fn is_finite_vec3(v: &Vector3<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Returns whether all six components are finite.
pub fn is_finite_vec6(v: &Vector6<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Returns whether all nine elements are finite.
pub fn is_finite_mat3(m: &Matrix3<f64>) -> bool {
    m.iter().all(|x| x.is_finite())
}

/// Returns the largest absolute element of `C * C^T - I`, the orthonormality error of a DCM.
pub fn orthonormality_error(dcm: &Matrix3<f64>) -> f64 {
    let cct = dcm * dcm.transpose();
    let mut max_abs: f64 = 0.0;
    for r in 0..3 {
        for c in 0..3 {
            let ideal = if r == c { 1.0 } else { 0.0 };
            let err = (cct[(r, c)] - ideal).abs();
            if err > max_abs {
                max_abs = err;
            }
        }
    }
    max_abs
}

/// Returns `|det(C) - 1|`, the handedness error of a DCM (a left-handed DCM yields about 2).
pub fn handedness_error(dcm: &Matrix3<f64>) -> f64 {
    (dcm.determinant() - 1.0).abs()
}

/// Returns the provided absolute floor increased by the relative tolerance scaled by the reference norm.
pub fn abs_rel_bound(abs: f64, rel: f64, ref_norm: f64) -> f64 {
    abs + rel * ref_norm
}
