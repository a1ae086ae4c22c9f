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

//! DCM naming convention: `c_from_a_to_b` maps coordinates expressed in frame `a` into
//! coordinates expressed in frame `b`, i.e. `x_b = c_from_a_to_b * x_a`. The columns of
//! `c_from_ric_to_inertial` are the R, I, C unit vectors in inertial components.

use crate::linalg::{Matrix3, Vector3};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// Re-Export the frame construction
mod ric;
pub use self::ric::*;

// Re-Export the adopted frame validator
mod validator;
pub use self::validator::*;

// Re-Export the snapshot orchestrator
mod bullseye;
pub use self::bullseye::*;

// Re-Export the relative state transforms
mod transforms;
pub use self::transforms::*;

/// Identifier of the configured inertial frame used by the chief and vehicle providers.
pub const INERTIAL_FRAME_ID: &str = "INERTIAL_FRAME_ID";

/// Earth gravitational parameter in m^3/s^2
pub const EARTH_MU_M3_S2: f64 = 3.986_004_418e14;

/// Minimum chief radius for the RIC frame to be defined, in meters
pub const R_MIN_M: f64 = 1.0;
/// Minimum chief speed for the RIC frame to be defined, in meters per second
pub const V_MIN_M_S: f64 = 1.0e-6;
/// Minimum of the dimensionless angular momentum |r×v| / (|r||v|), i.e. the sine of the angle between r and v.
pub const H_HAT_MIN: f64 = 1.0e-10;
/// Maximum absolute element of `C C^T - I` for a DCM to be considered orthonormal
pub const DCM_ORTHONORMALITY_TOL: f64 = 1.0e-12;
/// Maximum of `|det(C) - 1|` for a DCM to be considered right-handed
pub const DETERMINANT_ONE_TOL: f64 = 1.0e-12;

/// Status of a provider, constructor, or validator result.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderCode {
    #[default]
    Ok,
    /// The requested time is not exactly available (no interpolation is ever performed)
    TimeMissing,
    /// Reserved for providers which can report a frame other than the requested one; never produced by this crate,
    /// where a deputy in another frame than the chief is skipped by the predictor
    FrameMismatch,
    /// The quantity is physically ill-defined (e.g. degenerate chief state)
    NotAvailable,
    InvalidInput,
    /// A numerically impossible state after validation
    InternalError,
}

impl ProviderCode {
    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }
}

impl fmt::Display for ProviderCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Coordinates in which an angular rate vector is expressed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OmegaCoords {
    #[default]
    Unspecified,
    /// Expressed in RIC coordinates, required by the rotating frame velocity convention.
    Ric,
    Inertial,
}

/// Declared kind of a candidate RIC frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    #[default]
    Unspecified,
    BullseyeRic,
}

/// Declared axis order of a candidate RIC frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisOrder {
    #[default]
    Unspecified,
    /// {R, I, C}
    Ric,
}

/// Frame kind every adopted frame must declare.
pub const REQUIRED_FRAME_KIND: FrameKind = FrameKind::BullseyeRic;
/// Axis order every adopted frame must declare.
pub const REQUIRED_AXIS_ORDER: AxisOrder = AxisOrder::Ric;
/// Coordinates in which an adopted frame's angular rate must be declared, if present.
pub const REQUIRED_OMEGA_COORDS: OmegaCoords = OmegaCoords::Ric;

/// A cheaply clonable frame or provenance identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(Arc<str>);

impl FrameId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FrameId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A time tagged Cartesian state in the configured inertial frame, in meters and meters per second.
///
/// On success, `time_tag` equals the requested time exactly and `frame_id` is set.
/// On failure, `status` is not `Ok` and the payload is unspecified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InertialState {
    pub time_tag: f64,
    pub r_i: Vector3<f64>,
    pub v_i: Vector3<f64>,
    pub frame_id: Option<FrameId>,
    pub status: ProviderCode,
}

/// Chief state, produced by a chief state provider for one predictor tick.
pub type ChiefState = InertialState;
/// Deputy vehicle state, produced by a vehicle state provider for one predictor tick.
pub type VehicleState = InertialState;

impl InertialState {
    /// Initializes a successful state.
    pub fn new(time_tag: f64, r_i: Vector3<f64>, v_i: Vector3<f64>, frame_id: FrameId) -> Self {
        Self {
            time_tag,
            r_i,
            v_i,
            frame_id: Some(frame_id),
            status: ProviderCode::Ok,
        }
    }

    /// Initializes a failed state carrying only the status and the frame identifier, if any.
    pub fn failed(status: ProviderCode, frame_id: Option<FrameId>) -> Self {
        Self {
            frame_id,
            status,
            ..Default::default()
        }
    }

    pub fn ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Returns this state if it is successful, or its status otherwise.
    pub fn into_result(self) -> Result<Self, ProviderCode> {
        if self.ok() {
            Ok(self)
        } else {
            Err(self.status)
        }
    }
}

/// A candidate RIC frame supplied by an external (adopted) frame provider.
#[derive(Clone, Debug, PartialEq)]
pub struct AdoptedRicFrame {
    pub time_tag: f64,
    /// Origin of the frame in inertial components
    pub origin_i: Vector3<f64>,
    /// `x_i = c_from_ric_to_inertial * x_ric`
    pub c_from_ric_to_inertial: Matrix3<f64>,
    pub has_omega: bool,
    /// Valid only if `has_omega` is set
    pub omega_ric: Vector3<f64>,
    pub omega_coords: OmegaCoords,
    pub frame_kind: FrameKind,
    pub axis_order: AxisOrder,
    /// Optional provenance
    pub frame_source_id: Option<FrameId>,
    pub status: ProviderCode,
}

impl Default for AdoptedRicFrame {
    fn default() -> Self {
        Self {
            time_tag: 0.0,
            origin_i: Vector3::zeros(),
            c_from_ric_to_inertial: Matrix3::identity(),
            has_omega: false,
            omega_ric: Vector3::zeros(),
            omega_coords: OmegaCoords::Unspecified,
            frame_kind: FrameKind::Unspecified,
            axis_order: AxisOrder::Unspecified,
            frame_source_id: None,
            status: ProviderCode::Ok,
        }
    }
}

impl AdoptedRicFrame {
    pub fn failed(status: ProviderCode, frame_source_id: Option<FrameId>) -> Self {
        Self {
            frame_source_id,
            status,
            ..Default::default()
        }
    }

    pub fn ok(&self) -> bool {
        self.status.is_ok()
    }
}
