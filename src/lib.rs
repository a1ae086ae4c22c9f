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

/*! # bullseye-pred

Deterministic prediction of the relative trajectory of deputy vehicles with respect to a
(possibly maneuvering) chief spacecraft, expressed in the chief-centered rotating
radial / in-track / cross-track frame (the "Bullseye" RIC frame).

The core is allocation-free at steady state: every propagator and transform writes into
caller-owned slices, and every iterative solve runs a fixed number of iterations so that two
identical calls produce bitwise-identical outputs.
*/

/// Provides the fixed-step integrators used by the eccentric-reference relative motion model.
pub mod propagators;

/// Provides the relative motion models: the closed-form circular reference model and the eccentric reference linear time-varying model.
pub mod dynamics;

/// Provides the chief and vehicle state types, the Bullseye RIC frame construction, validation, snapshot orchestration, and the inertial to RIC transforms.
pub mod cosmic;

/// Utility functions shared by different modules, and which may be useful to engineers.
pub mod utils;

mod errors;
/// Bullseye will never panic in the prediction path and functions which may fail will return an error.
pub use self::errors::BullseyeError;

/// Configuration, prediction buffer publication, and the vehicle index registry.
pub mod io;

/// Exact-time chief, vehicle, and adopted frame providers.
pub mod providers;

/// Prediction scheduling: time grid generation and the end-to-end relative predictor.
pub mod md;

/// Simple tools (e.g. universal variable Kepler propagator)
pub mod tools;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::cosmic::{AdoptedRicFrame, BullseyeFrameSnapshot, ChiefState, VehicleState};
pub use self::dynamics::{RelStateRic, RelativeModel};
pub use self::md::{make_time_grid, TimeGrid};
