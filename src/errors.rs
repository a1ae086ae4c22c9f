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

use crate::cosmic::FrameValidationError;
use crate::dynamics::{DynamicsError, ModelError};
use crate::io::{ConfigError, RegistryError};
use crate::md::PredictorError;
use crate::propagators::PropagationError;
use crate::tools::KeplerError;
use snafu::prelude::*;

/// Any error of this crate, for callers which do not need to tell them apart.
#[derive(Debug, Snafu)]
pub enum BullseyeError {
    #[snafu(context(false))]
    #[snafu(display("Kepler propagation: {source}"))]
    Kepler { source: KeplerError },
    #[snafu(context(false))]
    #[snafu(display("adopted frame validation: {source}"))]
    FrameValidation { source: FrameValidationError },
    #[snafu(context(false))]
    #[snafu(display("relative motion model: {source}"))]
    Model { source: ModelError },
    #[snafu(context(false))]
    #[snafu(display("relative dynamics: {source}"))]
    Dynamics { source: DynamicsError },
    #[snafu(context(false))]
    #[snafu(display("propagation: {source}"))]
    Propagation { source: PropagationError },
    #[snafu(context(false))]
    #[snafu(display("predictor: {source}"))]
    Predictor { source: PredictorError },
    #[snafu(context(false))]
    #[snafu(display("configuration: {source}"))]
    Config { source: ConfigError },
    #[snafu(context(false))]
    #[snafu(display("vehicle registry: {source}"))]
    Registry { source: RegistryError },
}
