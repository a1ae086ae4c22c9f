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

use crate::cosmic::{BullseyeFrameMode, FrameValidationTolerances, OnAdoptedInvalid, EARTH_MU_M3_S2};
use crate::propagators::DEFAULT_MAX_SUBSTEP_S;
use hifitime::Duration;
use serde::de::DeserializeOwned;
use serde::{Deserializer, Serializer};
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use typed_builder::TypedBuilder;

/// Double buffered publication of the predictions.
pub mod publisher;
pub use self::publisher::*;

/// Vehicle identifier to dense index map.
pub mod registry;
pub use self::registry::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file {}: {source}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse YAML configuration: {source}"))]
    ParseError { source: serde_yaml::Error },
    #[snafu(display("invalid configuration: {msg}"))]
    InvalidConfig { msg: String },
}

impl PartialEq for ConfigError {
    /// Configuration errors are never equal to one another, as I/O and parsing errors cannot be compared.
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

pub trait ConfigRepr: Debug + Sized + serde::Serialize + DeserializeOwned {
    /// Builds the configuration representation from the YAML file at the provided path.
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).context(ReadSnafu {
            path: path.as_ref().to_path_buf(),
        })?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a sequence of configuration representations from the YAML file at the provided path.
    fn load_many<P>(path: P) -> Result<Vec<Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref()).context(ReadSnafu {
            path: path.as_ref().to_path_buf(),
        })?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds the configuration representation from the provided YAML string.
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }

    /// Serializes this configuration into YAML.
    fn dumps(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).context(ParseSnafu)
    }
}

pub(crate) fn duration_to_str<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{duration}"))
}

pub(crate) fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = <String as serde::Deserialize>::deserialize(deserializer)?;
    Duration::from_str(&s).map_err(serde::de::Error::custom)
}

/// Relative motion model used by the predictor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ModelKind {
    /// Closed-form circular reference model, with the mean motion taken from the frame snapshot or the chief
    #[default]
    Hcw,
    /// Eccentric reference model, with the reference orbit taken from the chief state of the tick
    Eccentric { mu_m3_s2: f64, max_substep_s: f64 },
}

impl ModelKind {
    /// Eccentric reference model about the Earth with the default substep.
    pub fn earth_eccentric() -> Self {
        Self::Eccentric {
            mu_m3_s2: EARTH_MU_M3_S2,
            max_substep_s: DEFAULT_MAX_SUBSTEP_S,
        }
    }
}

/// Configuration of the relative predictor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct PredictorConfig {
    /// Prediction horizon past each tick epoch
    #[serde(serialize_with = "duration_to_str", deserialize_with = "duration_from_str")]
    pub horizon: Duration,
    /// Spacing of the prediction grid
    #[serde(serialize_with = "duration_to_str", deserialize_with = "duration_from_str")]
    pub cadence: Duration,
    #[builder(default)]
    #[serde(default)]
    pub frame_mode: BullseyeFrameMode,
    #[builder(default)]
    #[serde(default)]
    pub on_adopted_invalid: OnAdoptedInvalid,
    #[builder(default)]
    #[serde(default)]
    pub tolerances: FrameValidationTolerances,
    #[builder(default)]
    #[serde(default)]
    pub model: ModelKind,
}

impl ConfigRepr for PredictorConfig {}

impl PredictorConfig {
    pub fn horizon_s(&self) -> f64 {
        self.horizon.to_seconds()
    }

    pub fn cadence_s(&self) -> f64 {
        self.cadence.to_seconds()
    }

    /// Number of grid points this configuration yields.
    pub fn steps(&self) -> usize {
        crate::md::grid_len(self.horizon_s(), self.cadence_s())
    }

    /// Checks that the grid is well defined and fits the prediction buffers, and that the model parameters are
    /// physical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let horizon_s = self.horizon_s();
        let cadence_s = self.cadence_s();

        ensure!(
            cadence_s > 0.0,
            InvalidConfigSnafu {
                msg: format!("cadence must be positive, got {}", self.cadence)
            }
        );
        ensure!(
            horizon_s >= 0.0,
            InvalidConfigSnafu {
                msg: format!("horizon must not be negative, got {}", self.horizon)
            }
        );

        ensure!(
            (horizon_s / cadence_s).floor() < MAX_STEPS as f64,
            InvalidConfigSnafu {
                msg: format!(
                    "{} over {} yields more than {MAX_STEPS} steps",
                    self.cadence, self.horizon
                )
            }
        );

        let steps = self.steps();
        ensure!(
            steps <= MAX_STEPS,
            InvalidConfigSnafu {
                msg: format!(
                    "{} over {} yields {steps} steps, more than {MAX_STEPS}",
                    self.cadence, self.horizon
                )
            }
        );

        if let ModelKind::Eccentric {
            mu_m3_s2,
            max_substep_s,
        } = self.model
        {
            ensure!(
                mu_m3_s2.is_finite() && mu_m3_s2 > 0.0,
                InvalidConfigSnafu {
                    msg: format!("gravitational parameter must be positive, got {mu_m3_s2}")
                }
            );
            ensure!(
                max_substep_s.is_finite() && max_substep_s > 0.0,
                InvalidConfigSnafu {
                    msg: format!("maximum substep must be positive, got {max_substep_s}")
                }
            );
        }

        Ok(())
    }
}
