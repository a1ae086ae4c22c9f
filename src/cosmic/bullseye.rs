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
    construct_ric_from_chief, validate_adopted_ric_frame, AdoptedRicFrame, AxisOrder, ChiefState,
    FrameId, FrameKind, FrameValidationTolerances, OmegaCoords, ProviderCode,
};
use crate::linalg::{Matrix3, Vector3};
use crate::providers::{AdoptedFrameProvider, ChiefStateProvider, NoAdoptedFrame};
use bitflags::bitflags;
use serde_derive::{Deserialize, Serialize};

const LOG_TARGET: &str = "bullseye::frame";

bitflags! {
    /// Reasons why a frame snapshot is degraded. Several reasons may be set at once.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DegradeReason: u32 {
        /// The adopted frame failed validation and the constructed frame was used instead
        const ADOPTED_INVALID = 1 << 0;
        /// The chief state does not define a RIC frame
        const DEGENERATE_CHIEF = 1 << 1;
        /// Reserved for providers whose samples arrive with irregular latency; never set by this crate
        const PROVIDER_JITTER = 1 << 2;
    }
}

impl DegradeReason {
    /// Returns true if any degradation reason is set.
    pub fn any(&self) -> bool {
        !self.is_empty()
    }
}

/// Source of the RIC frame, configured once per instance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BullseyeFrameMode {
    /// Always build the frame from the chief state
    ConstructedOnly,
    /// Use the adopted frame when it passes validation
    #[default]
    AdoptedPreferred,
}

/// Policy applied when the adopted frame fails validation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnAdoptedInvalid {
    /// Fail the tick with the validation status
    AbortTick,
    /// Use the constructed frame and flag the snapshot as degraded
    #[default]
    FallbackConstructedDegraded,
}

/// The RIC frame used for one predictor tick.
#[derive(Clone, Debug, PartialEq)]
pub struct BullseyeFrameSnapshot {
    pub time_tag: f64,
    pub origin_i: Vector3<f64>,
    pub c_from_ric_to_inertial: Matrix3<f64>,
    pub has_omega: bool,
    pub omega_ric: Vector3<f64>,
    pub omega_coords: OmegaCoords,
    pub frame_kind: FrameKind,
    pub axis_order: AxisOrder,
    pub inertial_frame_id: Option<FrameId>,
    pub adopted_frame_source_id: Option<FrameId>,
    pub used_adopted: bool,
    pub degraded: DegradeReason,
    pub status: ProviderCode,
}

impl Default for BullseyeFrameSnapshot {
    fn default() -> Self {
        Self {
            time_tag: 0.0,
            origin_i: Vector3::zeros(),
            c_from_ric_to_inertial: Matrix3::identity(),
            has_omega: false,
            omega_ric: Vector3::zeros(),
            omega_coords: OmegaCoords::Unspecified,
            frame_kind: FrameKind::BullseyeRic,
            axis_order: AxisOrder::Ric,
            inertial_frame_id: None,
            adopted_frame_source_id: None,
            used_adopted: false,
            degraded: DegradeReason::empty(),
            status: ProviderCode::Ok,
        }
    }
}

impl BullseyeFrameSnapshot {
    fn failed(status: ProviderCode) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    fn from_constructed(chief: &ChiefState, degraded: DegradeReason) -> Self {
        let frame = construct_ric_from_chief(chief);
        let mut degraded = degraded;
        if !frame.ok() {
            degraded |= DegradeReason::DEGENERATE_CHIEF;
        }

        Self {
            time_tag: frame.time_tag,
            origin_i: frame.origin_i,
            c_from_ric_to_inertial: frame.c_from_ric_to_inertial,
            has_omega: frame.has_omega,
            omega_ric: frame.omega_ric,
            omega_coords: frame.omega_coords,
            frame_kind: frame.frame_kind,
            axis_order: frame.axis_order,
            inertial_frame_id: chief.frame_id.clone(),
            adopted_frame_source_id: None,
            used_adopted: false,
            degraded,
            status: frame.status,
        }
    }

    fn from_adopted(chief: &ChiefState, frame: AdoptedRicFrame) -> Self {
        Self {
            time_tag: frame.time_tag,
            origin_i: frame.origin_i,
            c_from_ric_to_inertial: frame.c_from_ric_to_inertial,
            has_omega: frame.has_omega,
            omega_ric: frame.omega_ric,
            omega_coords: frame.omega_coords,
            frame_kind: frame.frame_kind,
            axis_order: frame.axis_order,
            inertial_frame_id: chief.frame_id.clone(),
            adopted_frame_source_id: frame.frame_source_id,
            used_adopted: true,
            degraded: DegradeReason::empty(),
            status: ProviderCode::Ok,
        }
    }

    pub fn ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Returns the DCM from inertial to RIC.
    pub fn c_from_inertial_to_ric(&self) -> Matrix3<f64> {
        self.c_from_ric_to_inertial.transpose()
    }
}

/// Produces the RIC frame snapshot of each tick from a chief state provider and, optionally, an adopted frame
/// provider.
pub struct BullseyeFrame<C: ChiefStateProvider, A: AdoptedFrameProvider> {
    chief: C,
    adopted: Option<A>,
    mode: BullseyeFrameMode,
    on_adopted_invalid: OnAdoptedInvalid,
    tol: FrameValidationTolerances,
}

impl<C: ChiefStateProvider> BullseyeFrame<C, NoAdoptedFrame> {
    /// Initializes a frame orchestrator which always constructs the frame from the chief state.
    pub fn constructed_only(chief: C) -> Self {
        Self::new(
            chief,
            None,
            BullseyeFrameMode::ConstructedOnly,
            OnAdoptedInvalid::default(),
            FrameValidationTolerances::default(),
        )
    }
}

impl<C: ChiefStateProvider, A: AdoptedFrameProvider> BullseyeFrame<C, A> {
    pub fn new(
        chief: C,
        adopted: Option<A>,
        mode: BullseyeFrameMode,
        on_adopted_invalid: OnAdoptedInvalid,
        tol: FrameValidationTolerances,
    ) -> Self {
        Self {
            chief,
            adopted,
            mode,
            on_adopted_invalid,
            tol,
        }
    }

    pub fn mode(&self) -> BullseyeFrameMode {
        self.mode
    }

    pub fn on_adopted_invalid(&self) -> OnAdoptedInvalid {
        self.on_adopted_invalid
    }

    pub fn tolerances(&self) -> &FrameValidationTolerances {
        &self.tol
    }

    /// Mutable access to the chief state provider, e.g. to feed it the state of the next tick.
    pub fn chief_provider_mut(&mut self) -> &mut C {
        &mut self.chief
    }

    pub fn adopted_provider_mut(&mut self) -> Option<&mut A> {
        self.adopted.as_mut()
    }

    /// Returns the frame snapshot at exactly t0.
    pub fn update(&mut self, t0: f64) -> BullseyeFrameSnapshot {
        self.update_with_chief(t0).1
    }

    /// Returns the chief state at exactly t0 and the frame snapshot built from it, such that both are guaranteed to
    /// come from the same chief query.
    ///
    /// A chief which is not `Ok` (or has no frame identifier) yields a failed snapshot. An invalid adopted frame
    /// either yields a failed snapshot with the validation status (`AbortTick`) or the constructed frame flagged
    /// with `ADOPTED_INVALID` (`FallbackConstructedDegraded`). A constructed frame which cannot be built is returned
    /// with its failed status and `DEGENERATE_CHIEF` set.
    pub fn update_with_chief(&mut self, t0: f64) -> (ChiefState, BullseyeFrameSnapshot) {
        let chief = self.chief.get(t0);
        if !chief.ok() || chief.frame_id.is_none() {
            let status = if chief.ok() {
                ProviderCode::InvalidInput
            } else {
                chief.status
            };
            return (chief, BullseyeFrameSnapshot::failed(status));
        }

        if self.mode == BullseyeFrameMode::AdoptedPreferred {
            if let Some(adopted) = self.adopted.as_mut() {
                let frame = adopted.get(t0);
                match validate_adopted_ric_frame(t0, &chief, &frame, &self.tol) {
                    Ok(()) => {
                        let snapshot = BullseyeFrameSnapshot::from_adopted(&chief, frame);
                        return (chief, snapshot);
                    }
                    Err(e) => match self.on_adopted_invalid {
                        OnAdoptedInvalid::AbortTick => {
                            debug!(target: LOG_TARGET, "adopted frame rejected at t0 = {t0} s, aborting: {e}");
                            return (chief, BullseyeFrameSnapshot::failed(e.code()));
                        }
                        OnAdoptedInvalid::FallbackConstructedDegraded => {
                            debug!(
                                target: LOG_TARGET,
                                "adopted frame rejected at t0 = {t0} s, using constructed frame: {e}"
                            );
                            let snapshot = BullseyeFrameSnapshot::from_constructed(
                                &chief,
                                DegradeReason::ADOPTED_INVALID,
                            );
                            return (chief, snapshot);
                        }
                    },
                }
            }
        }

        let snapshot = BullseyeFrameSnapshot::from_constructed(&chief, DegradeReason::empty());
        (chief, snapshot)
    }
}
