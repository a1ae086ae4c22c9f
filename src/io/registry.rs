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

use snafu::prelude::*;

const LOG_TARGET: &str = "bullseye::registry";

/// Maximum number of deputy vehicles tracked by the predictor.
pub const MAX_VEHICLES: usize = 32;

/// Opaque identifier of a deputy vehicle.
pub type VehicleId = u64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RegistryError {
    #[snafu(display("cannot register vehicle {id}: registry is full ({capacity} vehicles)"))]
    CapacityExceeded { id: VehicleId, capacity: usize },
}

/// Maps vehicle identifiers to dense indices, in insertion order.
///
/// Indices are stable for the lifetime of the registry (until [VehicleRegistry::clear]) and index the rows of the
/// prediction buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VehicleRegistry {
    ids: [VehicleId; MAX_VEHICLES],
    len: usize,
}

impl Default for VehicleRegistry {
    fn default() -> Self {
        Self {
            ids: [0; MAX_VEHICLES],
            len: 0,
        }
    }
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn capacity() -> usize {
        MAX_VEHICLES
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the index of this vehicle, if registered.
    pub fn index_of(&self, id: VehicleId) -> Option<usize> {
        self.ids[..self.len].iter().position(|known| *known == id)
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.index_of(id).is_some()
    }

    /// Returns the vehicle registered at this index, if any.
    pub fn id_at(&self, index: usize) -> Option<VehicleId> {
        if index >= self.len {
            None
        } else {
            Some(self.ids[index])
        }
    }

    /// Registered vehicles, in index order.
    pub fn ids(&self) -> &[VehicleId] {
        &self.ids[..self.len]
    }

    /// Registers this vehicle and returns its index. Registering a known vehicle returns its existing index.
    ///
    /// # Errors
    /// + [RegistryError::CapacityExceeded] if the registry is full, in which case it is left unchanged.
    pub fn register(&mut self, id: VehicleId) -> Result<usize, RegistryError> {
        if let Some(idx) = self.index_of(id) {
            debug!(target: LOG_TARGET, "duplicate registration id={id} idx={idx}");
            return Ok(idx);
        }

        if self.len >= MAX_VEHICLES {
            warn!(target: LOG_TARGET, "capacity reject id={id} size={} cap={MAX_VEHICLES}", self.len);
            return Err(RegistryError::CapacityExceeded {
                id,
                capacity: MAX_VEHICLES,
            });
        }

        let idx = self.len;
        self.ids[idx] = id;
        self.len += 1;
        info!(target: LOG_TARGET, "registered id={id} idx={idx} size={}", self.len);
        Ok(idx)
    }

    /// Forgets every vehicle.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}
