//! Architectural-state persistence contract.
//!
//! The core only exposes "export current architectural state" and
//! "construct from previously exported state"; encoding the snapshot into a
//! file or wire format is the embedding host's concern. Stored values are
//! widened to `u32` so the schema can outlive the current register width,
//! which is why restoration must range-check every field.

use crate::core::Core;
use crate::fault::MachineError;
use crate::state::{ArchitecturalState, RegisterId, GENERAL_REGISTER_COUNT};

/// Stable snapshot schema-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts a wire value to a known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// Serializable architectural-state snapshot.
///
/// Carries `PC` and the 16 general registers; `SP` is reserved architectural
/// state and is not part of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreSnapshot {
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Stored program counter, widened to the schema domain.
    pub pc: u32,
    /// Stored general registers in index order, widened to the schema
    /// domain.
    pub registers: Vec<u32>,
}

fn narrow(field: String, value: u32) -> Result<u16, MachineError> {
    u16::try_from(value).map_err(|_| MachineError::ValueOutOfRange { field, value })
}

impl Core {
    /// Exports the current architectural state as a snapshot.
    #[must_use]
    pub fn export_state(&self) -> CoreSnapshot {
        CoreSnapshot {
            version: SnapshotVersion::V1,
            pc: u32::from(self.arch().pc()),
            registers: RegisterId::ALL
                .iter()
                .map(|reg| u32::from(self.arch().gpr(*reg)))
                .collect(),
        }
    }

    /// Reconstructs a core from a previously exported snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::SnapshotLayout`] when the register list does
    /// not hold exactly one entry per architectural register, and
    /// [`MachineError::ValueOutOfRange`] when any stored register or `PC`
    /// value exceeds the 16-bit domain.
    pub fn from_snapshot(snapshot: &CoreSnapshot) -> Result<Self, MachineError> {
        if snapshot.registers.len() != GENERAL_REGISTER_COUNT {
            return Err(MachineError::SnapshotLayout {
                expected: GENERAL_REGISTER_COUNT,
                actual: snapshot.registers.len(),
            });
        }

        let mut arch = ArchitecturalState::default();
        arch.set_pc(narrow("pc".to_owned(), snapshot.pc)?);

        for (reg, stored) in RegisterId::ALL.iter().zip(snapshot.registers.iter()) {
            arch.set_gpr(*reg, narrow(format!("r{}", reg.index()), *stored)?);
        }

        Ok(Self::from_architectural(arch))
    }
}
