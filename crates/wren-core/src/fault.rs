use thiserror::Error;

/// Error classes used for diagnostics aggregation and host policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Instruction codec rejected an opcode or mnemonic.
    Decode,
    /// Core advance protocol violated by the caller.
    Protocol,
    /// Bus arbitration could not route an access to exactly one device.
    Addressing,
    /// A device rejected an access or its construction input.
    Device,
    /// Snapshot restoration rejected stored state.
    Persistence,
}

/// Stable error taxonomy for the machine simulation layers.
///
/// None of these are recovered locally. Every layer forwards the underlying
/// cause with the context its variant carries, and the top-level driver is
/// responsible for presenting or terminating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// Opcode value or mnemonic outside the fixed 16-entry table.
    #[error("unknown instruction: '{instruction}'")]
    UnknownInstruction {
        /// Offending opcode rendered as hex, or the offending mnemonic.
        instruction: String,
    },
    /// `advance` was invoked outside its defined state transitions.
    #[error("core advance called in a terminal state with no pending instruction")]
    InvalidState,
    /// No registered device claimed the accessed address.
    #[error("no device found for address: {address:04X}")]
    NoDeviceAtAddress {
        /// Address of the unresolved bus access.
        address: u16,
    },
    /// More than one registered device claimed the accessed address.
    #[error("multiple devices hit on the bus: {}", .devices.join(", "))]
    AddressConflict {
        /// Address of the conflicting bus access.
        address: u16,
        /// Names of every device whose hit test claimed the address.
        devices: Vec<String>,
    },
    /// A device rejected an access inconsistent with its hit test.
    #[error("{device} device address {address:X} out of bounds")]
    OutOfBounds {
        /// Name of the rejecting device.
        device: String,
        /// Rejected address.
        address: u16,
    },
    /// A memory device was constructed with an image larger than its storage.
    #[error("unable to store image of {image_bytes} bytes into memory of {capacity} bytes")]
    ImageTooLarge {
        /// Size of the rejected initial image.
        image_bytes: usize,
        /// Capacity of the backing storage.
        capacity: usize,
    },
    /// A stored snapshot value exceeds the 16-bit register domain.
    #[error("snapshot field {field} value {value:X} exceeds the 16-bit register domain")]
    ValueOutOfRange {
        /// Name of the rejected snapshot field (`pc` or `rN`).
        field: String,
        /// Rejected widened value.
        value: u32,
    },
    /// A stored snapshot register list does not match the register file shape.
    #[error("snapshot register list has {actual} entries, expected {expected}")]
    SnapshotLayout {
        /// Register count the architecture requires.
        expected: usize,
        /// Register count found in the snapshot.
        actual: usize,
    },
}

impl MachineError {
    /// Returns the diagnostics error class for this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownInstruction { .. } => ErrorClass::Decode,
            Self::InvalidState => ErrorClass::Protocol,
            Self::NoDeviceAtAddress { .. } | Self::AddressConflict { .. } => ErrorClass::Addressing,
            Self::OutOfBounds { .. } | Self::ImageTooLarge { .. } => ErrorClass::Device,
            Self::ValueOutOfRange { .. } | Self::SnapshotLayout { .. } => ErrorClass::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorClass, MachineError};

    #[test]
    fn class_mapping_matches_error_taxonomy() {
        let unknown = MachineError::UnknownInstruction {
            instruction: "0x1F".to_owned(),
        };
        assert_eq!(unknown.class(), ErrorClass::Decode);
        assert_eq!(MachineError::InvalidState.class(), ErrorClass::Protocol);
        assert_eq!(
            MachineError::NoDeviceAtAddress { address: 0x0005 }.class(),
            ErrorClass::Addressing
        );
        assert_eq!(
            MachineError::AddressConflict {
                address: 0x0005,
                devices: vec!["Memory".to_owned(), "Memory".to_owned()],
            }
            .class(),
            ErrorClass::Addressing
        );
        assert_eq!(
            MachineError::OutOfBounds {
                device: "Timer".to_owned(),
                address: 0x0100,
            }
            .class(),
            ErrorClass::Device
        );
        assert_eq!(
            MachineError::ImageTooLarge {
                image_bytes: 2048,
                capacity: 1024,
            }
            .class(),
            ErrorClass::Device
        );
        assert_eq!(
            MachineError::ValueOutOfRange {
                field: "pc".to_owned(),
                value: 0x0001_0000,
            }
            .class(),
            ErrorClass::Persistence
        );
        assert_eq!(
            MachineError::SnapshotLayout {
                expected: 16,
                actual: 3,
            }
            .class(),
            ErrorClass::Persistence
        );
    }

    #[test]
    fn conflict_message_names_every_device() {
        let conflict = MachineError::AddressConflict {
            address: 0x0005,
            devices: vec!["Memory".to_owned(), "Timer".to_owned()],
        };
        assert_eq!(
            conflict.to_string(),
            "multiple devices hit on the bus: Memory, Timer"
        );
    }

    #[test]
    fn out_of_bounds_message_names_device_and_address() {
        let error = MachineError::OutOfBounds {
            device: "Memory".to_owned(),
            address: 0x03FF,
        };
        assert_eq!(error.to_string(), "Memory device address 3FF out of bounds");
    }
}
