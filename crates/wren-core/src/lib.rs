//! Core machine simulation crate for the Wren-16 microcomputer.
//!
//! Models a single-issue, un-pipelined 16-bit processor, the shared bus it
//! drives, and the pluggable peripherals arbitrated on that bus. The core
//! executes instructions through a resumable advance protocol so one
//! instruction can span several bus turns; the system orchestrator services
//! each turn and ticks every device once per core step.

/// Error taxonomy shared by every simulation layer.
pub mod fault;
pub use fault::{ErrorClass, MachineError};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{ArchitecturalState, ExecState, RegisterId, GENERAL_REGISTER_COUNT};

/// Pure instruction codec over the fixed 16-entry opcode table.
pub mod encoding;
pub use encoding::{
    decode_imm4, decode_imm8, decode_opcode, decode_rd, decode_rs1, decode_rs2, encode_ri4,
    encode_ri8, encode_rr, encode_rrr, mnemonic_to_opcode, opcode_to_mnemonic, Opcode,
    OperandShape, INSTRUCTION_SIZE, OPCODE_TABLE,
};

/// Shared bus primitives.
pub mod bus;
pub use bus::{BusAccess, BusValue};

/// CPU core and its multiturn execution protocol.
pub mod core;
pub use self::core::{AdvanceOutcome, Core, ExecutionSignal};

/// Pluggable bus peripherals.
pub mod device;
pub use device::{
    Device, MemoryDevice, TimerDevice, TIMER_CONTROL_REGISTER, TIMER_COUNTER_REGISTER,
    TIMER_STATUS_REGISTER,
};

/// System orchestrator wiring core and devices together.
pub mod system;
pub use system::{System, SystemConfig};

/// Deterministic trace hooks.
pub mod trace;
pub use trace::{TraceEvent, TraceSink};

/// Architectural-state persistence contract.
pub mod snapshot;
pub use snapshot::{CoreSnapshot, SnapshotVersion};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
