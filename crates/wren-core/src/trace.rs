//! Deterministic trace hooks for host-side observability.
//!
//! There is no global logger. Hosts that want visibility install a
//! [`TraceSink`] on the system at construction time and flip the
//! `tracing_enabled` configuration bit; with tracing disabled no events are
//! produced.

use crate::encoding::Opcode;

/// Trace events emitted by the orchestrator in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// The core issued an instruction fetch.
    FetchIssued {
        /// Program counter the fetch targets.
        pc: u16,
    },
    /// The core latched and decoded a fetched instruction word.
    InstructionDecoded {
        /// Raw 16-bit instruction word.
        word: u16,
        /// Decoded opcode.
        opcode: Opcode,
    },
    /// A bus read was serviced by a device.
    BusRead {
        /// Address read.
        address: u16,
        /// Value the owning device returned.
        value: u16,
    },
    /// A bus write was serviced by a device.
    BusWrite {
        /// Address written.
        address: u16,
        /// Value stored.
        value: u16,
    },
    /// The in-flight instruction completed.
    InstructionRetired {
        /// Program counter after the instruction committed.
        pc: u16,
    },
}

/// Sink capability for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}
