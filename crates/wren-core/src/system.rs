//! System orchestrator: one core, an ordered device list, and the bus
//! arbitration between them.
//!
//! The orchestrator performs no instruction-level work itself. It drives the
//! core's advance protocol, ticks every device once per core step, and
//! routes each bus access to the single device claiming its address, so
//! device placement stays decoupled from opcode semantics.

use crate::bus::{BusAccess, BusValue};
use crate::core::{Core, ExecutionSignal};
use crate::device::Device;
use crate::encoding::decode_opcode;
use crate::fault::MachineError;
use crate::state::RegisterId;
use crate::trace::{TraceEvent, TraceSink};

/// Top-level configuration for a system instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemConfig {
    /// Enables trace event dispatch to an installed sink.
    pub tracing_enabled: bool,
}

/// A complete Wren-16 machine: core plus registered bus devices.
pub struct System {
    core: Core,
    devices: Vec<Box<dyn Device>>,
    config: SystemConfig,
    trace: Option<Box<dyn TraceSink>>,
}

impl System {
    /// Creates a system around a fresh core and the given device list.
    ///
    /// Device order does not affect bus semantics; it only orders the names
    /// reported by an [`MachineError::AddressConflict`].
    #[must_use]
    pub fn new(config: SystemConfig, devices: Vec<Box<dyn Device>>) -> Self {
        Self {
            core: Core::new(),
            devices,
            config,
            trace: None,
        }
    }

    /// Installs a trace sink, consuming and returning the system.
    #[must_use]
    pub fn with_trace(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Returns the core for host introspection.
    #[must_use]
    pub const fn core(&self) -> &Core {
        &self.core
    }

    /// Returns the core mutably for host-level setup and restore.
    pub const fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    /// Produces the core's human-readable register snapshot.
    #[must_use]
    pub fn debug_dump(&self, regs_to_dump: &[RegisterId]) -> String {
        self.core.debug_dump(regs_to_dump)
    }

    /// Drives one full instruction to completion.
    ///
    /// Loops over the core's advance protocol: every core step first ticks
    /// each device once, then resolves the step's bus access, if any. A read
    /// result becomes the bus value fed into the next advance call; a write
    /// resets it to zero.
    ///
    /// # Errors
    ///
    /// Propagates core decode/protocol errors unchanged and raises
    /// [`MachineError::NoDeviceAtAddress`] or
    /// [`MachineError::AddressConflict`] when bus resolution fails. State may
    /// reflect a half-completed instruction afterwards; see the crate-level
    /// error policy.
    pub fn run_instruction(&mut self) -> Result<(), MachineError> {
        let mut next_bus_value: BusValue = 0x0000;
        let mut fetch_in_flight = false;

        loop {
            let outcome = self.core.advance(next_bus_value)?;

            if fetch_in_flight {
                let word = self.core.instruction_register();
                if let Ok(opcode) = decode_opcode(word) {
                    self.emit(TraceEvent::InstructionDecoded { word, opcode });
                }
            }
            fetch_in_flight = outcome.signals.contains(&ExecutionSignal::FetchInstruction);

            if fetch_in_flight {
                if let Some(access) = outcome.bus_access {
                    self.emit(TraceEvent::FetchIssued {
                        pc: access.address(),
                    });
                }
            }

            for device in &mut self.devices {
                device.tick();
            }

            if let Some(access) = outcome.bus_access {
                match access {
                    BusAccess::Read { address } => {
                        let value = self.read_bus(address)?;
                        self.emit(TraceEvent::BusRead { address, value });
                        next_bus_value = value;
                    }
                    BusAccess::Write { address, value } => {
                        self.write_bus(address, value)?;
                        self.emit(TraceEvent::BusWrite { address, value });
                        next_bus_value = 0x0000;
                    }
                }
            }

            if outcome.is_done() {
                self.emit(TraceEvent::InstructionRetired {
                    pc: self.core.arch().pc(),
                });
                return Ok(());
            }
        }
    }

    /// Finds the unique device claiming `address`.
    fn hit_device_index(&self, address: BusValue) -> Result<usize, MachineError> {
        let hits: Vec<usize> = self
            .devices
            .iter()
            .enumerate()
            .filter(|(_, device)| device.hit(address))
            .map(|(index, _)| index)
            .collect();

        match hits.as_slice() {
            [] => Err(MachineError::NoDeviceAtAddress { address }),
            [index] => Ok(*index),
            _ => Err(MachineError::AddressConflict {
                address,
                devices: hits
                    .iter()
                    .map(|&index| self.devices[index].name().to_owned())
                    .collect(),
            }),
        }
    }

    fn read_bus(&mut self, address: BusValue) -> Result<BusValue, MachineError> {
        let index = self.hit_device_index(address)?;
        self.devices[index].read(address)
    }

    fn write_bus(&mut self, address: BusValue, value: BusValue) -> Result<(), MachineError> {
        let index = self.hit_device_index(address)?;
        self.devices[index].write(address, value)
    }

    fn emit(&mut self, event: TraceEvent) {
        if !self.config.tracing_enabled {
            return;
        }
        if let Some(sink) = self.trace.as_deref_mut() {
            sink.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{System, SystemConfig};
    use crate::device::{Device, MemoryDevice};
    use crate::encoding::{encode_ri8, Opcode};
    use crate::fault::MachineError;
    use crate::state::RegisterId;

    fn memory_with_program(capacity: usize, words: &[u16]) -> MemoryDevice {
        let image: Vec<u8> = words.iter().flat_map(|word| word.to_be_bytes()).collect();
        MemoryDevice::new(capacity, Some(&image)).unwrap()
    }

    #[test]
    fn system_runs_an_instruction_fetched_from_memory() {
        let program = [encode_ri8(Opcode::Addi, RegisterId::R0, 5)];
        let mem = memory_with_program(64, &program);
        let mut system = System::new(SystemConfig::default(), vec![Box::new(mem)]);

        system.run_instruction().unwrap();
        assert_eq!(system.core().arch().gpr(RegisterId::R0), 5);
        assert_eq!(system.core().arch().pc(), 0x0002);
    }

    #[test]
    fn unmapped_fetch_address_is_reported_with_the_address() {
        let mut system = System::new(SystemConfig::default(), Vec::new());
        system.core_mut().arch_mut().set_pc(0x0040);

        assert_eq!(
            system.run_instruction().unwrap_err(),
            MachineError::NoDeviceAtAddress { address: 0x0040 }
        );
    }

    #[test]
    fn overlapping_devices_raise_a_conflict_naming_both() {
        let first = MemoryDevice::new(64, None).unwrap();
        let second = MemoryDevice::new(32, None).unwrap();
        let mut system = System::new(
            SystemConfig::default(),
            vec![Box::new(first), Box::new(second)],
        );

        assert_eq!(
            system.run_instruction().unwrap_err(),
            MachineError::AddressConflict {
                address: 0x0000,
                devices: vec!["Memory".to_owned(), "Memory".to_owned()],
            }
        );
    }

    #[test]
    fn devices_are_ticked_even_when_resolution_fails() {
        // The per-cycle clock runs before bus resolution, so a failing
        // access still ticks every device once.
        struct TickProbe {
            ticks: std::rc::Rc<std::cell::Cell<u32>>,
        }

        impl Device for TickProbe {
            fn name(&self) -> &str {
                "TickProbe"
            }

            fn hit(&self, _address: u16) -> bool {
                false
            }

            fn tick(&mut self) {
                self.ticks.set(self.ticks.get() + 1);
            }

            fn read(&mut self, address: u16) -> Result<u16, MachineError> {
                Err(MachineError::OutOfBounds {
                    device: "TickProbe".to_owned(),
                    address,
                })
            }

            fn write(&mut self, address: u16, _value: u16) -> Result<(), MachineError> {
                Err(MachineError::OutOfBounds {
                    device: "TickProbe".to_owned(),
                    address,
                })
            }
        }

        let ticks = std::rc::Rc::new(std::cell::Cell::new(0));
        let probe = TickProbe {
            ticks: std::rc::Rc::clone(&ticks),
        };
        let mut system = System::new(SystemConfig::default(), vec![Box::new(probe)]);

        assert!(system.run_instruction().is_err());
        assert_eq!(ticks.get(), 1);
    }
}
