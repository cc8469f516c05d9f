//! CPU core: architectural state plus the multiturn execution engine.
//!
//! The core never touches a device directly. Each [`Core::advance`] call
//! performs at most one step of the in-flight instruction and hands any
//! required bus transaction back to the caller, which services it and feeds
//! the result into the next call. This keeps the core's instruction clock
//! decoupled from the system's bus clock.

use crate::bus::{BusAccess, BusValue};
use crate::encoding::{
    decode_imm4, decode_imm8, decode_opcode, decode_rd, decode_rs1, decode_rs2, Opcode,
    INSTRUCTION_SIZE,
};
use crate::fault::MachineError;
use crate::state::{ArchitecturalState, ExecState, RegisterId};

/// Signals describing what an advance call did.
///
/// The current protocol emits exactly one signal per call, but the contract
/// allows future multi-signal returns, so callers must treat the list as
/// ordered and match on the whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionSignal {
    /// An instruction word fetch was issued.
    FetchInstruction,
    /// A data read was issued for an LW.
    LoadingData,
    /// A data write was issued for an SW.
    WritingData,
    /// The in-flight instruction completed.
    Done,
}

/// Result of one advance call: an optional bus transaction plus the ordered
/// signal list for this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Bus transaction the caller must resolve before the next call, if any.
    pub bus_access: Option<BusAccess>,
    /// Non-empty ordered signal list for this call.
    pub signals: Vec<ExecutionSignal>,
}

impl AdvanceOutcome {
    /// Returns true when the signal set for this call is exactly `Done`.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.signals.as_slice() == [ExecutionSignal::Done]
    }
}

#[derive(Debug, Clone, Copy)]
enum AluOp {
    Add,
    Sub,
    Xor,
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
enum ShiftOp {
    Logical,
    LogicalRight,
    ArithmeticRight,
}

/// The Wren-16 CPU core.
///
/// Owns the architectural register file, the program counter, the reserved
/// stack pointer, and the private execution state machine. All mutation goes
/// through [`Core::advance`]; hosts read state back through the accessors or
/// a snapshot export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Core {
    arch: ArchitecturalState,
    exec: ExecState,
    instruction: u16,
    decode_faulted: bool,
}

impl Core {
    /// Creates a core with zeroed registers, `PC`, and `SP`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs a core from previously exported architectural state.
    ///
    /// The execution state machine starts at `Ready`, as after reset.
    #[must_use]
    pub fn from_architectural(arch: ArchitecturalState) -> Self {
        Self {
            arch,
            ..Self::default()
        }
    }

    /// Returns the architectural register state.
    #[must_use]
    pub const fn arch(&self) -> &ArchitecturalState {
        &self.arch
    }

    /// Returns mutable architectural state for host-level setup.
    ///
    /// Intended for loaders and tests; during execution the state machine is
    /// the only writer.
    pub const fn arch_mut(&mut self) -> &mut ArchitecturalState {
        &mut self.arch
    }

    /// Returns the current execution state.
    #[must_use]
    pub const fn exec_state(&self) -> ExecState {
        self.exec
    }

    /// Returns the latched instruction word.
    ///
    /// Meaningful once a fetch has completed; zero on a fresh core.
    #[must_use]
    pub const fn instruction_register(&self) -> u16 {
        self.instruction
    }

    /// Clears all architectural and execution state back to power-on values.
    ///
    /// This is the only way out after a fatal decode failure mid-instruction.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Performs one step of the multiturn instruction protocol.
    ///
    /// `bus_value` carries the result of the previously requested bus access
    /// and is ignored on the first call of an instruction. Callers keep
    /// invoking this until a call reports [`AdvanceOutcome::is_done`],
    /// resolving the returned bus access in between.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::UnknownInstruction`] when the latched word
    /// decodes to no table entry; the machine stays mid-instruction and only
    /// [`Core::reset`] recovers it. Returns [`MachineError::InvalidState`]
    /// when called again after such a failure.
    pub fn advance(&mut self, bus_value: BusValue) -> Result<AdvanceOutcome, MachineError> {
        if self.decode_faulted {
            return Err(MachineError::InvalidState);
        }

        match self.exec {
            ExecState::Ready => {
                self.exec = ExecState::FetchAndRun;
                Ok(AdvanceOutcome {
                    bus_access: Some(BusAccess::Read {
                        address: self.arch.pc(),
                    }),
                    signals: vec![ExecutionSignal::FetchInstruction],
                })
            }
            ExecState::FetchAndRun => {
                self.instruction = bus_value;
                let opcode = match decode_opcode(self.instruction) {
                    Ok(opcode) => opcode,
                    Err(error) => {
                        // Fatal: stay latched mid-instruction until reset.
                        self.decode_faulted = true;
                        return Err(error);
                    }
                };
                self.exec = ExecState::Ready;
                Ok(self.execute(opcode))
            }
            ExecState::LoadWaiting => {
                self.exec = ExecState::Ready;
                let rd = decode_rd(self.instruction);
                self.arch.set_gpr(rd, bus_value);
                Ok(self.complete())
            }
            ExecState::StoreWaiting => {
                self.exec = ExecState::Ready;
                Ok(self.complete())
            }
        }
    }

    /// Runs a fully-decoded instruction to its next protocol boundary.
    fn execute(&mut self, opcode: Opcode) -> AdvanceOutcome {
        let word = self.instruction;
        match opcode {
            Opcode::Add => self.execute_alu(word, AluOp::Add),
            Opcode::Sub => self.execute_alu(word, AluOp::Sub),
            Opcode::Xor => self.execute_alu(word, AluOp::Xor),
            Opcode::And => self.execute_alu(word, AluOp::And),
            Opcode::Or => self.execute_alu(word, AluOp::Or),
            Opcode::Lw => {
                let rs1 = decode_rs1(word);
                self.exec = ExecState::LoadWaiting;
                AdvanceOutcome {
                    bus_access: Some(BusAccess::Read {
                        address: self.arch.gpr(rs1),
                    }),
                    signals: vec![ExecutionSignal::LoadingData],
                }
            }
            Opcode::Sw => {
                // SW names the address register in rd and the value register
                // in rs1.
                let rd = decode_rd(word);
                let rs1 = decode_rs1(word);
                self.exec = ExecState::StoreWaiting;
                AdvanceOutcome {
                    bus_access: Some(BusAccess::Write {
                        address: self.arch.gpr(rd),
                        value: self.arch.gpr(rs1),
                    }),
                    signals: vec![ExecutionSignal::WritingData],
                }
            }
            Opcode::Addi => {
                let rd = decode_rd(word);
                let imm8 = decode_imm8(word);
                self.arch
                    .set_gpr(rd, self.arch.gpr(rd).wrapping_add(u16::from(imm8)));
                self.complete()
            }
            Opcode::Ldhi => {
                let rd = decode_rd(word);
                let imm8 = decode_imm8(word);
                let low = self.arch.gpr(rd) & 0x00FF;
                self.arch.set_gpr(rd, (u16::from(imm8) << 8) | low);
                self.complete()
            }
            Opcode::Bz => {
                let taken = self.arch.gpr(decode_rd(word)) == 0;
                self.execute_branch(word, taken)
            }
            Opcode::Bnz => {
                let taken = self.arch.gpr(decode_rd(word)) != 0;
                self.execute_branch(word, taken)
            }
            Opcode::Jal => {
                let rd = decode_rd(word);
                let imm8 = decode_imm8(word);
                self.arch
                    .set_gpr(rd, self.arch.pc().wrapping_add(INSTRUCTION_SIZE));
                self.arch.set_pc(u16::from(imm8));
                Self::done()
            }
            Opcode::Jalr => {
                let rd = decode_rd(word);
                let rs1 = decode_rs1(word);
                // Link is written before rs1 is read, so JALR rd,rd jumps to
                // the link address.
                self.arch
                    .set_gpr(rd, self.arch.pc().wrapping_add(INSTRUCTION_SIZE));
                self.arch.set_pc(self.arch.gpr(rs1));
                Self::done()
            }
            Opcode::Shl => self.execute_shift(word, ShiftOp::Logical),
            Opcode::Shr => self.execute_shift(word, ShiftOp::LogicalRight),
            Opcode::Shra => self.execute_shift(word, ShiftOp::ArithmeticRight),
        }
    }

    fn execute_alu(&mut self, word: u16, op: AluOp) -> AdvanceOutcome {
        let rd = decode_rd(word);
        let a = self.arch.gpr(decode_rs1(word));
        let b = self.arch.gpr(decode_rs2(word));
        let result = match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Xor => a ^ b,
            AluOp::And => a & b,
            AluOp::Or => a | b,
        };
        self.arch.set_gpr(rd, result);
        self.complete()
    }

    fn execute_shift(&mut self, word: u16, op: ShiftOp) -> AdvanceOutcome {
        let rd = decode_rd(word);
        let amount = u32::from(decode_imm4(word));
        let value = self.arch.gpr(rd);
        let result = match op {
            ShiftOp::Logical => value.wrapping_shl(amount),
            ShiftOp::LogicalRight => value.wrapping_shr(amount),
            #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
            ShiftOp::ArithmeticRight => ((value as i16).wrapping_shr(amount)) as u16,
        };
        self.arch.set_gpr(rd, result);
        self.complete()
    }

    fn execute_branch(&mut self, word: u16, taken: bool) -> AdvanceOutcome {
        if taken {
            self.arch.set_pc(u16::from(decode_imm8(word)));
        } else {
            self.arch
                .set_pc(self.arch.pc().wrapping_add(INSTRUCTION_SIZE));
        }
        Self::done()
    }

    /// Advances `PC` past the completed instruction and reports done.
    fn complete(&mut self) -> AdvanceOutcome {
        self.arch
            .set_pc(self.arch.pc().wrapping_add(INSTRUCTION_SIZE));
        Self::done()
    }

    fn done() -> AdvanceOutcome {
        AdvanceOutcome {
            bus_access: None,
            signals: vec![ExecutionSignal::Done],
        }
    }

    /// Produces a human-readable snapshot of `PC` and the selected registers.
    ///
    /// Registers are emitted in register-index order regardless of the order
    /// they are requested in, formatted as
    /// `PC = XXXX, [ rN = XXXX ... ]`.
    #[must_use]
    pub fn debug_dump(&self, regs_to_dump: &[RegisterId]) -> String {
        let mut out = format!("PC = {:04X}, [ ", self.arch.pc());

        for reg in RegisterId::ALL {
            if !regs_to_dump.contains(&reg) {
                continue;
            }
            out.push_str(&format!("r{} = {:04X} ", reg.index(), self.arch.gpr(reg)));
        }

        out.push(']');
        out
    }
}
