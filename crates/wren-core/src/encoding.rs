//! Instruction codec for the Wren-16 ISA.
//!
//! Pure encode/decode functions over the fixed 16-bit instruction word
//! layout: opcode in bits [15:12], `rd` in bits [11:8], then either
//! `rs1`/`rs2` in bits [7:4]/[3:0], an 8-bit immediate in bits [7:0], or a
//! 4-bit shift immediate in bits [7:4]. The opcode alone selects which
//! operand layout applies.

use crate::fault::MachineError;
use crate::state::RegisterId;

/// Byte size of one instruction word, the unit every `PC` step uses.
pub const INSTRUCTION_SIZE: u16 = 2;

/// The 16 assigned Wren-16 opcodes, one per 4-bit encoding value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Add = 0x0,
    Sub = 0x1,
    Lw = 0x2,
    Sw = 0x3,
    Xor = 0x4,
    And = 0x5,
    Or = 0x6,
    Addi = 0x7,
    Ldhi = 0x8,
    Bz = 0x9,
    Bnz = 0xA,
    Jal = 0xB,
    Jalr = 0xC,
    Shl = 0xD,
    Shr = 0xE,
    Shra = 0xF,
}

/// Operand layouts an opcode can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandShape {
    /// `rd`, `rs1`, `rs2` register fields (ADD/SUB/XOR/AND/OR).
    RegRegReg,
    /// `rd`, `rs1` register fields with a zero-filled `rs2` nibble
    /// (LW/SW/JALR).
    RegReg,
    /// `rd` plus an 8-bit immediate (ADDI/LDHI/BZ/BNZ/JAL).
    RegImm8,
    /// `rd` plus a 4-bit shift amount in the `rs1` nibble (SHL/SHR/SHRA).
    RegImm4,
}

/// Single source-of-truth opcode table: value, opcode, mnemonic, operand
/// shape.
///
/// Any opcode value or mnemonic not present here is unknown by definition.
pub const OPCODE_TABLE: &[(u8, Opcode, &str, OperandShape)] = &[
    (0x0, Opcode::Add, "ADD", OperandShape::RegRegReg),
    (0x1, Opcode::Sub, "SUB", OperandShape::RegRegReg),
    (0x2, Opcode::Lw, "LW", OperandShape::RegReg),
    (0x3, Opcode::Sw, "SW", OperandShape::RegReg),
    (0x4, Opcode::Xor, "XOR", OperandShape::RegRegReg),
    (0x5, Opcode::And, "AND", OperandShape::RegRegReg),
    (0x6, Opcode::Or, "OR", OperandShape::RegRegReg),
    (0x7, Opcode::Addi, "ADDI", OperandShape::RegImm8),
    (0x8, Opcode::Ldhi, "LDHI", OperandShape::RegImm8),
    (0x9, Opcode::Bz, "BZ", OperandShape::RegImm8),
    (0xA, Opcode::Bnz, "BNZ", OperandShape::RegImm8),
    (0xB, Opcode::Jal, "JAL", OperandShape::RegImm8),
    (0xC, Opcode::Jalr, "JALR", OperandShape::RegReg),
    (0xD, Opcode::Shl, "SHL", OperandShape::RegImm4),
    (0xE, Opcode::Shr, "SHR", OperandShape::RegImm4),
    (0xF, Opcode::Shra, "SHRA", OperandShape::RegImm4),
];

impl Opcode {
    /// Returns the 4-bit encoding value for this opcode.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns the canonical mnemonic for this opcode.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        OPCODE_TABLE
            .iter()
            .find_map(|(_, opcode, mnemonic, _)| (*opcode == self).then_some(*mnemonic))
            .unwrap_or("")
    }

    /// Returns the operand layout this opcode selects.
    #[must_use]
    pub fn shape(self) -> OperandShape {
        OPCODE_TABLE
            .iter()
            .find_map(|(_, opcode, _, shape)| (*opcode == self).then_some(*shape))
            .unwrap_or(OperandShape::RegRegReg)
    }

    /// Converts a 4-bit opcode value into an assigned opcode.
    ///
    /// `None` means the value is outside the 4-bit opcode domain.
    #[must_use]
    pub fn from_u4(value: u8) -> Option<Self> {
        OPCODE_TABLE
            .iter()
            .find_map(|(entry_value, opcode, _, _)| (*entry_value == value).then_some(*opcode))
    }
}

/// Extracts the opcode from the top 4 bits of an instruction word.
///
/// # Errors
///
/// Returns [`MachineError::UnknownInstruction`] when the opcode value has no
/// table entry.
pub fn decode_opcode(word: u16) -> Result<Opcode, MachineError> {
    let value = ((word >> 12) & 0x000F) as u8;
    Opcode::from_u4(value).ok_or(MachineError::UnknownInstruction {
        instruction: format!("{value:#04X}"),
    })
}

/// Extracts the `rd` field from bits [11:8]. Present in every instruction.
#[must_use]
pub const fn decode_rd(word: u16) -> RegisterId {
    RegisterId::from_nibble(((word & 0x0F00) >> 8) as u8)
}

/// Extracts the `rs1` field from bits [7:4].
#[must_use]
pub const fn decode_rs1(word: u16) -> RegisterId {
    RegisterId::from_nibble(((word & 0x00F0) >> 4) as u8)
}

/// Extracts the `rs2` field from bits [3:0].
#[must_use]
pub const fn decode_rs2(word: u16) -> RegisterId {
    RegisterId::from_nibble((word & 0x000F) as u8)
}

/// Extracts the 8-bit immediate from bits [7:0].
#[must_use]
pub const fn decode_imm8(word: u16) -> u8 {
    (word & 0x00FF) as u8
}

/// Extracts the 4-bit shift immediate from bits [7:4].
#[must_use]
pub const fn decode_imm4(word: u16) -> u8 {
    ((word & 0x00F0) >> 4) as u8
}

/// Returns the canonical mnemonic for a raw 4-bit opcode value.
///
/// # Errors
///
/// Returns [`MachineError::UnknownInstruction`] when the value has no table
/// entry.
pub fn opcode_to_mnemonic(value: u8) -> Result<&'static str, MachineError> {
    OPCODE_TABLE
        .iter()
        .find_map(|(entry_value, _, mnemonic, _)| (*entry_value == value).then_some(*mnemonic))
        .ok_or(MachineError::UnknownInstruction {
            instruction: format!("{value:#04X}"),
        })
}

/// Returns the opcode for a mnemonic, case-insensitively.
///
/// # Errors
///
/// Returns [`MachineError::UnknownInstruction`] when the mnemonic has no
/// table entry.
pub fn mnemonic_to_opcode(mnemonic: &str) -> Result<Opcode, MachineError> {
    let uppered = mnemonic.to_uppercase();
    OPCODE_TABLE
        .iter()
        .find_map(|(_, opcode, entry_mnemonic, _)| (*entry_mnemonic == uppered).then_some(*opcode))
        .ok_or(MachineError::UnknownInstruction {
            instruction: uppered,
        })
}

/// Encodes a three-register instruction (ADD/SUB/XOR/AND/OR).
#[must_use]
pub const fn encode_rrr(opcode: Opcode, rd: RegisterId, rs1: RegisterId, rs2: RegisterId) -> u16 {
    ((opcode as u16) << 12)
        | ((rd.index() as u16) << 8)
        | ((rs1.index() as u16) << 4)
        | rs2.index() as u16
}

/// Encodes a two-register instruction (LW/SW/JALR); the `rs2` nibble is
/// zero-filled.
#[must_use]
pub const fn encode_rr(opcode: Opcode, rd: RegisterId, rs1: RegisterId) -> u16 {
    ((opcode as u16) << 12) | ((rd.index() as u16) << 8) | ((rs1.index() as u16) << 4)
}

/// Encodes a register-immediate instruction (ADDI/LDHI/BZ/BNZ/JAL).
#[must_use]
pub const fn encode_ri8(opcode: Opcode, rd: RegisterId, imm8: u8) -> u16 {
    ((opcode as u16) << 12) | ((rd.index() as u16) << 8) | imm8 as u16
}

/// Encodes a shift instruction (SHL/SHR/SHRA); `imm4` occupies the `rs1`
/// nibble and the low nibble is zero-filled.
#[must_use]
pub const fn encode_ri4(opcode: Opcode, rd: RegisterId, imm4: u8) -> u16 {
    ((opcode as u16) << 12) | ((rd.index() as u16) << 8) | (((imm4 & 0x0F) as u16) << 4)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        decode_imm4, decode_imm8, decode_opcode, decode_rd, decode_rs1, decode_rs2, encode_ri4,
        encode_ri8, encode_rr, encode_rrr, mnemonic_to_opcode, opcode_to_mnemonic, Opcode,
        OperandShape, OPCODE_TABLE,
    };
    use crate::fault::MachineError;
    use crate::state::RegisterId;

    #[test]
    fn table_covers_all_sixteen_opcode_values_exactly_once() {
        let values: HashSet<_> = OPCODE_TABLE.iter().map(|(value, _, _, _)| *value).collect();
        assert_eq!(values.len(), 16);
        assert_eq!(OPCODE_TABLE.len(), 16);
        for value in 0x0u8..=0xF {
            assert!(values.contains(&value));
        }
    }

    #[test]
    fn mnemonic_roundtrip_is_bijective_over_the_table() {
        for (value, opcode, mnemonic, _) in OPCODE_TABLE {
            assert_eq!(opcode_to_mnemonic(*value).expect("assigned value"), *mnemonic);
            assert_eq!(
                mnemonic_to_opcode(mnemonic).expect("assigned mnemonic"),
                *opcode
            );
            assert_eq!(mnemonic_to_opcode(opcode_to_mnemonic(*value).unwrap()).unwrap(), *opcode);
        }
    }

    #[test]
    fn mnemonic_lookup_is_case_insensitive() {
        assert_eq!(mnemonic_to_opcode("add").unwrap(), Opcode::Add);
        assert_eq!(mnemonic_to_opcode("Shra").unwrap(), Opcode::Shra);
    }

    #[test]
    fn unknown_inputs_are_rejected_in_both_directions() {
        assert!(matches!(
            opcode_to_mnemonic(0x10),
            Err(MachineError::UnknownInstruction { .. })
        ));
        assert!(matches!(
            mnemonic_to_opcode("NOP"),
            Err(MachineError::UnknownInstruction { .. })
        ));
    }

    #[test]
    fn opcode_values_match_the_fixed_assignment() {
        assert_eq!(Opcode::Add.value(), 0x0);
        assert_eq!(Opcode::Sw.value(), 0x3);
        assert_eq!(Opcode::Addi.value(), 0x7);
        assert_eq!(Opcode::Jalr.value(), 0xC);
        assert_eq!(Opcode::Shra.value(), 0xF);
    }

    #[test]
    fn operand_shapes_follow_the_table() {
        assert_eq!(Opcode::Add.shape(), OperandShape::RegRegReg);
        assert_eq!(Opcode::Lw.shape(), OperandShape::RegReg);
        assert_eq!(Opcode::Jalr.shape(), OperandShape::RegReg);
        assert_eq!(Opcode::Bz.shape(), OperandShape::RegImm8);
        assert_eq!(Opcode::Shl.shape(), OperandShape::RegImm4);
    }

    #[test]
    fn field_extraction_matches_the_word_layout() {
        let word = 0x1234u16;
        assert_eq!(decode_opcode(word).unwrap(), Opcode::Sub);
        assert_eq!(decode_rd(word), RegisterId::R2);
        assert_eq!(decode_rs1(word), RegisterId::R3);
        assert_eq!(decode_rs2(word), RegisterId::R4);
        assert_eq!(decode_imm8(word), 0x34);
        assert_eq!(decode_imm4(word), 0x3);
    }

    #[test]
    fn decode_opcode_is_total_over_16_bit_words() {
        for value in 0x0u16..=0xF {
            let word = value << 12;
            assert!(decode_opcode(word).is_ok());
        }
    }

    #[test]
    fn encoders_place_fields_where_the_decoders_read_them() {
        let word = encode_rrr(Opcode::Add, RegisterId::R1, RegisterId::R2, RegisterId::R3);
        assert_eq!(word, 0x0123);
        assert_eq!(decode_rd(word), RegisterId::R1);
        assert_eq!(decode_rs1(word), RegisterId::R2);
        assert_eq!(decode_rs2(word), RegisterId::R3);

        let word = encode_ri8(Opcode::Ldhi, RegisterId::R0, 0xCD);
        assert_eq!(word, 0x80CD);
        assert_eq!(decode_imm8(word), 0xCD);

        let word = encode_ri4(Opcode::Shl, RegisterId::R4, 0x7);
        assert_eq!(word, 0xD470);
        assert_eq!(decode_imm4(word), 0x7);
    }

    #[test]
    fn two_register_encoding_zero_fills_the_rs2_nibble() {
        let word = encode_rr(Opcode::Lw, RegisterId::R5, RegisterId::R6);
        assert_eq!(word & 0x000F, 0);
        assert_eq!(decode_rs1(word), RegisterId::R6);

        let word = encode_rr(Opcode::Jalr, RegisterId::R15, RegisterId::R1);
        assert_eq!(word, 0xCF10);
    }
}
