/// Number of architecturally visible general-purpose registers (`r0..r15`).
pub const GENERAL_REGISTER_COUNT: usize = 16;

/// Architecturally visible general-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum RegisterId {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
    R15 = 15,
}

impl RegisterId {
    /// Ordered list of all architectural general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
        Self::R15,
    ];

    /// Returns the array index for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a 4-bit register field into an architectural register.
    ///
    /// `None` means the value is outside the 4-bit register domain.
    #[must_use]
    pub const fn from_u4(bits: u8) -> Option<Self> {
        if bits < GENERAL_REGISTER_COUNT as u8 {
            Some(Self::ALL[bits as usize])
        } else {
            None
        }
    }

    /// Decodes an already-masked instruction nibble into a register.
    ///
    /// Every nibble value names a register, so this is total; the high bits
    /// of `bits` are ignored.
    #[must_use]
    pub const fn from_nibble(bits: u8) -> Self {
        Self::ALL[(bits & 0x0F) as usize]
    }
}

/// Architectural register state for the Wren-16 core.
///
/// `sp` is reserved architectural state: no instruction in the current ISA
/// reads or writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    gpr: [u16; GENERAL_REGISTER_COUNT],
    pc: u16,
    sp: u16,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self {
            gpr: [0; GENERAL_REGISTER_COUNT],
            pc: 0,
            sp: 0,
        }
    }
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: RegisterId) -> u16 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_gpr(&mut self, reg: RegisterId, value: u16) {
        self.gpr[reg.index()] = value;
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the `SP` register.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes the `SP` register.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchitecturalState, RegisterId, GENERAL_REGISTER_COUNT};

    #[test]
    fn register_count_and_decode_match_architecture() {
        assert_eq!(GENERAL_REGISTER_COUNT, 16);

        for bits in 0_u8..=15 {
            let reg = RegisterId::from_u4(bits).expect("valid 4-bit register encoding");
            assert_eq!(reg.index(), usize::from(bits));
        }

        assert!(RegisterId::from_u4(16).is_none());
    }

    #[test]
    fn nibble_decode_is_total_and_masks_high_bits() {
        for bits in 0_u8..=255 {
            assert_eq!(
                RegisterId::from_nibble(bits).index(),
                usize::from(bits & 0x0F)
            );
        }
    }

    #[test]
    fn general_register_file_tracks_each_register_independently() {
        let mut state = ArchitecturalState::default();

        for (offset, reg) in (0_u16..).zip(RegisterId::ALL.iter().copied()) {
            state.set_gpr(reg, 0x1000 + offset);
        }

        for (offset, reg) in (0_u16..).zip(RegisterId::ALL.iter().copied()) {
            assert_eq!(state.gpr(reg), 0x1000 + offset);
        }
    }

    #[test]
    fn fresh_state_is_fully_zeroed() {
        let state = ArchitecturalState::default();
        assert_eq!(state.pc(), 0x0000);
        assert_eq!(state.sp(), 0x0000);
        for reg in RegisterId::ALL {
            assert_eq!(state.gpr(reg), 0x0000);
        }
    }

    #[test]
    fn pc_and_sp_are_present_and_writable() {
        let mut state = ArchitecturalState::default();
        state.set_pc(0x0102);
        state.set_sp(0xA0B0);
        assert_eq!(state.pc(), 0x0102);
        assert_eq!(state.sp(), 0xA0B0);
    }
}
