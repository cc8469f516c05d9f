//! Architectural CPU state model primitives.

mod exec_state;
mod registers;

pub use exec_state::ExecState;
pub use registers::{ArchitecturalState, RegisterId, GENERAL_REGISTER_COUNT};
