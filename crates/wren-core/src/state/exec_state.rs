/// Private execution state machine driving the core's multiturn protocol.
///
/// One instruction moves `Ready -> FetchAndRun -> Ready` for zero-turnaround
/// instructions, detouring through `LoadWaiting` or `StoreWaiting` when a
/// second bus turn is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecState {
    /// Idle between instructions; the next advance issues a fetch.
    #[default]
    Ready,
    /// Instruction word fetch is in flight on the bus.
    FetchAndRun,
    /// LW issued its data read and is waiting for the bus value.
    LoadWaiting,
    /// SW issued its data write and is waiting for the bus turn to complete.
    StoreWaiting,
}

impl ExecState {
    /// Returns true when the core is between instructions.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::ExecState;

    #[test]
    fn exec_state_default_is_ready() {
        assert_eq!(ExecState::default(), ExecState::Ready);
        assert!(ExecState::default().is_ready());
    }

    #[test]
    fn only_ready_reports_ready() {
        assert!(!ExecState::FetchAndRun.is_ready());
        assert!(!ExecState::LoadWaiting.is_ready());
        assert!(!ExecState::StoreWaiting.is_ready());
    }
}
