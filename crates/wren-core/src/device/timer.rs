//! Interval timer peripheral.

use crate::bus::BusValue;
use crate::device::Device;
use crate::fault::MachineError;

const TIMER_DEVICE_NAME: &str = "Timer";

/// Bus address of the countdown counter register.
pub const TIMER_COUNTER_REGISTER: BusValue = 253;
/// Bus address of the write-only control register.
pub const TIMER_CONTROL_REGISTER: BusValue = 254;
/// Bus address of the read-only status register.
pub const TIMER_STATUS_REGISTER: BusValue = 255;

const STATUS_RUNNING: u16 = 0x01;
const CONTROL_START: u16 = 0x01;

/// Countdown timer mapped to three registers at the top of the low address
/// page.
///
/// Writing bit 0 of the control register starts the countdown; the timer
/// decrements once per cycle while running and clears its running bit when
/// the counter reaches zero. No interrupt is raised, the owning system polls
/// the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerDevice {
    status: u16,
    counter: u16,
}

impl TimerDevice {
    /// Creates a stopped timer with a zeroed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while the countdown is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        (self.status & STATUS_RUNNING) != 0
    }

    /// Returns the current counter value.
    #[must_use]
    pub const fn counter(&self) -> u16 {
        self.counter
    }
}

impl Device for TimerDevice {
    fn name(&self) -> &str {
        TIMER_DEVICE_NAME
    }

    fn hit(&self, address: BusValue) -> bool {
        (TIMER_COUNTER_REGISTER..=TIMER_STATUS_REGISTER).contains(&address)
    }

    fn tick(&mut self) {
        if !self.is_running() {
            return;
        }

        self.counter = self.counter.wrapping_sub(1);

        if self.counter == 0 {
            self.status &= !STATUS_RUNNING;
        }
    }

    fn read(&mut self, address: BusValue) -> Result<BusValue, MachineError> {
        match address {
            TIMER_COUNTER_REGISTER => Ok(self.counter),
            TIMER_CONTROL_REGISTER => Ok(0x0000),
            TIMER_STATUS_REGISTER => Ok(self.status),
            _ => Err(MachineError::OutOfBounds {
                device: self.name().to_owned(),
                address,
            }),
        }
    }

    fn write(&mut self, address: BusValue, value: BusValue) -> Result<(), MachineError> {
        match address {
            TIMER_COUNTER_REGISTER => {
                self.counter = value;
                Ok(())
            }
            TIMER_CONTROL_REGISTER => {
                // Only the start bit matters; starting an already-running
                // timer leaves the countdown untouched.
                if (value & CONTROL_START) != 0 && !self.is_running() {
                    self.status |= STATUS_RUNNING;
                }
                Ok(())
            }
            TIMER_STATUS_REGISTER => Ok(()),
            _ => Err(MachineError::OutOfBounds {
                device: self.name().to_owned(),
                address,
            }),
        }
    }
}
