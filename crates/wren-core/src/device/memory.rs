//! Byte-array memory device.

use crate::bus::BusValue;
use crate::device::Device;
use crate::fault::MachineError;

const MEMORY_DEVICE_NAME: &str = "Memory";

/// Flat random-access memory backed by a byte array.
///
/// The bus addresses memory at 16-bit-register granularity while the backing
/// store keeps big-endian byte pairs: the addressed byte is the high half,
/// the following byte the low half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDevice {
    ram: Vec<u8>,
}

impl MemoryDevice {
    /// Creates a memory device of `capacity` bytes, optionally preloaded
    /// with an initial image at offset zero.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::ImageTooLarge`] when the image exceeds
    /// `capacity`.
    pub fn new(capacity: usize, image: Option<&[u8]>) -> Result<Self, MachineError> {
        let mut ram = vec![0; capacity];

        if let Some(image) = image {
            if image.len() > capacity {
                return Err(MachineError::ImageTooLarge {
                    image_bytes: image.len(),
                    capacity,
                });
            }
            ram[..image.len()].copy_from_slice(image);
        }

        Ok(Self { ram })
    }

    /// Returns the full backing store for host-side inspection.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.ram
    }

    /// The bound check rejects the last byte as a word base so the paired
    /// low byte always exists.
    fn in_word_range(&self, address: BusValue) -> bool {
        usize::from(address) + 1 < self.ram.len()
    }
}

impl Device for MemoryDevice {
    fn name(&self) -> &str {
        MEMORY_DEVICE_NAME
    }

    fn hit(&self, address: BusValue) -> bool {
        usize::from(address) < self.ram.len()
    }

    fn tick(&mut self) {
        // Memory has no per-cycle behavior.
    }

    fn read(&mut self, address: BusValue) -> Result<BusValue, MachineError> {
        if !self.in_word_range(address) {
            return Err(MachineError::OutOfBounds {
                device: self.name().to_owned(),
                address,
            });
        }

        let hi = self.ram[usize::from(address)];
        let lo = self.ram[usize::from(address) + 1];
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn write(&mut self, address: BusValue, value: BusValue) -> Result<(), MachineError> {
        if !self.in_word_range(address) {
            return Err(MachineError::OutOfBounds {
                device: self.name().to_owned(),
                address,
            });
        }

        let [hi, lo] = value.to_be_bytes();
        self.ram[usize::from(address)] = hi;
        self.ram[usize::from(address) + 1] = lo;
        Ok(())
    }
}
