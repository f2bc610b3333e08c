//! Byte-addressable persistent storage
//!
//! The program store needs single-byte reads and writes that survive power
//! loss. Writes are assumed atomic per byte; there is no multi-byte
//! transaction guarantee, so callers must order writes such that any prefix
//! of a sequence leaves a recoverable image.

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Address outside the device
    OutOfRange,
    /// Bus transaction failed
    Bus,
    /// Device did not finish its write cycle in time
    Timeout,
}

/// Durable byte storage
pub trait ByteStorage {
    /// Total addressable size in bytes
    fn capacity(&self) -> usize;

    /// Read a single byte
    fn read_byte(&mut self, addr: u16) -> Result<u8, StorageError>;

    /// Write a single byte
    ///
    /// Must be durable when this returns `Ok`.
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError>;

    /// Read a contiguous range into `buf`
    fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        check_range(self.capacity(), addr, buf.len())?;
        for (offset, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(addr + offset as u16)?;
        }
        Ok(())
    }

    /// Write a contiguous range, one byte at a time
    fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), StorageError> {
        check_range(self.capacity(), addr, data.len())?;
        for (offset, &value) in data.iter().enumerate() {
            self.write_byte(addr + offset as u16, value)?;
        }
        Ok(())
    }
}

fn check_range(capacity: usize, addr: u16, len: usize) -> Result<(), StorageError> {
    if addr as usize + len > capacity {
        Err(StorageError::OutOfRange)
    } else {
        Ok(())
    }
}

/// RAM-backed storage for host builds and tests
///
/// Counts writes per address so wear behaviour can be asserted.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
    writes: [u32; N],
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryStorage<N> {
    /// Zero-filled storage
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            writes: [0; N],
        }
    }

    /// Storage in the erased state of a fresh EEPROM (all 0xFF)
    pub const fn erased() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: [0; N],
        }
    }

    /// Raw image
    pub fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Overwrite a byte without counting it as a write (fault injection)
    pub fn poke(&mut self, addr: usize, value: u8) {
        self.bytes[addr] = value;
    }

    /// Number of writes issued to `addr`
    pub fn write_count(&self, addr: usize) -> u32 {
        self.writes[addr]
    }
}

impl<const N: usize> ByteStorage for MemoryStorage<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read_byte(&mut self, addr: u16) -> Result<u8, StorageError> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(StorageError::OutOfRange)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        let index = addr as usize;
        if index >= N {
            return Err(StorageError::OutOfRange);
        }
        self.bytes[index] = value;
        self.writes[index] = self.writes[index].saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let mut mem = MemoryStorage::<8>::new();
        assert_eq!(mem.read_byte(7), Ok(0));
    }

    #[test]
    fn test_erased_is_ff() {
        let mut mem = MemoryStorage::<8>::erased();
        assert_eq!(mem.read_byte(0), Ok(0xFF));
    }

    #[test]
    fn test_range_read_write() {
        let mut mem = MemoryStorage::<16>::new();
        mem.write(4, &[1, 2, 3]).unwrap();

        let mut buf = [0u8; 3];
        mem.read(4, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(mem.write_count(5), 1);
    }

    #[test]
    fn test_out_of_range() {
        let mut mem = MemoryStorage::<4>::new();
        assert_eq!(mem.write_byte(4, 1), Err(StorageError::OutOfRange));
        assert_eq!(mem.write(2, &[0; 3]), Err(StorageError::OutOfRange));
        let mut buf = [0u8; 5];
        assert_eq!(mem.read(0, &mut buf), Err(StorageError::OutOfRange));
    }

    #[test]
    fn test_poke_does_not_count() {
        let mut mem = MemoryStorage::<4>::new();
        mem.poke(1, 9);
        assert_eq!(mem.read_byte(1), Ok(9));
        assert_eq!(mem.write_count(1), 0);
    }
}
