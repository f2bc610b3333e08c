//! 24Cxx I2C EEPROM
//!
//! Byte writes start an internal write cycle of up to a few milliseconds
//! during which the device NACKs its address. [`Eeprom24x`] polls for the
//! ACK after every write so a returned `Ok` means the byte is durable.
//!
//! Small parts (24C01-24C16) take a one-byte word address and use the low
//! three bits of the device address as a block select; larger parts take a
//! two-byte big-endian word address.

use arbor_hal::{ByteStorage, StorageError};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

/// Word address size on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressWidth {
    /// One byte, overflow bits go into the device address
    Eight,
    /// Two bytes, big-endian
    Sixteen,
}

/// EEPROM part configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EepromConfig {
    /// 7-bit device address (A2..A0 strapping included)
    pub address: u8,
    /// Size in bytes
    pub capacity: usize,
    /// Word address size
    pub width: AddressWidth,
    /// Delay between ACK polls (us)
    pub poll_interval_us: u32,
    /// ACK polls before giving up on a write cycle
    pub max_polls: u16,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self::c02()
    }
}

impl EepromConfig {
    /// 24C02: 256 bytes, 5 ms write cycle
    pub const fn c02() -> Self {
        Self {
            address: 0x50,
            capacity: 256,
            width: AddressWidth::Eight,
            poll_interval_us: 500,
            max_polls: 20,
        }
    }

    /// 24C32: 4 KiB, two-byte addressing
    pub const fn c32() -> Self {
        Self {
            address: 0x50,
            capacity: 4096,
            width: AddressWidth::Sixteen,
            poll_interval_us: 500,
            max_polls: 20,
        }
    }
}

/// 24Cxx EEPROM on a blocking I2C bus
pub struct Eeprom24x<I, D> {
    i2c: I,
    delay: D,
    config: EepromConfig,
}

impl<I: I2c, D: DelayNs> Eeprom24x<I, D> {
    /// Create a driver for the part described by `config`
    pub fn new(i2c: I, delay: D, config: EepromConfig) -> Self {
        Self { i2c, delay, config }
    }

    /// Part configuration
    pub fn config(&self) -> &EepromConfig {
        &self.config
    }

    /// Release the bus and delay
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    /// Device address and word address bytes for `addr`
    fn encode(&self, addr: u16) -> (u8, [u8; 2], usize) {
        let [hi, lo] = addr.to_be_bytes();
        match self.config.width {
            AddressWidth::Eight => (self.config.address | (hi & 0x07), [lo, 0], 1),
            AddressWidth::Sixteen => (self.config.address, [hi, lo], 2),
        }
    }

    fn check(&self, addr: u16, len: usize) -> Result<(), StorageError> {
        if addr as usize + len > self.config.capacity {
            Err(StorageError::OutOfRange)
        } else {
            Ok(())
        }
    }

    /// Poll until the device ACKs again after a write
    fn wait_ready(&mut self, device: u8) -> Result<(), StorageError> {
        let mut probe = [0u8; 1];
        for _ in 0..self.config.max_polls {
            self.delay.delay_us(self.config.poll_interval_us);
            match self.i2c.read(device, &mut probe) {
                Ok(()) => return Ok(()),
                Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => continue,
                Err(_) => return Err(StorageError::Bus),
            }
        }
        Err(StorageError::Timeout)
    }
}

impl<I: I2c, D: DelayNs> ByteStorage for Eeprom24x<I, D> {
    fn capacity(&self) -> usize {
        self.config.capacity
    }

    fn read_byte(&mut self, addr: u16) -> Result<u8, StorageError> {
        let mut buf = [0u8; 1];
        self.read(addr, &mut buf)?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        self.check(addr, 1)?;
        let (device, word, len) = self.encode(addr);
        let mut frame = [0u8; 3];
        frame[..len].copy_from_slice(&word[..len]);
        frame[len] = value;

        self.i2c
            .write(device, &frame[..=len])
            .map_err(|_| StorageError::Bus)?;
        self.wait_ready(device)
    }

    /// Sequential read in a single bus transaction
    fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        self.check(addr, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }
        let (device, word, len) = self.encode(addr);
        self.i2c
            .write_read(device, &word[..len], buf)
            .map_err(|_| StorageError::Bus)
    }
}
