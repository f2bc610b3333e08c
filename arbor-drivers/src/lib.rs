//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in arbor-core and arbor-hal on top of `embedded-hal` 1.0:
//!
//! - Relay bank (74HC595 shift register chain)
//! - Persistent storage (24Cxx I2C EEPROM)
//! - Panel keypad (four push buttons plus the speed-up switch)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod keypad;
pub mod relay;
pub mod storage;
