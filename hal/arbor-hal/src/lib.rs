//! Arbor Hardware Abstraction Layer
//!
//! This crate defines the persistence abstraction the scheduling core is
//! written against. Chip- or board-specific crates implement it over real
//! non-volatile memory (I2C EEPROM, emulated EEPROM in flash, ...).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  arbor-core (program store, scheduler)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  arbor-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ arbor-drivers │       │ MemoryStorage │
//! │ (24Cxx EEPROM)│       │ (host / tests)│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::ByteStorage`] - Byte-addressable durable storage

#![no_std]
#![deny(unsafe_code)]

pub mod storage;

pub use storage::{ByteStorage, MemoryStorage, StorageError};
