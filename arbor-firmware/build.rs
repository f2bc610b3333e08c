//! Build script for arbor-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates stand.toml and compiles it into `stand_config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Size of the program store image
const MIN_EEPROM_CAPACITY: u32 = 181;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StandToml {
    timing: Timing,
    eeprom: Eeprom,
    relays: Relays,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Timing {
    unit_ms: u32,
    fast_unit_ms: u32,
    debounce_ms: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Eeprom {
    address: u8,
    capacity: u32,
    #[serde(default)]
    wide_address: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Relays {
    #[serde(default)]
    active_low: bool,
}

fn main() {
    setup_linker();
    let stand = load_config();
    validate_config(&stand);
    generate_config(&stand);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse stand.toml
fn load_config() -> StandToml {
    println!("cargo:rerun-if-changed=stand.toml");

    let config_path = Path::new("stand.toml");
    if !config_path.exists() {
        fail(
            "stand.toml not found",
            &["The firmware requires a stand.toml next to Cargo.toml."],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read stand.toml", &[&e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(stand) => stand,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid stand.toml", &lines)
        }
    }
}

/// Check values against the limits the controller relies on
fn validate_config(stand: &StandToml) {
    let mut errors = Vec::new();

    let timing = &stand.timing;
    if timing.unit_ms == 0 || timing.fast_unit_ms == 0 {
        errors.push("timing: unit lengths must be non-zero".to_string());
    }
    if timing.fast_unit_ms >= timing.unit_ms {
        errors.push(format!(
            "timing: fast_unit_ms ({}) must be shorter than unit_ms ({})",
            timing.fast_unit_ms, timing.unit_ms
        ));
    }
    if timing.debounce_ms > 2_000 {
        errors.push(format!(
            "timing: debounce_ms ({}) would swallow deliberate presses",
            timing.debounce_ms
        ));
    }

    let eeprom = &stand.eeprom;
    if !(0x50..=0x57).contains(&eeprom.address) {
        errors.push(format!(
            "eeprom: address 0x{:02X} is outside the 24Cxx range 0x50-0x57",
            eeprom.address
        ));
    }
    if eeprom.capacity < MIN_EEPROM_CAPACITY {
        errors.push(format!(
            "eeprom: capacity {} is smaller than the {}-byte image",
            eeprom.capacity, MIN_EEPROM_CAPACITY
        ));
    }
    if !eeprom.wide_address && eeprom.capacity > 2048 {
        errors.push("eeprom: parts over 2 KiB need wide_address = true".to_string());
    }
    if eeprom.wide_address && eeprom.capacity > 65536 {
        errors.push("eeprom: capacity exceeds 16-bit addressing".to_string());
    }

    if !errors.is_empty() {
        let lines: Vec<&str> = errors.iter().map(String::as_str).collect();
        fail("stand.toml failed validation", &lines);
    }

    println!("cargo:warning=stand.toml validated successfully");
}

/// Emit the validated values as constants
fn generate_config(stand: &StandToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("stand_config.rs")).unwrap();

    writeln!(f, "// Generated from stand.toml by build.rs").unwrap();
    writeln!(f, "pub const UNIT_MS: u32 = {};", stand.timing.unit_ms).unwrap();
    writeln!(f, "pub const FAST_UNIT_MS: u32 = {};", stand.timing.fast_unit_ms).unwrap();
    writeln!(f, "pub const DEBOUNCE_MS: u32 = {};", stand.timing.debounce_ms).unwrap();
    writeln!(f, "pub const EEPROM_ADDRESS: u8 = 0x{:02X};", stand.eeprom.address).unwrap();
    writeln!(f, "pub const EEPROM_CAPACITY: usize = {};", stand.eeprom.capacity).unwrap();
    writeln!(f, "pub const EEPROM_WIDE_ADDRESS: bool = {};", stand.eeprom.wide_address).unwrap();
    writeln!(f, "pub const RELAYS_ACTIVE_LOW: bool = {};", stand.relays.active_low).unwrap();
}

/// Abort the build with a framed message
fn fail(title: &str, lines: &[&str]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<58} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
