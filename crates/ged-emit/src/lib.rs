#![forbid(unsafe_code)]

mod emitter;

use ged_core::{EmitConfig, Record, Transmission};

pub use emitter::GedcomEmitter;

/// Regenerate one record, its own line at `level`, with the default configuration.
#[must_use]
pub fn to_text(transmission: &Transmission, record: &Record, level: usize) -> String {
    GedcomEmitter::default().emit_record(transmission, record, level)
}

#[must_use]
pub fn emit_transmission(transmission: &Transmission) -> String {
    GedcomEmitter::default().emit_transmission(transmission)
}

#[must_use]
pub fn emit_with_config(transmission: &Transmission, config: &EmitConfig) -> String {
    GedcomEmitter::new(config.clone()).emit_transmission(transmission)
}
