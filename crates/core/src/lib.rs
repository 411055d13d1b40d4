//! Core of sysprobe: bytecode decoding, the selector catalog, pattern detection and
//! corpus-wide aggregation. Everything here is synchronous and free of I/O apart from the
//! input helpers in `decoder`.
pub mod aggregate;
pub mod catalog;
pub mod decoder;
pub mod detection;
pub mod opcode;

pub use opcode::Opcode;
