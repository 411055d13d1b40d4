//! Command implementations for the `sysprobe` binary.
pub mod commands;
