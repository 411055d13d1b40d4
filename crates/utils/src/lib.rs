//! Shared error types for the sysprobe workspace.
pub mod errors;
