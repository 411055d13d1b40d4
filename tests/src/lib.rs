//! Cross-crate tests for sysprobe. Everything lives behind `cfg(test)`.
#[cfg(test)]
mod bytecode;
#[cfg(test)]
mod corpus;
