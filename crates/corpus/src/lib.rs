//! Collaborators around the sysprobe core: configuration, mirror-node access, response
//! caching, the on-disk bytecode corpus and the parallel corpus scan.
pub mod cache;
pub mod config;
pub mod harvest;
pub mod mirror;
pub mod network;
pub mod scan;
pub mod store;
