//! Shared building blocks for the health-record workspace: logging setup,
//! runtime directory checks and small wire types used by every binary.

pub mod types;
pub mod utils;
pub mod env;
