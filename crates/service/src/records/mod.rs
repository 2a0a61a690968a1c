//! Health records embedded in pets.
//!
//! Layers, leaf first: `identity` (bearer credential to user), `guard`
//! (per-pet access rule), `service` (the five operations).

pub mod dates;
pub mod domain;
pub mod errors;
pub mod guard;
pub mod identity;
pub mod ids;
pub mod service;

pub use domain::{HealthRecordInput, HealthRecordResponse, HealthRecordView};
pub use errors::RecordError;
pub use service::HealthRecordService;
