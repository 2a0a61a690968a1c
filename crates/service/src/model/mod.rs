//! Persisted documents of the `users` and `pets` tables.
//!
//! Field names follow the camelCase layout of the JSON files. Documents written
//! by older tooling may use `_id` and numeric ids; both are accepted on read and
//! ids are normalized to strings so lookups compare like with like.

pub mod ids;
pub mod pet;
pub mod user;

pub use pet::{HealthRecord, Pet};
pub use user::{Role, User};
