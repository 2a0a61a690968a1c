//! Storage abstractions for the service layer
//!
//! `RecordStore` is the read-all / write-all contract over the `users` and
//! `pets` tables. `JsonFileStore` persists each table as a JSON array file;
//! `MemoryRecordStore` keeps them in memory for tests.

pub mod json_table;
pub mod record_store;

pub use record_store::{JsonFileStore, MemoryRecordStore, RecordStore};
