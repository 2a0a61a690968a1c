//! Service layer for the pet health-record API.
//! - `storage`: whole-table persistence of users and pets.
//! - `auth`: bearer token codec and login.
//! - `records`: identity resolution, access guard and record operations.

pub mod auth;
pub mod errors;
pub mod model;
pub mod records;
pub mod runtime;
pub mod seed;
pub mod storage;
