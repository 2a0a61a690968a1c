//! Auth module: bearer token codec and login.
//!
//! Tokens are HS256 JWTs whose `userId` claim names a row of the `users` table.

pub mod domain;
pub mod errors;
pub mod service;
pub mod token;

pub use service::AuthService;
pub use token::{bearer_token, TokenCodec};
