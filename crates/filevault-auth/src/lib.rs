//! # filevault-auth
//!
//! Resolves the owner identity behind a bearer token.
//!
//! Tokens are HS256 JWTs whose subject is the owner id. Accounts and
//! sessions live elsewhere; this crate only verifies tokens and, for
//! operators and tests, mints them.

pub mod jwt;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
