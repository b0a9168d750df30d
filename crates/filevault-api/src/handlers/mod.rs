//! Route handlers organized by domain.

pub mod file;
pub mod health;
pub mod share;
