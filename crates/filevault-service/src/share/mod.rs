//! Public access to files by id.

pub mod service;

pub use service::{ShareLink, ShareService};
