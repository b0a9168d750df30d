//! # filevault-database
//!
//! PostgreSQL connection management and the file repository, with a
//! PostgreSQL implementation and an in-process implementation for
//! development and tests.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{FileRepository, MemoryFileRepository, PgFileRepository};
