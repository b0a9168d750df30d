//! File repository trait and its implementations.

pub mod file;
pub mod memory;

pub use file::{FileRepository, PgFileRepository};
pub use memory::MemoryFileRepository;
