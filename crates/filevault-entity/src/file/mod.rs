//! File domain entities.

pub mod model;
pub mod ordering;

pub use model::{CreateFileRecord, FileRecord, FileStats, normalize_tags};
pub use ordering::{MovePlan, Shift};
