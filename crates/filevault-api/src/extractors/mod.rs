//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod origin;
pub mod path;

pub use auth::AuthUser;
pub use json::ValidatedJson;
pub use origin::RequestOrigin;
pub use path::FileIdPath;
