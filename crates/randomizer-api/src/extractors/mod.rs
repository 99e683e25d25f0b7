//! Axum extractors for request handling
//!
//! Custom extractors for validated bodies and session path parameters.

mod path;
mod validated;

pub use path::SessionIdPath;
pub use validated::{OptionalValidatedJson, ValidatedJson};
