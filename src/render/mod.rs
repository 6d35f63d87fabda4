//! Rendering module for writing results as JSON.

mod json;

pub use json::{to_json, ErrorReport, JsonFormat};
