//! API models for requests and responses

pub mod generate;

// Re-export commonly used types
pub use generate::*;
