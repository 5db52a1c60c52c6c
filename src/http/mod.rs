//! HTTP protocol layer module
//!
//! JSON response builders with the CORS headers required on every reply.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_413_response, build_commit_response, build_error_response,
    build_health_response, build_preflight_response,
};
