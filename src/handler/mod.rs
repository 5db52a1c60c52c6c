//! Request handler module
//!
//! Responsible for request routing dispatch: the publish route, the health
//! check, and 404 for everything else.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
