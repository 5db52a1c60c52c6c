//! Publish pipeline
//!
//! Overwrites the container element of one HTML file in a GitHub repository:
//! method check, secret check, payload check, config check, fetch, splice,
//! commit. Each step is terminal on failure and nothing is retried.

pub mod codec;
mod error;
mod handler;
mod request;
mod splice;

pub use error::{Phase, PublishError};
pub use handler::{Outcome, PublishInput, Publisher};

/// Header carrying the shared secret
pub const SECRET_HEADER: &str = "x-gdd-password";
