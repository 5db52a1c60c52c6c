//! GitHub Contents API client
//!
//! Reads one file with its SHA and writes it back as a new commit. Every
//! failure is mapped straight onto a [`PublishError`](crate::publish::PublishError).

mod client;
mod types;

pub use client::GithubClient;
