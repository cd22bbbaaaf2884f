//! External service interactions
//!
//! - Corpus server HTTP client
//! - Background job execution

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod job_runner;

pub use client::HttpCorpusClient;
pub use job_runner::{Dispatch, JobMessage, JobRunner, Outcome, Request};
