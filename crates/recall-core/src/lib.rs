//! Core types and trait definitions for the recall revision scheduler.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the ingestion feed and the notification channel are all
//! reached through the traits defined here.

// Native `async fn` in traits; the store-facing traits spell out their `Send`
// futures explicitly.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod backlog;
pub mod committer;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod question;
pub mod selector;
pub mod stats;

#[cfg(test)]
mod testing;

pub use auth::AuthToken;
pub use backlog::Backlog;
pub use committer::{CommitResult, Committer};
pub use error::{BoxError, Error, Result};
pub use ingest::{CandidateSource, Ingestor};
pub use notify::{LogNotifier, Notifier};
pub use question::{Candidate, Question, QuestionId, ScheduledQuestion};
pub use selector::Selector;
