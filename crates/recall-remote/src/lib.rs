//! HTTP clients for the services recall talks to.
//!
//! - [`LeetCodeSource`] pulls recently accepted submissions and offers them
//!   to ingestion as [`recall_core::Candidate`]s.
//! - [`EmailJsNotifier`] mails each scheduled batch through EmailJS.

pub mod emailjs;
pub mod error;
pub mod leetcode;

use std::time::Duration;

use reqwest::Client;

pub use emailjs::{EmailJsConfig, EmailJsNotifier};
pub use error::{Error, Result};
pub use leetcode::LeetCodeSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client() -> Result<Client> {
  Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}
