//! Shared-secret token check used by every mutating or revealing call.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// The configured secret, kept only as a SHA-256 digest.
///
/// Comparison is done over digests so that neither the length nor the prefix
/// of the presented token leaks through timing.
#[derive(Clone)]
pub struct AuthToken {
  digest: Option<[u8; 32]>,
}

impl AuthToken {
  /// An empty secret produces a token that rejects everything.
  pub fn new(secret: impl AsRef<str>) -> Self {
    let secret = secret.as_ref();
    let digest = (!secret.is_empty()).then(|| digest(secret));
    Self { digest }
  }

  pub fn verify(&self, presented: Option<&str>) -> bool {
    let (Some(expected), Some(presented)) = (self.digest, presented) else {
      return false;
    };
    let actual = digest(presented);
    expected
      .iter()
      .zip(actual.iter())
      .fold(0u8, |acc, (a, b)| acc | (a ^ b))
      == 0
  }

  /// Like [`verify`](Self::verify) but as a `Result` for `?` chains.
  pub fn check(&self, presented: Option<&str>) -> Result<()> {
    if self.verify(presented) { Ok(()) } else { Err(Error::Unauthorized) }
  }
}

impl fmt::Debug for AuthToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AuthToken")
      .field("configured", &self.digest.is_some())
      .finish()
  }
}

fn digest(s: &str) -> [u8; 32] { Sha256::digest(s.as_bytes()).into() }
