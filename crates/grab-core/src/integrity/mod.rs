//! Content integrity values in `<algorithm>-<base64 digest>` form.
//!
//! An [`Integrity`] only ever holds a canonically encoded digest, so the
//! string written at add time and the string recomputed at download time
//! compare byte for byte.

mod algorithm;

pub use algorithm::{Algorithm, Hasher};

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{GrabError, Result};

const BUF_SIZE: usize = 64 * 1024;

/// Algorithm-tagged digest of an artifact's full byte content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Integrity {
    algorithm: Algorithm,
    digest: Vec<u8>,
}

impl Integrity {
    pub(crate) fn from_digest(algorithm: Algorithm, digest: Vec<u8>) -> Self {
        Self { algorithm, digest }
    }

    /// Digest of an in-memory buffer.
    pub fn compute(algorithm: Algorithm, data: &[u8]) -> Self {
        let mut hasher = algorithm.hasher();
        hasher.update(data);
        hasher.finalize()
    }

    /// Digest of a file on disk, read in chunks to keep memory bounded.
    pub fn of_path(path: &Path, algorithm: Algorithm) -> Result<Self> {
        let mut f = File::open(path)
            .map_err(|e| GrabError::io(format!("open {}", path.display()), e))?;
        let mut hasher = algorithm.hasher();
        let mut buf = vec![0u8; BUF_SIZE];
        loop {
            let n = f
                .read(&mut buf)
                .map_err(|e| GrabError::io(format!("read {}", path.display()), e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl fmt::Display for Integrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.algorithm, STANDARD.encode(&self.digest))
    }
}

impl FromStr for Integrity {
    type Err = GrabError;

    fn from_str(s: &str) -> Result<Self> {
        let (algo, encoded) = s.split_once('-').ok_or_else(|| {
            GrabError::InvalidInput(format!("integrity '{}' has no algorithm prefix", s))
        })?;
        let algorithm: Algorithm = algo.parse()?;
        let digest = STANDARD.decode(encoded).map_err(|e| {
            GrabError::InvalidInput(format!("integrity '{}' is not valid base64: {}", s, e))
        })?;
        if digest.len() != algorithm.digest_len() {
            return Err(GrabError::InvalidInput(format!(
                "integrity '{}' has a {}-byte digest, {} needs {}",
                s,
                digest.len(),
                algorithm,
                algorithm.digest_len()
            )));
        }
        Ok(Self { algorithm, digest })
    }
}

impl TryFrom<String> for Integrity {
    type Error = GrabError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Integrity> for String {
    fn from(value: Integrity) -> Self {
        value.to_string()
    }
}
