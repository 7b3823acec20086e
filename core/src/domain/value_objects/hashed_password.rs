//! Result of hashing a plaintext password.

use serde::{Deserialize, Serialize};

/// A password hash together with the tag of the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword {
    pub hash: String,
    pub algorithm: String,
}

impl HashedPassword {
    pub fn new(hash: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            algorithm: algorithm.into(),
        }
    }
}
