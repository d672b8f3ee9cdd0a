//! Identifier assignment for upserted texts.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// How ids are chosen for the texts of an upsert batch.
///
/// Every strategy returns exactly one id per text, in input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// The 0-based position within the batch. Ids restart at "0" on every
    /// call, so a second batch overwrites the first in the same namespace.
    #[default]
    Positional,
    /// A random UUIDv4 per text.
    Uuid,
    /// SHA-256 of namespace and text; re-sending a text replaces its entry.
    ContentHash,
}

impl IdStrategy {
    pub fn assign(&self, texts: &[String], namespace: &str) -> Vec<String> {
        match self {
            IdStrategy::Positional => (0..texts.len()).map(|i| i.to_string()).collect(),
            IdStrategy::Uuid => texts.iter().map(|_| Uuid::new_v4().to_string()).collect(),
            IdStrategy::ContentHash => texts
                .iter()
                .map(|text| content_hash(namespace, text))
                .collect(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Positional => "positional",
            IdStrategy::Uuid => "uuid",
            IdStrategy::ContentHash => "content-hash",
        }
    }
}

fn content_hash(namespace: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" | "index" => Ok(IdStrategy::Positional),
            "uuid" => Ok(IdStrategy::Uuid),
            "content-hash" | "content_hash" | "hash" => Ok(IdStrategy::ContentHash),
            other => Err(format!(
                "unknown id strategy '{}', expected positional, uuid or content-hash",
                other
            )),
        }
    }
}
