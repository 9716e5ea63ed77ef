use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::TypeError;

/// Identity of one append-only ledger of outcome records.
///
/// A lineage is derived deterministically from the owning user and the
/// fingerprint of the configuration the records were produced under. The
/// same user and configuration always produce the same lineage; changing
/// any configuration field starts a new one.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineageId {
    hash: [u8; 32],
}

impl LineageId {
    /// Derive the lineage for a user running a configuration.
    pub fn derive(user: &str, config: &SimulationConfig) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"soros-lineage-v1:");
        hasher.update(user.as_bytes());
        hasher.update(b":");
        hasher.update(&config.fingerprint());
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create an ephemeral (random) lineage for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self { hash: bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("ln:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `ln:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("ln:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let hash: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self { hash })
    }
}

impl fmt::Debug for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineageId({})", self.short_id())
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

/// Unique identifier for a persisted outcome record (UUID v7).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(uuid::Uuid);

impl RecordId {
    /// Generate a new time-ordered record ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.short_id())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Money, Percent};

    #[test]
    fn derive_is_deterministic() {
        let config = SimulationConfig::default();
        assert_eq!(
            LineageId::derive("alice", &config),
            LineageId::derive("alice", &config)
        );
    }

    #[test]
    fn user_and_config_both_matter() {
        let config = SimulationConfig::default();
        let changed = SimulationConfig {
            payout_percent: Percent::from_whole(90),
            ..SimulationConfig::default()
        };
        let base = LineageId::derive("alice", &config);
        assert_ne!(base, LineageId::derive("bob", &config));
        assert_ne!(base, LineageId::derive("alice", &changed));

        let other_stake = SimulationConfig {
            initial_value: Money::from_units(11),
            ..SimulationConfig::default()
        };
        assert_ne!(base, LineageId::derive("alice", &other_stake));
    }

    #[test]
    fn short_id_format() {
        let id = LineageId::derive("alice", &SimulationConfig::default());
        let short = id.short_id();
        assert!(short.starts_with("ln:"));
        assert_eq!(short.len(), 11);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let id = LineageId::ephemeral();
        assert_eq!(LineageId::from_hex(&id.to_hex()).unwrap(), id);
        assert_eq!(LineageId::from_hex(&format!("ln:{}", id.to_hex())).unwrap(), id);
        assert!(matches!(
            LineageId::from_hex("abcd"),
            Err(TypeError::InvalidLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn record_ids_are_unique() {
        let first = RecordId::new();
        let second = RecordId::new();
        assert_ne!(first, second);
        assert_eq!(first.short_id().len(), 8);
    }
}
