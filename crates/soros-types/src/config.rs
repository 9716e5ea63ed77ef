use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::money::{Money, Percent};

/// Parameters of one simulation run.
///
/// Immutable while a lineage is being played; editing any field between
/// runs rebuilds the ladder and starts a new lineage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Base stake when protection is off; added to the protection win
    /// to form level 1's stake when protection is on.
    pub initial_value: Money,
    /// Payout applied to every level unless a level is edited individually.
    pub payout_percent: Percent,
    /// Enables the protection level (level 0).
    pub use_protection: bool,
    /// Stake of level 0 when protection is on.
    pub protection_value: Money,
    /// How many levels the ladder holds.
    pub ladder: LadderShape,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_value: Money::from_units(10),
            payout_percent: Percent::from_whole(80),
            use_protection: false,
            protection_value: Money::from_units(10),
            ladder: LadderShape::default(),
        }
    }
}

impl SimulationConfig {
    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_value.is_positive() {
            return Err(ConfigError::NonPositiveInitialValue(self.initial_value));
        }
        if self.use_protection && !self.protection_value.is_positive() {
            return Err(ConfigError::NonPositiveProtectionValue(
                self.protection_value,
            ));
        }
        if !self.payout_percent.is_valid_payout() {
            return Err(ConfigError::PayoutOutOfRange(self.payout_percent));
        }
        Ok(())
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Balance a fresh lineage starts from.
    pub fn starting_baseline(&self) -> Money {
        if self.use_protection {
            self.protection_value
        } else {
            self.initial_value
        }
    }

    /// Index of the first ladder level: 0 with protection, 1 without.
    pub fn first_level_index(&self) -> u32 {
        if self.use_protection {
            0
        } else {
            1
        }
    }

    /// Index of the last ladder level.
    pub fn last_level_index(&self) -> u32 {
        if self.use_protection {
            self.ladder.forward_levels()
        } else {
            self.ladder.unprotected_levels()
        }
    }

    /// BLAKE3 digest over every field, used to derive lineage identity.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"soros-config-v1:");
        hasher.update(&self.initial_value.cents().to_le_bytes());
        hasher.update(&self.payout_percent.bp().to_le_bytes());
        hasher.update(&[u8::from(self.use_protection)]);
        hasher.update(&self.protection_value.cents().to_le_bytes());
        hasher.update(&self.ladder.forward_levels().to_le_bytes());
        hasher.update(&self.ladder.unprotected_levels().to_le_bytes());
        *hasher.finalize().as_bytes()
    }
}

/// Number of levels built for each mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderShape {
    /// Levels built after level 0 when protection is on.
    pub protected_forward_levels: u32,
    /// Levels built when protection is off.
    pub unprotected_levels: u32,
}

impl Default for LadderShape {
    fn default() -> Self {
        Self {
            protected_forward_levels: 5,
            unprotected_levels: 6,
        }
    }
}

impl LadderShape {
    pub fn forward_levels(&self) -> u32 {
        self.protected_forward_levels.max(1)
    }

    pub fn unprotected_levels(&self) -> u32 {
        self.unprotected_levels.max(1)
    }
}
