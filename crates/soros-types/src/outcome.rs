use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Result of staking one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        matches!(self, Self::Win)
    }

    /// Parse a compact outcome string such as `"WWLW"` (case-insensitive).
    pub fn parse_sequence(input: &str) -> Result<Vec<Self>, TypeError> {
        input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| match c.to_ascii_uppercase() {
                'W' => Ok(Self::Win),
                'L' => Ok(Self::Loss),
                other => Err(TypeError::InvalidOutcome(other.to_string())),
            })
            .collect()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Loss => write!(f, "loss"),
        }
    }
}

impl FromStr for Outcome {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "win" => Ok(Self::Win),
            "l" | "loss" => Ok(Self::Loss),
            _ => Err(TypeError::InvalidOutcome(s.to_string())),
        }
    }
}
