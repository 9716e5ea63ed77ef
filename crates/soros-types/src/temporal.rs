use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Creation timestamp of an outcome record; defines replay order.
///
/// Combines wall-clock milliseconds with a logical counter so that records
/// appended within the same millisecond still receive distinct, strictly
/// increasing stamps.
///
/// Ordering: `physical_ms` → `logical`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordedAt {
    /// Wall-clock milliseconds since UNIX epoch.
    pub physical_ms: u64,
    /// Logical counter for records at the same physical time.
    pub logical: u32,
}

impl RecordedAt {
    pub fn new(physical_ms: u64, logical: u32) -> Self {
        Self {
            physical_ms,
            logical,
        }
    }

    /// Stamp for the current wall-clock time.
    pub fn now() -> Self {
        Self::new(wall_clock_ms(), 0)
    }

    pub const fn zero() -> Self {
        Self {
            physical_ms: 0,
            logical: 0,
        }
    }

    /// A stamp strictly after `previous`, using the wall clock when it has
    /// moved forward and the logical counter otherwise.
    pub fn next_after(previous: Option<&Self>) -> Self {
        let now_ms = wall_clock_ms();
        match previous {
            Some(prev) if prev.physical_ms >= now_ms => Self {
                physical_ms: prev.physical_ms,
                logical: prev.logical + 1,
            },
            _ => Self::new(now_ms, 0),
        }
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl fmt::Debug for RecordedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordedAt({}ms.{})", self.physical_ms, self.logical)
    }
}

impl fmt::Display for RecordedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.physical_ms, self.logical)
    }
}
