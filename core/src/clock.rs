//! Portal clock: the single source of "now" for time-dependent views.

use crate::types::{Timestamp, TIMESTAMP_FORMAT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PortalClock {
    /// Wall clock, read as UTC.
    System,
    /// Frozen at a given instant (tests, reproducible reports).
    Fixed {
        #[serde(with = "crate::model::timestamp_format")]
        at: Timestamp,
    },
}

impl PortalClock {
    pub fn fixed(at: Timestamp) -> Self {
        Self::Fixed { at }
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` instant into a fixed clock.
    pub fn parse_fixed(raw: &str) -> Option<Self> {
        Timestamp::parse_from_str(raw, TIMESTAMP_FORMAT).ok().map(Self::fixed)
    }

    pub fn now(&self) -> Timestamp {
        match self {
            PortalClock::System => chrono::Utc::now().naive_utc(),
            PortalClock::Fixed { at } => *at,
        }
    }
}

impl Default for PortalClock {
    fn default() -> Self { Self::System }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let clock = PortalClock::parse_fixed("2024-07-01 00:00:00").unwrap();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_string(), "2024-07-01 00:00:00");
    }

    #[test]
    fn malformed_instant_is_rejected() {
        assert!(PortalClock::parse_fixed("yesterday").is_none());
    }
}
