//! Status vocabulary and row tone hints.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub const DEFAULT_HEALTH: &str = "Unknown";
pub const DEFAULT_SYNC: &str = "Synced";

pub const HEALTH_STATUSES: [&str; 5] = ["Healthy", "Progressing", "Degraded", "Suspended", "Unknown"];
pub const SYNC_STATUSES: [&str; 2] = ["Synced", "OutOfSync"];

/// Presentation-neutral styling hint for a row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum RowTone {
    Healthy,
    Progressing,
    Degraded,
    Suspended,
    Missing,
    OutOfSync,
    #[default]
    Neutral,
}

impl RowTone {
    pub fn for_health(health: &str) -> Self {
        match health.to_ascii_lowercase().as_str() {
            "healthy" => RowTone::Healthy,
            "progressing" => RowTone::Progressing,
            "degraded" => RowTone::Degraded,
            "suspended" => RowTone::Suspended,
            "missing" => RowTone::Missing,
            _ => RowTone::Neutral,
        }
    }

    /// Unhealthy rows take their health tone, healthy but drifted rows are `OutOfSync`.
    pub fn for_statuses(health: &str, sync: &str) -> Self {
        if !health.eq_ignore_ascii_case("healthy") {
            RowTone::for_health(health)
        } else if !sync.eq_ignore_ascii_case("synced") {
            RowTone::OutOfSync
        } else {
            RowTone::Healthy
        }
    }
}

/// Cycle through `options` starting after `current`; wraps to "no filter" after the last.
pub fn next_status<'a>(options: &[&'a str], current: Option<&str>) -> Option<&'a str> {
    match current {
        None => options.first().copied(),
        Some(cur) => {
            let pos = options.iter().position(|o| o.eq_ignore_ascii_case(cur))?;
            options.get(pos + 1).copied()
        }
    }
}
