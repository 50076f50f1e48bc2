//! Multi-dimensional filter state shared by the tree and application screens.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    Kind,
    Health,
    Sync,
    Project,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 4] =
        [FilterDimension::Kind, FilterDimension::Health, FilterDimension::Sync, FilterDimension::Project];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDimension::Kind => "kind",
            FilterDimension::Health => "health",
            FilterDimension::Sync => "sync",
            FilterDimension::Project => "project",
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for FilterDimension {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kind" | "k" => Ok(FilterDimension::Kind),
            "health" | "h" => Ok(FilterDimension::Health),
            "sync" | "s" => Ok(FilterDimension::Sync),
            "project" | "p" => Ok(FilterDimension::Project),
            other => Err(format!("unknown filter dimension: {}", other)),
        }
    }
}

/// Active filter values keyed by dimension, kept in activation order.
///
/// Dimensions combine with AND. An empty value means "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterState {
    entries: SmallVec<[(FilterDimension, String); 4]>,
}

impl FilterState {
    pub fn new() -> Self { Self::default() }

    /// Set or clear one dimension. Other dimensions are untouched.
    pub fn set(&mut self, dim: FilterDimension, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.entries.retain(|(d, _)| *d != dim);
            return;
        }
        match self.entries.iter_mut().find(|(d, _)| *d == dim) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((dim, value)),
        }
    }

    /// Set `value`, or clear the dimension when it already holds exactly `value`.
    pub fn toggle(&mut self, dim: FilterDimension, value: &str) {
        if self.get(dim) == Some(value) {
            self.set(dim, "");
        } else {
            self.set(dim, value);
        }
    }

    pub fn get(&self, dim: FilterDimension) -> Option<&str> {
        self.entries.iter().find(|(d, _)| *d == dim).map(|(_, v)| v.as_str())
    }

    pub fn clear(&mut self) { self.entries.clear(); }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (FilterDimension, &str)> {
        self.entries.iter().map(|(d, v)| (*d, v.as_str()))
    }

    /// Human readable summary, `"None"` when nothing is active.
    pub fn description(&self) -> String {
        if self.entries.is_empty() {
            return "None".to_string();
        }
        self.entries.iter().map(|(d, v)| format!("{}={}", d, v)).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_single_dimension() {
        let mut f = FilterState::new();
        f.set(FilterDimension::Health, "Healthy");
        f.set(FilterDimension::Sync, "OutOfSync");
        f.set(FilterDimension::Health, "");
        assert_eq!(f.get(FilterDimension::Health), None);
        assert_eq!(f.get(FilterDimension::Sync), Some("OutOfSync"), "clearing health must keep sync");
    }

    #[test]
    fn description_keeps_activation_order() {
        let mut f = FilterState::new();
        assert_eq!(f.description(), "None");
        f.set(FilterDimension::Project, "x");
        f.set(FilterDimension::Health, "y");
        f.set(FilterDimension::Project, "z");
        assert_eq!(f.description(), "project=z, health=y");
    }

    #[test]
    fn toggle_sets_then_clears() {
        let mut f = FilterState::new();
        f.toggle(FilterDimension::Kind, "Service");
        assert_eq!(f.get(FilterDimension::Kind), Some("Service"));
        f.toggle(FilterDimension::Kind, "Ingress");
        assert_eq!(f.get(FilterDimension::Kind), Some("Ingress"), "different value replaces");
        f.toggle(FilterDimension::Kind, "Ingress");
        assert!(f.is_empty());
    }

    #[test]
    fn dimension_parses_short_names() {
        assert_eq!("h".parse::<FilterDimension>().ok(), Some(FilterDimension::Health));
        assert_eq!("Project".parse::<FilterDimension>().ok(), Some(FilterDimension::Project));
        assert!("colour".parse::<FilterDimension>().is_err());
    }
}
