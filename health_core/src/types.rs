//! Core types shared across the health simulation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a tracked crew member
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CrewId(pub String);

impl From<&str> for CrewId {
    fn from(s: &str) -> Self {
        CrewId(s.to_string())
    }
}

impl From<String> for CrewId {
    fn from(s: String) -> Self {
        CrewId(s)
    }
}

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a crew member currently is, as reported by the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterStatus {
    /// Resting at the home base
    #[default]
    Available,
    /// Aboard a vessel
    Assigned,
    Dead,
    Missing,
}

/// Named, independently toggleable status flags on a crew member
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Enables the sickness factor
    Sick,
    /// Crew member is training for a vessel's equipment
    Training,
    /// HP fell below the exhaustion threshold
    Exhausted,
}

impl ConditionKind {
    /// Get all condition kinds
    pub fn all() -> &'static [ConditionKind] {
        &[ConditionKind::Sick, ConditionKind::Training, ConditionKind::Exhausted]
    }

    pub fn name(self) -> &'static str {
        match self {
            ConditionKind::Sick => "Sick",
            ConditionKind::Training => "Training",
            ConditionKind::Exhausted => "Exhausted",
        }
    }
}

/// Toggles that only exist while estimating a vessel design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateOptions {
    /// Whether health modules on the design count at all
    pub health_modules_enabled: bool,
    /// Whether the report includes training time
    pub training_enabled: bool,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        EstimateOptions {
            health_modules_enabled: true,
            training_enabled: true,
        }
    }
}

impl EstimateOptions {
    pub fn reset(&mut self) {
        *self = EstimateOptions::default();
    }
}

/// Which evaluation path is running
///
/// The same factor and aggregation code serves both paths; only the
/// predicates that need a live vessel consult this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Authoritative simulation of launched vessels
    Live,
    /// What-if estimate for a vessel that has not been launched
    Estimate(EstimateOptions),
}

impl EvaluationMode {
    pub fn is_estimate(&self) -> bool {
        matches!(self, EvaluationMode::Estimate(_))
    }
}
