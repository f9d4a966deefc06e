//! Health factors - Independent contributors to a crew member's daily HP change

mod home;
mod loneliness;
mod sickness;

use crate::config::HealthSettings;
use crate::crew::CrewHealthState;
use crate::types::EvaluationMode;
use crate::vessel::Vessel;
use serde::{Deserialize, Serialize};

/// Everything a factor may look at besides the crew member itself
#[derive(Debug, Clone, Copy)]
pub struct CrewContext<'a> {
    pub mode: EvaluationMode,
    /// The vessel the crew member is aboard, if it could be resolved
    pub vessel: Option<&'a Vessel>,
    /// Crew sharing that vessel, the crew member included
    pub crew_count: usize,
}

impl<'a> CrewContext<'a> {
    pub fn live(vessel: Option<&'a Vessel>) -> Self {
        CrewContext {
            mode: EvaluationMode::Live,
            vessel,
            crew_count: vessel.map(|v| v.crew_count()).unwrap_or(0),
        }
    }

    pub fn estimate(mode: EvaluationMode, design: &'a Vessel) -> Self {
        CrewContext {
            mode,
            vessel: Some(design),
            crew_count: design.crew_count(),
        }
    }
}

/// The closed set of factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Factor {
    /// Being at home, low in the home world's atmosphere
    Home,
    /// Nobody else aboard
    Loneliness,
    /// Carrying the sick condition
    Sickness,
}

impl Factor {
    /// Get all factors
    pub fn all() -> &'static [Factor] {
        &[Factor::Home, Factor::Loneliness, Factor::Sickness]
    }

    /// Stable name, used as the multiplier key
    pub fn name(self) -> &'static str {
        match self {
            Factor::Home => "Home",
            Factor::Loneliness => "Loneliness",
            Factor::Sickness => "Sickness",
        }
    }

    pub fn title(self) -> &'static str {
        self.name()
    }

    pub fn from_name(name: &str) -> Option<Factor> {
        Factor::all()
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Whether an unloaded vessel may reuse the last computed value
    ///
    /// Sickness comes and goes with events rather than location, so it is
    /// always recomputed.
    pub fn constant_for_unloaded(self) -> bool {
        !matches!(self, Factor::Sickness)
    }

    /// Whether the factor counts in estimates unless the user says otherwise
    pub fn enabled_in_estimate_by_default(self) -> bool {
        !matches!(self, Factor::Home)
    }

    /// Configured HP/day when the factor applies
    pub fn base_change_per_day(self, settings: &HealthSettings) -> f64 {
        match self {
            Factor::Home => settings.factors.home,
            Factor::Loneliness => settings.factors.loneliness,
            Factor::Sickness => settings.factors.sickness,
        }
    }

    /// HP/day for this crew member before multipliers
    ///
    /// Total over any input: missing context yields 0.
    pub fn change_per_day(
        self,
        crew: &CrewHealthState,
        ctx: &CrewContext<'_>,
        enabled_in_estimate: bool,
        settings: &HealthSettings,
    ) -> f64 {
        let base = self.base_change_per_day(settings);
        match self {
            Factor::Home => home::change_per_day(base, crew, ctx, enabled_in_estimate),
            Factor::Loneliness => loneliness::change_per_day(base, crew, ctx, enabled_in_estimate),
            Factor::Sickness => sickness::change_per_day(base, crew, ctx, enabled_in_estimate),
        }
    }
}

/// A factor and its estimate toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorEntry {
    pub factor: Factor,
    pub enabled_in_estimate: bool,
}

/// Registry of factors keyed by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorRegistry {
    entries: Vec<FactorEntry>,
}

impl Default for FactorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FactorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        FactorRegistry { entries: Vec::new() }
    }

    /// Registry holding every factor with default estimate toggles
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for factor in Factor::all() {
            registry.register(*factor);
        }
        registry
    }

    /// Register a factor; registering it again resets its toggle
    pub fn register(&mut self, factor: Factor) {
        let entry = FactorEntry {
            factor,
            enabled_in_estimate: factor.enabled_in_estimate_by_default(),
        };
        match self.entries.iter_mut().find(|e| e.factor == factor) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FactorEntry> {
        self.entries
            .iter()
            .find(|e| e.factor.name().eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FactorEntry> {
        self.entries.iter()
    }

    /// Toggle a factor for estimates; returns false for an unknown name
    pub fn set_enabled_in_estimate(&mut self, name: &str, enabled: bool) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.factor.name().eq_ignore_ascii_case(name))
        {
            Some(entry) => {
                entry.enabled_in_estimate = enabled;
                true
            }
            None => false,
        }
    }

    pub fn reset_enabled_in_estimate(&mut self) {
        for entry in &mut self.entries {
            entry.enabled_in_estimate = entry.factor.enabled_in_estimate_by_default();
        }
    }
}
