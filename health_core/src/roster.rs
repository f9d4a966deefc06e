//! Roster - Registry of tracked crew members

use crate::config::HealthSettings;
use crate::crew::CrewHealthState;
use crate::error::HealthError;
use crate::types::{ConditionKind, CrewId};
use crate::vessel::Vessel;
use std::collections::BTreeMap;
use tracing::info;

/// Owns the health state of every tracked crew member
#[derive(Debug, Clone, Default)]
pub struct Roster {
    crew: BTreeMap<CrewId, CrewHealthState>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a crew member
    pub fn hire(&mut self, state: CrewHealthState) -> Result<(), HealthError> {
        if self.crew.contains_key(&state.id) {
            return Err(HealthError::DuplicateCrew(state.id));
        }
        info!("Now tracking {}.", state.name);
        self.crew.insert(state.id.clone(), state);
        Ok(())
    }

    /// Stop tracking a crew member for good
    pub fn remove(&mut self, id: &CrewId) -> Result<CrewHealthState, HealthError> {
        let state = self
            .crew
            .remove(id)
            .ok_or_else(|| HealthError::UnknownCrew(id.clone()))?;
        info!("Stopped tracking {}.", state.name);
        Ok(state)
    }

    pub fn get(&self, id: &CrewId) -> Option<&CrewHealthState> {
        self.crew.get(id)
    }

    pub fn get_mut(&mut self, id: &CrewId) -> Option<&mut CrewHealthState> {
        self.crew.get_mut(id)
    }

    fn require_mut(&mut self, id: &CrewId) -> Result<&mut CrewHealthState, HealthError> {
        self.crew
            .get_mut(id)
            .ok_or_else(|| HealthError::UnknownCrew(id.clone()))
    }

    pub fn contains(&self, id: &CrewId) -> bool {
        self.crew.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.crew.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crew.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrewHealthState> {
        self.crew.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CrewHealthState> {
        self.crew.values_mut()
    }

    /// Detached copy of one crew member's state, for display
    pub fn snapshot(&self, id: &CrewId) -> Option<CrewHealthState> {
        self.crew.get(id).cloned()
    }

    /// Detached copies of every crew member's state
    pub fn snapshots(&self) -> Vec<CrewHealthState> {
        self.crew.values().cloned().collect()
    }

    /// Train a crew member for every module on `vessel` that needs it
    pub fn start_training(
        &mut self,
        id: &CrewId,
        vessel: &Vessel,
        now: f64,
        settings: &HealthSettings,
    ) -> Result<usize, HealthError> {
        let modules = vessel.training_modules();
        self.require_mut(id)?
            .start_training(&modules, &vessel.name, now, settings)
    }

    /// Returns true if the condition was newly added
    pub fn add_condition(
        &mut self,
        id: &CrewId,
        kind: ConditionKind,
        now: f64,
        expires_at: Option<f64>,
    ) -> Result<bool, HealthError> {
        Ok(self.require_mut(id)?.add_condition(kind, now, expires_at))
    }

    /// Returns true if the condition was present
    pub fn remove_condition(&mut self, id: &CrewId, kind: ConditionKind) -> Result<bool, HealthError> {
        Ok(self.require_mut(id)?.remove_condition(kind))
    }
}
