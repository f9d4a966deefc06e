//! Training bookkeeping for a crew member

use super::CrewHealthState;
use crate::config::HealthSettings;
use crate::error::HealthError;
use crate::module::HealthModule;
use crate::types::{ConditionKind, RosterStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A module waiting in the training queue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingItem {
    pub module_id: u32,
    pub complexity: f64,
}

impl CrewHealthState {
    /// Training level reached for a module, within [0, training cap]
    pub fn training_level(&self, module_id: u32) -> f64 {
        self.training.get(&module_id).copied().unwrap_or(0.0)
    }

    pub fn training_queue(&self) -> &[TrainingItem] {
        &self.training_queue
    }

    /// Level gained per day on a module of complexity 1
    pub fn training_per_day(&self, settings: &HealthSettings) -> f64 {
        self.training_speed * settings.training.per_day
    }

    /// Why this crew member can't train at the home base, if they can't
    pub fn training_blocker(&self) -> Option<&'static str> {
        if self.status != RosterStatus::Available {
            Some("not at the home base")
        } else if self.has_condition(ConditionKind::Sick) {
            Some("sick")
        } else if self.has_condition(ConditionKind::Exhausted) {
            Some("exhausted")
        } else {
            None
        }
    }

    pub fn can_train_at_home(&self) -> bool {
        self.training_blocker().is_none()
    }

    /// Queue every module that still needs training and mark the crew member as training
    ///
    /// Returns the number of queued modules.
    pub fn start_training(
        &mut self,
        modules: &[&HealthModule],
        vessel_name: &str,
        now: f64,
        settings: &HealthSettings,
    ) -> Result<usize, HealthError> {
        let reason = if !settings.training.enabled {
            Some("training is disabled")
        } else {
            self.training_blocker()
        };
        if let Some(reason) = reason {
            return Err(HealthError::CannotTrain {
                name: self.name.clone(),
                reason: reason.to_string(),
            });
        }

        let cap = settings.training.cap;
        let queue: Vec<TrainingItem> = modules
            .iter()
            .filter(|m| m.needs_training() && self.training_level(m.id) < cap)
            .map(|m| TrainingItem {
                module_id: m.id,
                complexity: m.complexity,
            })
            .collect();
        if queue.is_empty() {
            return Err(HealthError::NothingToTrain(self.name.clone()));
        }

        info!(
            "{} started training for {} on {} modules.",
            self.name,
            vessel_name,
            queue.len()
        );
        let queued = queue.len();
        self.training_queue = queue;
        self.training_vessel = Some(vessel_name.to_string());
        self.add_condition(ConditionKind::Training, now, None);
        Ok(queued)
    }

    /// Drop the queue and the training condition
    pub fn stop_training(&mut self) {
        self.training_queue.clear();
        self.training_vessel = None;
        self.remove_condition(ConditionKind::Training);
    }

    /// Whether training may progress right now
    pub fn is_training(&self) -> bool {
        self.has_condition(ConditionKind::Training)
            && self.status != RosterStatus::Assigned
            && !self.has_condition(ConditionKind::Sick)
    }

    /// Progress the queue by `days`, one module at a time
    ///
    /// Returns the days left over after the queue finished.
    pub fn train(&mut self, days: f64, settings: &HealthSettings) -> f64 {
        let per_day = self.training_per_day(settings);
        if !self.is_training() || days <= 0.0 || per_day <= 0.0 {
            return days.max(0.0);
        }

        let cap = settings.training.cap;
        let mut remaining = days;
        while let Some(item) = self.training_queue.first().copied() {
            let level = self.training_level(item.module_id);
            let rate = per_day / item.complexity;
            let needed = (cap - level).max(0.0) / rate;
            if needed > remaining {
                self.training.insert(item.module_id, level + rate * remaining);
                return 0.0;
            }
            self.training.insert(item.module_id, cap);
            self.training_queue.remove(0);
            remaining -= needed;
        }

        info!(
            "{} finished training for {}.",
            self.name,
            self.training_vessel.as_deref().unwrap_or("a vessel")
        );
        self.stop_training();
        remaining
    }

    /// Days needed to train `modules` up to the cap, `None` if training can't progress
    pub fn training_time(&self, modules: &[&HealthModule], settings: &HealthSettings) -> Option<f64> {
        let items: Vec<TrainingItem> = modules
            .iter()
            .filter(|m| m.needs_training())
            .map(|m| TrainingItem {
                module_id: m.id,
                complexity: m.complexity,
            })
            .collect();
        self.time_for(&items, settings)
    }

    /// Days left on the current queue
    pub fn remaining_training_time(&self, settings: &HealthSettings) -> Option<f64> {
        self.time_for(&self.training_queue, settings)
    }

    fn time_for(&self, items: &[TrainingItem], settings: &HealthSettings) -> Option<f64> {
        let per_day = self.training_per_day(settings);
        if per_day <= 0.0 {
            return None;
        }
        let cap = settings.training.cap;
        let work: f64 = items
            .iter()
            .map(|item| (cap - self.training_level(item.module_id)).max(0.0) * item.complexity)
            .sum();
        Some(work / per_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleConfiguration;
    use std::sync::Arc;

    fn modules() -> Vec<HealthModule> {
        let config = Arc::new(ModuleConfiguration {
            recuperation: 1.0,
            resource_consumption: 1.0,
            ..Default::default()
        });
        vec![
            HealthModule::new(1, Arc::clone(&config)).with_complexity(1.0),
            HealthModule::new(2, Arc::clone(&config)).with_complexity(2.0),
            HealthModule::new(3, config),
        ]
    }

    fn trainee() -> CrewHealthState {
        CrewHealthState::new("Bill".into(), "Bill", 1, &HealthSettings::default())
    }

    #[test]
    fn test_training_time_sums_items() {
        let settings = HealthSettings::default();
        let modules = modules();
        let refs: Vec<&HealthModule> = modules.iter().collect();
        // (0.6 * 1 + 0.6 * 2) / 0.1
        let days = trainee().training_time(&refs, &settings).unwrap();
        assert!((days - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_training_queues_modules() {
        let settings = HealthSettings::default();
        let modules = modules();
        let refs: Vec<&HealthModule> = modules.iter().collect();
        let mut crew = trainee();

        assert_eq!(crew.start_training(&refs, "Station", 0.0, &settings), Ok(2));
        assert!(crew.has_condition(ConditionKind::Training));
        assert_eq!(crew.training_vessel.as_deref(), Some("Station"));
        assert!((crew.remaining_training_time(&settings).unwrap() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_cannot_train_when_assigned_or_sick() {
        let settings = HealthSettings::default();
        let modules = modules();
        let refs: Vec<&HealthModule> = modules.iter().collect();

        let mut assigned = trainee();
        assigned.status = RosterStatus::Assigned;
        assert!(matches!(
            assigned.start_training(&refs, "Station", 0.0, &settings),
            Err(HealthError::CannotTrain { .. })
        ));

        let mut sick = trainee();
        sick.add_condition(ConditionKind::Sick, 0.0, None);
        assert!(!sick.can_train_at_home());
    }

    #[test]
    fn test_nothing_to_train() {
        let settings = HealthSettings::default();
        let modules = modules();
        let refs: Vec<&HealthModule> = modules[2..].iter().collect();
        let mut crew = trainee();
        assert_eq!(
            crew.start_training(&refs, "Station", 0.0, &settings),
            Err(HealthError::NothingToTrain("Bill".to_string()))
        );
    }

    #[test]
    fn test_train_sequentially_to_cap() {
        let settings = HealthSettings::default();
        let modules = modules();
        let refs: Vec<&HealthModule> = modules.iter().collect();
        let mut crew = trainee();
        crew.start_training(&refs, "Station", 0.0, &settings).unwrap();

        // First module needs 6 days
        assert!(crew.train(3.0, &settings).abs() < f64::EPSILON);
        assert!((crew.training_level(1) - 0.3).abs() < 1e-9);
        assert!(crew.training_level(2).abs() < f64::EPSILON);

        assert!(crew.train(5.0, &settings).abs() < f64::EPSILON);
        assert!((crew.training_level(1) - 0.6).abs() < 1e-9);
        assert!((crew.training_level(2) - 0.1).abs() < 1e-9);

        let left = crew.train(100.0, &settings);
        assert!((left - 90.0).abs() < 1e-9);
        assert!((crew.training_level(2) - 0.6).abs() < 1e-9);
        assert!(!crew.has_condition(ConditionKind::Training));
        assert!(crew.training_vessel.is_none());
    }

    #[test]
    fn test_no_progress_while_assigned() {
        let settings = HealthSettings::default();
        let modules = modules();
        let refs: Vec<&HealthModule> = modules.iter().collect();
        let mut crew = trainee();
        crew.start_training(&refs, "Station", 0.0, &settings).unwrap();
        crew.status = RosterStatus::Assigned;
        crew.train(3.0, &settings);
        assert!(crew.training_level(1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_training_speed_scales_time() {
        let settings = HealthSettings::default();
        let modules = modules();
        let refs: Vec<&HealthModule> = modules.iter().collect();
        let mut crew = trainee();
        crew.training_speed = 2.0;
        assert!((crew.training_time(&refs, &settings).unwrap() - 9.0).abs() < 1e-9);
        crew.training_speed = 0.0;
        assert!(crew.training_time(&refs, &settings).is_none());
    }
}
