//! HealthSimulation - Drives every tracked crew member through time

mod tick;

pub use tick::{advance_crew, CrewTick, TickResult};

use crate::config::HealthSettings;
use crate::effect::HealthEffect;
use crate::factor::{CrewContext, FactorRegistry};
use crate::resource::ResourceProvider;
use crate::roster::Roster;
use crate::types::{CrewId, EvaluationMode, RosterStatus};
use crate::vessel::Vessel;
use tracing::{debug, info};

/// Owns the roster and the vessels they fly in
#[derive(Debug, Clone)]
pub struct HealthSimulation {
    pub settings: HealthSettings,
    pub factors: FactorRegistry,
    pub roster: Roster,
    vessels: Vec<Vessel>,
    last_time: Option<f64>,
}

impl HealthSimulation {
    pub fn new(settings: HealthSettings) -> Self {
        HealthSimulation {
            settings,
            factors: FactorRegistry::with_defaults(),
            roster: Roster::new(),
            vessels: Vec::new(),
            last_time: None,
        }
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    /// Add a vessel, replacing any with the same id
    pub fn add_vessel(&mut self, vessel: Vessel) {
        match self.vessels.iter_mut().find(|v| v.id == vessel.id) {
            Some(existing) => *existing = vessel,
            None => self.vessels.push(vessel),
        }
    }

    pub fn remove_vessel(&mut self, id: u32) -> Option<Vessel> {
        let index = self.vessels.iter().position(|v| v.id == id)?;
        Some(self.vessels.remove(index))
    }

    pub fn vessel(&self, id: u32) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.id == id)
    }

    pub fn vessel_mut(&mut self, id: u32) -> Option<&mut Vessel> {
        self.vessels.iter_mut().find(|v| v.id == id)
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    /// The vessel a crew member is aboard
    pub fn vessel_of(&self, crew: &CrewId) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.contains(crew))
    }

    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }

    /// Health effect on a crew member where they are now
    pub fn effect_for(&self, crew: &CrewId) -> HealthEffect {
        match self.vessel_of(crew) {
            Some(vessel) => {
                let part = vessel.part_of(crew).map(|p| p.id);
                HealthEffect::for_crew(vessel, part, EvaluationMode::Live)
            }
            None => HealthEffect::at_home(&self.settings),
        }
    }

    /// Advance the simulation to universal time `now`
    ///
    /// Crew health runs under the module states left by the previous tick;
    /// resource draws happen afterwards and only gate modules from the next
    /// tick on. The first call just records the starting time.
    pub fn tick(&mut self, now: f64, provider: &mut impl ResourceProvider) -> TickResult {
        let Some(last) = self.last_time else {
            self.last_time = Some(now);
            if self.settings.general.mod_enabled {
                self.update_modules(now, provider);
            }
            return TickResult {
                now,
                ..Default::default()
            };
        };
        if now <= last {
            return TickResult {
                now,
                ..Default::default()
            };
        }

        let mut result = TickResult {
            now,
            days: (now - last) / self.settings.general.day_length,
            ..Default::default()
        };
        if self.settings.general.mod_enabled {
            self.sync_statuses();
            let HealthSimulation {
                settings,
                factors,
                roster,
                vessels,
                ..
            } = self;
            for crew in roster.iter_mut() {
                if matches!(crew.status, RosterStatus::Dead | RosterStatus::Missing) {
                    continue;
                }
                let vessel = vessels.iter().find(|v| v.contains(&crew.id));
                let effect = match vessel {
                    Some(vessel) => {
                        let part = vessel.part_of(&crew.id).map(|p| p.id);
                        HealthEffect::for_crew(vessel, part, EvaluationMode::Live)
                    }
                    None => HealthEffect::at_home(settings),
                };
                let ctx = CrewContext::live(vessel);
                result
                    .crew
                    .push(advance_crew(crew, &ctx, &effect, factors, settings, last, now));
            }
            result.starving_modules = self.update_modules(now, provider);
        }

        self.last_time = Some(now);
        debug!("Tick to {:.0}: {:.3} days for {} crew.", now, result.days, result.crew.len());
        result
    }

    /// Keep roster statuses in line with who sits in which vessel
    ///
    /// Boarding a vessel ends training at the home base.
    fn sync_statuses(&mut self) {
        let HealthSimulation { roster, vessels, .. } = self;
        for crew in roster.iter_mut() {
            let aboard = vessels.iter().any(|v| v.contains(&crew.id));
            let status = match (crew.status, aboard) {
                (RosterStatus::Available, true) => RosterStatus::Assigned,
                (RosterStatus::Assigned, false) => RosterStatus::Available,
                (status, _) => status,
            };
            if status != crew.status {
                debug!("{} is now {:?}.", crew.name, status);
                crew.status = status;
                crew.set_dirty();
            }
            if crew.status == RosterStatus::Assigned && crew.training_vessel.is_some() {
                info!("{} boarded a vessel and stopped training.", crew.name);
                crew.stop_training();
            }
        }
    }

    /// Let every module draw its resource for the elapsed time
    fn update_modules(&mut self, now: f64, provider: &mut impl ResourceProvider) -> Vec<u32> {
        let ratio = self.settings.resources.starvation_ratio;
        let mut starving = Vec::new();
        for vessel in &mut self.vessels {
            let vessel_crew = vessel.crew_count();
            for part in &mut vessel.parts {
                let part_crew = part.crew.len();
                for module in &mut part.modules {
                    let affected = module.affected_crew(part_crew, vessel_crew);
                    module.fixed_update(now, affected, provider, ratio);
                    if module.starving {
                        starving.push(module.id);
                    }
                }
            }
        }
        starving
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::CrewHealthState;
    use crate::module::{HealthModule, ModuleConfiguration};
    use crate::resource::ResourcePool;
    use crate::types::ConditionKind;
    use crate::vessel::{CelestialBody, Part};
    use std::sync::Arc;

    fn settings() -> HealthSettings {
        let mut settings = HealthSettings::default();
        settings.general.day_length = 100.0;
        settings
    }

    fn hire(sim: &mut HealthSimulation, id: &str) {
        let state = CrewHealthState::new(id.into(), id, 0, &sim.settings);
        sim.roster.hire(state).unwrap();
    }

    #[test]
    fn test_first_tick_only_records_time() {
        let mut sim = HealthSimulation::new(settings());
        hire(&mut sim, "Jeb");
        let result = sim.tick(50.0, &mut ResourcePool::new());
        assert!(result.crew.is_empty());
        assert_eq!(sim.last_time(), Some(50.0));
    }

    #[test]
    fn test_lonely_pilot_loses_hp() {
        let mut sim = HealthSimulation::new(settings());
        hire(&mut sim, "Val");
        sim.add_vessel(
            Vessel::new(1, "Probe")
                .at(CelestialBody::foreign("Mun", 5000.0), 30000.0)
                .with_part(Part::new(1, "pod").with_crew("Val")),
        );
        let mut pool = ResourcePool::new();
        sim.tick(0.0, &mut pool);
        let result = sim.tick(200.0, &mut pool);

        assert!((result.days - 2.0).abs() < f64::EPSILON);
        let val = sim.roster.get(&"Val".into()).unwrap();
        assert_eq!(val.status, RosterStatus::Assigned);
        assert!((val.hp() - 100.0 - 2.0 * sim.settings.factors.loneliness).abs() < 1e-9);
    }

    #[test]
    fn test_crew_at_home_recuperates() {
        let mut sim = HealthSimulation::new(settings());
        hire(&mut sim, "Bob");
        sim.roster.get_mut(&"Bob".into()).unwrap().set_hp(50.0);
        let mut pool = ResourcePool::new();
        sim.tick(0.0, &mut pool);
        sim.tick(1000.0, &mut pool);

        let bob = sim.roster.get(&"Bob".into()).unwrap();
        let expected = 100.0 - 50.0 * (-0.1f64 * 10.0).exp();
        assert!((bob.hp() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_boarding_stops_training() {
        let mut sim = HealthSimulation::new(settings());
        hire(&mut sim, "Bill");
        let config = Arc::new(ModuleConfiguration {
            recuperation: 1.0,
            resource_consumption: 1.0,
            ..Default::default()
        });
        let vessel = Vessel::new(1, "Station")
            .with_part(Part::new(1, "hab").with_module(HealthModule::new(9, config).with_complexity(1.0)));
        sim.roster
            .start_training(&"Bill".into(), &vessel, 0.0, &sim.settings)
            .unwrap();
        sim.add_vessel(vessel);
        let mut pool = ResourcePool::new();
        sim.tick(0.0, &mut pool);
        sim.tick(100.0, &mut pool);
        let bill = sim.roster.get(&"Bill".into()).unwrap();
        assert!((bill.training_level(9) - 0.1).abs() < 1e-9);

        sim.vessel_mut(1).unwrap().parts[0].crew.push("Bill".into());
        sim.tick(200.0, &mut pool);
        let bill = sim.roster.get(&"Bill".into()).unwrap();
        assert!(!bill.has_condition(ConditionKind::Training));
        assert!((bill.training_level(9) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_starvation_lags_one_tick() {
        let mut sim = HealthSimulation::new(settings());
        hire(&mut sim, "Jeb");
        hire(&mut sim, "Bill");
        let med_bay = Arc::new(ModuleConfiguration {
            hp_change_per_day: 1.0,
            resource_consumption: 1.0,
            ..Default::default()
        });
        sim.add_vessel(
            Vessel::new(1, "Station")
                .at(CelestialBody::foreign("Minmus", 4000.0), 50000.0)
                .with_part(
                    Part::new(1, "hab")
                        .with_crew("Jeb")
                        .with_crew("Bill")
                        .with_module(HealthModule::new(3, med_bay)),
                ),
        );
        // Enough power for the first 100 seconds only
        let mut pool = ResourcePool::new().with("ElectricCharge", 100.0);
        sim.tick(0.0, &mut pool);
        sim.tick(100.0, &mut pool);
        let result = sim.tick(200.0, &mut pool);
        // Powered during the second tick, the draw that failed only counts from the next one
        assert!((sim.roster.get(&"Jeb".into()).unwrap().hp() - 100.0).abs() < 1e-9);
        assert_eq!(result.starving_modules, vec![3]);

        sim.roster.get_mut(&"Jeb".into()).unwrap().set_hp(50.0);
        sim.tick(300.0, &mut pool);
        assert!((sim.roster.get(&"Jeb".into()).unwrap().hp() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_simulation_leaves_hp() {
        let mut settings = settings();
        settings.general.mod_enabled = false;
        let mut sim = HealthSimulation::new(settings);
        hire(&mut sim, "Bob");
        sim.roster.get_mut(&"Bob".into()).unwrap().set_hp(40.0);
        let mut pool = ResourcePool::new();
        sim.tick(0.0, &mut pool);
        sim.tick(1000.0, &mut pool);
        assert!((sim.roster.get(&"Bob".into()).unwrap().hp() - 40.0).abs() < f64::EPSILON);
        assert_eq!(sim.last_time(), Some(1000.0));
    }

    #[test]
    fn test_disabled_simulation_draws_no_resource() {
        let mut settings = settings();
        settings.general.mod_enabled = false;
        let mut sim = HealthSimulation::new(settings);
        let lamp = Arc::new(ModuleConfiguration {
            recuperation: 1.0,
            resource_consumption: 1.0,
            ..Default::default()
        });
        sim.add_vessel(
            Vessel::new(1, "Station").with_part(Part::new(1, "hab").with_module(HealthModule::new(4, lamp))),
        );
        let mut pool = ResourcePool::new().with("ElectricCharge", 50.0);
        sim.tick(0.0, &mut pool);
        let result = sim.tick(500.0, &mut pool);

        assert!(result.starving_modules.is_empty());
        assert!((pool.amount("ElectricCharge") - 50.0).abs() < f64::EPSILON);
        assert!(!sim.vessel(1).unwrap().parts[0].modules[0].starving);
    }
}
