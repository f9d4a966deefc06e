//! Home factor

use super::CrewContext;
use crate::crew::CrewHealthState;
use crate::types::RosterStatus;
use tracing::{debug, error};

/// Base rate while the crew member's vessel sits low over the home world
///
/// In an estimate there is no vessel yet, so the user's toggle decides.
pub(super) fn change_per_day(
    base: f64,
    crew: &CrewHealthState,
    ctx: &CrewContext<'_>,
    enabled_in_estimate: bool,
) -> f64 {
    if ctx.mode.is_estimate() {
        return if enabled_in_estimate { base } else { 0.0 };
    }
    if crew.status != RosterStatus::Assigned {
        debug!("Home factor is off when {} is not assigned.", crew.name);
        return 0.0;
    }
    let Some(location) = ctx.vessel.and_then(|v| v.location.as_ref()) else {
        error!("Could not find main body for {}.", crew.name);
        return 0.0;
    };
    if location.body.is_home && location.altitude < location.body.flying_altitude_threshold {
        debug!("Home factor is on for {}.", crew.name);
        return base;
    }
    debug!(
        "Home factor is off for {}. Main body: {}; altitude: {:.0}.",
        crew.name, location.body.name, location.altitude
    );
    0.0
}

#[cfg(test)]
mod tests {
    use crate::config::HealthSettings;
    use crate::crew::CrewHealthState;
    use crate::factor::{CrewContext, Factor};
    use crate::types::{EstimateOptions, EvaluationMode, RosterStatus};
    use crate::vessel::{CelestialBody, Part, Vessel};

    fn assigned() -> CrewHealthState {
        let settings = HealthSettings::default();
        let mut crew = CrewHealthState::new("Jeb".into(), "Jebediah", 0, &settings);
        crew.status = RosterStatus::Assigned;
        crew
    }

    fn vessel_at(body: CelestialBody, altitude: f64) -> Vessel {
        Vessel::new(1, "Lander")
            .at(body, altitude)
            .with_part(Part::new(1, "pod").with_crew("Jeb"))
    }

    #[test]
    fn test_home_low_altitude() {
        let settings = HealthSettings::default();
        let vessel = vessel_at(CelestialBody::home("Kerbin", 18000.0), 500.0);
        let ctx = CrewContext::live(Some(&vessel));
        let rate = Factor::Home.change_per_day(&assigned(), &ctx, false, &settings);
        assert!((rate - settings.factors.home).abs() < f64::EPSILON);
    }

    #[test]
    fn test_home_too_high_or_away() {
        let settings = HealthSettings::default();
        let high = vessel_at(CelestialBody::home("Kerbin", 18000.0), 80000.0);
        let away = vessel_at(CelestialBody::foreign("Mun", 5000.0), 100.0);
        for vessel in [&high, &away] {
            let ctx = CrewContext::live(Some(vessel));
            assert!(Factor::Home.change_per_day(&assigned(), &ctx, true, &settings).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_home_without_location_is_zero() {
        let settings = HealthSettings::default();
        let vessel = Vessel::new(1, "Lost").with_part(Part::new(1, "pod").with_crew("Jeb"));
        assert!(Factor::Home
            .change_per_day(&assigned(), &CrewContext::live(Some(&vessel)), true, &settings)
            .abs()
            < f64::EPSILON);
        assert!(Factor::Home
            .change_per_day(&assigned(), &CrewContext::live(None), true, &settings)
            .abs()
            < f64::EPSILON);
    }

    #[test]
    fn test_home_estimate_uses_toggle() {
        let settings = HealthSettings::default();
        let design = Vessel::new(1, "Design").with_part(Part::new(1, "pod").with_crew("Jeb"));
        let ctx = CrewContext::estimate(EvaluationMode::Estimate(EstimateOptions::default()), &design);
        let crew = CrewHealthState::new("Jeb".into(), "Jebediah", 0, &settings);
        assert!(Factor::Home.change_per_day(&crew, &ctx, false, &settings).abs() < f64::EPSILON);
        assert!((Factor::Home.change_per_day(&crew, &ctx, true, &settings) - settings.factors.home).abs() < f64::EPSILON);
    }
}
