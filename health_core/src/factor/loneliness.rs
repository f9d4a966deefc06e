//! Loneliness factor

use super::CrewContext;
use crate::crew::CrewHealthState;
use crate::types::{EvaluationMode, RosterStatus};
use tracing::error;

/// Base rate while nobody else is aboard, unless the crew member is a veteran
pub(super) fn change_per_day(
    base: f64,
    crew: &CrewHealthState,
    ctx: &CrewContext<'_>,
    enabled_in_estimate: bool,
) -> f64 {
    match ctx.mode {
        EvaluationMode::Estimate(_) if !enabled_in_estimate => return 0.0,
        EvaluationMode::Estimate(_) => {}
        EvaluationMode::Live => {
            // Crew at the home base are never alone
            if crew.status != RosterStatus::Assigned {
                return 0.0;
            }
            if ctx.vessel.is_none() {
                error!("Could not find the vessel of {}.", crew.name);
                return 0.0;
            }
        }
    }
    if ctx.crew_count <= 1 && !crew.veteran {
        base
    } else {
        0.0
    }
}
