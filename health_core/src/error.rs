//! Errors raised by commands against the roster

use crate::types::CrewId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HealthError {
    #[error("Crew member {0} is not tracked")]
    UnknownCrew(CrewId),
    #[error("Crew member {0} is already tracked")]
    DuplicateCrew(CrewId),
    #[error("{name} can't train: {reason}")]
    CannotTrain { name: String, reason: String },
    #[error("{0} has nothing left to train on this vessel")]
    NothingToTrain(String),
}
