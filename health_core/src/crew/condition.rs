//! Condition - A status flag carried by a crew member

use crate::types::ConditionKind;
use serde::{Deserialize, Serialize};

/// An active condition with its timing data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    /// Universal time the condition was (last) applied
    pub since: f64,
    /// Universal time the condition wears off, if it does on its own
    pub expires_at: Option<f64>,
}

impl Condition {
    pub fn new(kind: ConditionKind, since: f64, expires_at: Option<f64>) -> Self {
        Condition {
            kind,
            since,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }

    /// Re-apply the condition, restarting its timer
    pub fn refresh(&mut self, since: f64, expires_at: Option<f64>) {
        self.since = since;
        self.expires_at = expires_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let condition = Condition::new(ConditionKind::Sick, 0.0, Some(100.0));
        assert!(!condition.is_expired(99.0));
        assert!(condition.is_expired(100.0));

        let permanent = Condition::new(ConditionKind::Training, 0.0, None);
        assert!(!permanent.is_expired(f64::MAX));
    }

    #[test]
    fn test_refresh() {
        let mut condition = Condition::new(ConditionKind::Sick, 0.0, Some(100.0));
        condition.refresh(50.0, Some(300.0));
        assert!(!condition.is_expired(200.0));
        assert!((condition.since - 50.0).abs() < f64::EPSILON);
    }
}
