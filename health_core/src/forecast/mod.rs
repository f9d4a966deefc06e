//! Closed-form HP forecasting
//!
//! Between events the HP of a crew member follows
//!
//! `dHP/dt = C + r·(max − HP)/100 − d·(HP − min)/100`
//!
//! where `C` is the sum of multiplied factor rates plus flat module HP, `r` is
//! total recuperation and `d` total decay. With `k = (r + d)/100 > 0` this
//! relaxes exponentially toward the balance HP; with `k = 0` it is a straight
//! line. Both cases are solved exactly, so a vessel that was unloaded for a
//! month is caught up in one step.

use serde::{Deserialize, Serialize};

/// Rates that stay constant over one forecast interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthModel {
    pub min_hp: f64,
    pub max_hp: f64,
    /// Additive HP/day (factors after multipliers, plus flat module HP)
    pub constant_rate: f64,
    /// %/day toward max HP
    pub recuperation: f64,
    /// %/day toward min HP
    pub decay: f64,
}

impl HealthModel {
    pub fn new(min_hp: f64, max_hp: f64) -> Self {
        HealthModel {
            min_hp,
            max_hp,
            constant_rate: 0.0,
            recuperation: 0.0,
            decay: 0.0,
        }
    }

    pub fn with_constant_rate(mut self, rate: f64) -> Self {
        self.constant_rate = rate;
        self
    }

    pub fn with_recuperation(mut self, recuperation: f64) -> Self {
        self.recuperation = recuperation;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Combined relaxation rate per day
    pub fn relaxation_rate(&self) -> f64 {
        (self.recuperation + self.decay) / 100.0
    }

    /// Instantaneous HP/day at the given HP
    pub fn change_per_day(&self, hp: f64) -> f64 {
        self.constant_rate + self.recuperation * (self.max_hp - hp) / 100.0
            - self.decay * (hp - self.min_hp) / 100.0
    }

    /// HP at which the change per day is zero; `None` for pure drift
    ///
    /// May lie outside `[min_hp, max_hp]`, in which case HP settles at the
    /// nearer bound.
    pub fn balance_hp(&self) -> Option<f64> {
        let k = self.relaxation_rate();
        if k <= 0.0 {
            return None;
        }
        Some(
            (self.constant_rate
                + self.recuperation * self.max_hp / 100.0
                + self.decay * self.min_hp / 100.0)
                / k,
        )
    }

    /// HP after `days`, starting at `hp0`, clamped to the HP bounds
    pub fn hp_at(&self, hp0: f64, days: f64) -> f64 {
        if days <= 0.0 {
            return hp0;
        }
        let hp = match self.balance_hp() {
            Some(target) => target + (hp0 - target) * (-self.relaxation_rate() * days).exp(),
            None => hp0 + self.constant_rate * days,
        };
        hp.clamp(self.min_hp, self.max_hp)
    }

    /// Days until HP reaches `threshold`, or `None` if it never does
    pub fn time_to(&self, hp0: f64, threshold: f64) -> Option<f64> {
        if threshold < self.min_hp || threshold > self.max_hp {
            return None;
        }
        if threshold == hp0 {
            return Some(0.0);
        }
        match self.balance_hp() {
            Some(target) => {
                let start_gap = hp0 - target;
                let end_gap = threshold - target;
                // The trajectory approaches target monotonically and never
                // crosses it, so the threshold must sit strictly between the two
                if start_gap == 0.0 || end_gap == 0.0 || start_gap.signum() != end_gap.signum() {
                    return None;
                }
                if end_gap.abs() >= start_gap.abs() {
                    return None;
                }
                Some(-(end_gap / start_gap).ln() / self.relaxation_rate())
            }
            None => {
                if self.constant_rate == 0.0 {
                    return None;
                }
                let days = (threshold - hp0) / self.constant_rate;
                (days > 0.0).then_some(days)
            }
        }
    }

    /// Reference fixed-step forward-Euler integration
    ///
    /// Converges to [`HealthModel::hp_at`] as `steps` grows.
    pub fn integrate_euler(&self, hp0: f64, days: f64, steps: u32) -> f64 {
        if steps == 0 || days <= 0.0 {
            return hp0;
        }
        let dt = days / steps as f64;
        let mut hp = hp0;
        for _ in 0..steps {
            hp = (hp + self.change_per_day(hp) * dt).clamp(self.min_hp, self.max_hp);
        }
        hp
    }
}
