//! Resource requests with partial fulfilment

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anything that can grant resource to health modules
///
/// Implementations may grant less than requested; the returned amount
/// must lie within `[0, amount]`.
pub trait ResourceProvider {
    fn request_resource(&mut self, resource: &str, amount: f64) -> f64;
}

/// Whether a module that asked for `requested` and got `granted` is starving
///
/// With the default ratio of 0.5 this is `granted * 2 < requested`.
pub fn is_starving(requested: f64, granted: f64, starvation_ratio: f64) -> bool {
    requested > 0.0 && granted < requested * starvation_ratio
}

/// Simple in-memory pool of named resources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    amounts: HashMap<String, f64>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to stock a resource
    pub fn with(mut self, resource: &str, amount: f64) -> Self {
        self.add(resource, amount);
        self
    }

    pub fn add(&mut self, resource: &str, amount: f64) {
        *self.amounts.entry(resource.to_string()).or_insert(0.0) += amount.max(0.0);
    }

    pub fn amount(&self, resource: &str) -> f64 {
        self.amounts.get(resource).copied().unwrap_or(0.0)
    }
}

impl ResourceProvider for ResourcePool {
    fn request_resource(&mut self, resource: &str, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let Some(available) = self.amounts.get_mut(resource) else {
            return 0.0;
        };
        let granted = amount.min(*available);
        *available -= granted;
        granted
    }
}
