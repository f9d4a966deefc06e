//! Radiation shielding

/// Share of radiation that passes `shielding` halving-thicknesses
pub fn exposure(shielding: f64) -> f64 {
    2f64.powf(-shielding)
}
