//! Condition score shared by every behavioural rule.

use crate::params::SpeciesParams;

/// Logistic factor `1 / (1 + e^(sign * phi * (x - x_half)))`.
///
/// Overflowing exponentials saturate: `e^x -> inf` gives 0, `e^x -> 0` gives 1.
pub fn logistic(sign: f64, x: f64, x_half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (sign * phi * (x - x_half)).exp())
}

/// Fitness in `[0, 1]`; falls with age and rises with weight.
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    let age_factor = logistic(1.0, f64::from(age), params.a_half, params.phi_age);
    let weight_factor = logistic(-1.0, weight, params.w_half, params.phi_weight);
    (age_factor * weight_factor).clamp(0.0, 1.0)
}
