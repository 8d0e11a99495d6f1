//! Species and landscape parameter sets.
//!
//! Every agent of a species reads the same [`SpeciesParams`]; the engine owns
//! one [`Parameters`] registry and passes it to each phase explicitly. Updates
//! are validated in full before anything is written, so a rejected update
//! leaves the previous values untouched.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::{animal::Species, cell::LandscapeKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("invalid parameter key '{0}'")]
    InvalidKey(String),
    #[error("invalid value {value} for parameter '{key}': values must be finite and non-negative")]
    InvalidValue { key: String, value: f64 },
    #[error("food capacity of {0:?} cells cannot be changed")]
    FixedLandscape(LandscapeKind),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesParams {
    pub w_birth: f64,
    pub sigma_birth: f64,
    pub beta: f64,
    pub eta: f64,
    pub a_half: f64,
    pub phi_age: f64,
    pub w_half: f64,
    pub phi_weight: f64,
    pub mu: f64,
    pub gamma: f64,
    pub zeta: f64,
    pub xi: f64,
    pub omega: f64,
    #[serde(rename = "F")]
    pub appetite: f64,
    /// Only carnivores hunt, so only they carry a kill-probability cap.
    #[serde(rename = "DeltaPhiMax", skip_serializing_if = "Option::is_none")]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            appetite: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            appetite: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    pub fn defaults(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// Applies `updates` all-or-nothing.
    ///
    /// Unknown keys are reported before bad values, matching the order in
    /// which a caller would fix a broken configuration.
    pub fn update(&mut self, updates: &BTreeMap<String, f64>) -> Result<(), ParamError> {
        let mut next = self.clone();
        for key in updates.keys() {
            if next.slot_mut(key).is_none() {
                return Err(ParamError::InvalidKey(key.clone()));
            }
        }
        for (key, &value) in updates {
            validate_value(key, value)?;
            if let Some(slot) = next.slot_mut(key) {
                *slot = value;
            }
        }
        *self = next;
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
        match key {
            "w_birth" => Some(&mut self.w_birth),
            "sigma_birth" => Some(&mut self.sigma_birth),
            "beta" => Some(&mut self.beta),
            "eta" => Some(&mut self.eta),
            "a_half" => Some(&mut self.a_half),
            "phi_age" => Some(&mut self.phi_age),
            "w_half" => Some(&mut self.w_half),
            "phi_weight" => Some(&mut self.phi_weight),
            "mu" => Some(&mut self.mu),
            "gamma" => Some(&mut self.gamma),
            "zeta" => Some(&mut self.zeta),
            "xi" => Some(&mut self.xi),
            "omega" => Some(&mut self.omega),
            "F" => Some(&mut self.appetite),
            "DeltaPhiMax" => self.delta_phi_max.as_mut(),
            _ => None,
        }
    }
}

fn validate_value(key: &str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParamError::InvalidValue {
            key: key.to_string(),
            value,
        })
    }
}

/// Per-species registry handed to every phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
}

impl Parameters {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn update(
        &mut self,
        species: Species,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParamError> {
        match species {
            Species::Herbivore => self.herbivore.update(updates),
            Species::Carnivore => self.carnivore.update(updates),
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
        }
    }
}

/// Yearly food capacity of each landscape kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandscapeParams {
    pub lowland_f_max: f64,
    pub highland_f_max: f64,
}

impl LandscapeParams {
    pub fn f_max(&self, kind: LandscapeKind) -> f64 {
        match kind {
            LandscapeKind::Lowland => self.lowland_f_max,
            LandscapeKind::Highland => self.highland_f_max,
            LandscapeKind::Desert | LandscapeKind::Water => 0.0,
        }
    }

    pub fn update(
        &mut self,
        kind: LandscapeKind,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParamError> {
        let slot = match kind {
            LandscapeKind::Lowland => &mut self.lowland_f_max,
            LandscapeKind::Highland => &mut self.highland_f_max,
            LandscapeKind::Desert | LandscapeKind::Water => {
                return Err(ParamError::FixedLandscape(kind))
            }
        };
        if let Some(key) = updates.keys().find(|key| key.as_str() != "f_max") {
            return Err(ParamError::InvalidKey(key.clone()));
        }
        if let Some(&value) = updates.get("f_max") {
            validate_value("f_max", value)?;
            *slot = value;
        }
        Ok(())
    }
}

impl Default for LandscapeParams {
    fn default() -> Self {
        Self {
            lowland_f_max: 800.0,
            highland_f_max: 300.0,
        }
    }
}
