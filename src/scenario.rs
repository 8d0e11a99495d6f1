use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    animal::Species,
    cell::{FeedingOrder, LandscapeKind},
    engine::EngineSettings,
    params::{LandscapeParams, Parameters},
    world::{Placement, World},
};

fn default_years() -> u64 {
    50
}

fn default_map() -> String {
    "WWW\nWLW\nWWW".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_years")]
    pub years: u64,
    #[serde(default)]
    pub feeding_order: FeedingOrder,
    #[serde(default = "default_map")]
    pub map: String,
    /// Landscape overrides keyed by kind (`L`/`Lowland`, `H`/`Highland`).
    #[serde(default)]
    pub landscape: BTreeMap<LandscapeKind, BTreeMap<String, f64>>,
    /// Species parameter overrides keyed by `Herbivore`/`Carnivore`.
    #[serde(default)]
    pub parameters: BTreeMap<Species, BTreeMap<String, f64>>,
    #[serde(default)]
    pub population: Vec<Placement>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Scenario::from_yaml(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        Ok(scenario)
    }

    pub fn build_world(&self) -> Result<World> {
        let mut landscape = LandscapeParams::default();
        for (kind, updates) in &self.landscape {
            landscape
                .update(*kind, updates)
                .with_context(|| format!("Invalid landscape parameters for {kind:?}"))?;
        }
        let world = World::with_landscape(&self.map, landscape)
            .with_context(|| format!("Invalid island map in scenario '{}'", self.name))?;
        Ok(world)
    }

    pub fn parameters(&self) -> Result<Parameters> {
        let mut parameters = Parameters::default();
        for (species, updates) in &self.parameters {
            parameters
                .update(*species, updates)
                .with_context(|| format!("Invalid parameters for {species:?}"))?;
        }
        Ok(parameters)
    }

    pub fn engine_settings(&self, seed_override: Option<u64>) -> Result<EngineSettings> {
        Ok(EngineSettings {
            scenario_name: self.name.clone(),
            seed: seed_override.unwrap_or(self.seed),
            feeding_order: self.feeding_order,
            parameters: self.parameters()?,
        })
    }

    pub fn years(&self, override_years: Option<u64>) -> u64 {
        override_years.unwrap_or(self.years)
    }
}
