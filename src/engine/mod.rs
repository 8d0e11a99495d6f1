use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    animal::{AnimalId, Species},
    cell::FeedingOrder,
    params::{ParamError, Parameters},
    rng::{RngManager, SystemRng},
    systems::{
        AgingSystem, DeathSystem, FeedingSystem, MigrationSystem, ProcreationSystem,
        WeightLossSystem,
    },
    world::{Placement, World},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub feeding_order: FeedingOrder,
    pub parameters: Parameters,
}

impl EngineSettings {
    pub fn new(scenario_name: impl Into<String>, seed: u64) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            seed,
            feeding_order: FeedingOrder::default(),
            parameters: Parameters::default(),
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// The six yearly phases in their required order.
    pub fn with_annual_cycle(self) -> Self {
        self.with_system(FeedingSystem::new())
            .with_system(ProcreationSystem::new())
            .with_system(MigrationSystem::new())
            .with_system(AgingSystem::new())
            .with_system(WeightLossSystem::new())
            .with_system(DeathSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            settings: self.settings,
        }
    }
}

/// Population counts and events of one completed year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: u64,
    pub herbivores: usize,
    pub carnivores: usize,
    pub births: usize,
    pub deaths: usize,
    pub kills: usize,
    pub migrations: usize,
}

impl YearSummary {
    pub fn from_world(world: &World) -> Self {
        let census = world.census();
        let ledger = world.ledger();
        Self {
            year: census.year,
            herbivores: census.herbivores,
            carnivores: census.carnivores,
            births: ledger.births,
            deaths: ledger.deaths,
            kills: ledger.kills,
            migrations: ledger.migrations,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn parameters(&self) -> &Parameters {
        &self.settings.parameters
    }

    pub fn set_animal_parameters(
        &mut self,
        species: Species,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParamError> {
        self.settings.parameters.update(species, updates)
    }

    /// Places the initial population; unspecified weights are drawn from the
    /// dedicated `population` stream.
    pub fn populate(&mut self, world: &mut World, placements: &[Placement]) -> Result<Vec<AnimalId>> {
        let mut rng = self.rng.stream("population");
        let added = world.populate(placements, &self.settings.parameters, &mut rng)?;
        debug!(animals = added.len(), "placed initial population");
        Ok(added)
    }

    pub fn step_year(&mut self, world: &mut World) -> Result<YearSummary> {
        world.reset_ledger();
        let year = world.year() + 1;
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            let ctx = SystemContext {
                year,
                parameters: &self.settings.parameters,
                feeding_order: self.settings.feeding_order,
            };
            system.run(&ctx, world, &mut rng_stream)?;
        }
        world.advance_year();

        let summary = YearSummary::from_world(world);
        debug!(
            year = summary.year,
            herbivores = summary.herbivores,
            carnivores = summary.carnivores,
            births = summary.births,
            deaths = summary.deaths,
            kills = summary.kills,
            "year complete"
        );
        Ok(summary)
    }

    pub fn run(&mut self, world: &mut World, years: u64) -> Result<()> {
        self.run_with_hook(world, years, |_| {})
    }

    pub fn run_with_hook(
        &mut self,
        world: &mut World,
        years: u64,
        mut hook: impl FnMut(&YearSummary),
    ) -> Result<()> {
        info!(
            scenario = %self.settings.scenario_name,
            seed = self.rng.seed(),
            years,
            animals = world.total_population(),
            "starting simulation"
        );
        for _ in 0..years {
            let summary = self.step_year(world)?;
            hook(&summary);
        }
        let census = world.census();
        info!(
            year = census.year,
            herbivores = census.herbivores,
            carnivores = census.carnivores,
            "simulation finished"
        );
        Ok(())
    }
}

pub struct SystemContext<'a> {
    pub year: u64,
    pub parameters: &'a Parameters,
    pub feeding_order: FeedingOrder,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
