pub mod animal;
pub mod cell;
pub mod engine;
pub mod fitness;
pub mod params;
pub mod rng;
pub mod scenario;
pub mod systems;
pub mod world;

pub use animal::{Animal, AnimalId, AnimalSpec, Species};
pub use cell::{Cell, FeedingOrder, FoodPatch, LandscapeKind};
pub use engine::{Engine, EngineBuilder, EngineSettings, YearSummary};
pub use params::{ParamError, Parameters, SpeciesParams};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{Location, Placement, World, WorldError};
