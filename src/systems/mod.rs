//! The six yearly phases. `EngineBuilder::with_annual_cycle` installs them in
//! the order below; each one visits every habitable cell in row-major order.

mod aging;
mod death;
mod feeding;
mod migration;
mod procreation;
mod weight_loss;

pub use aging::AgingSystem;
pub use death::DeathSystem;
pub use feeding::FeedingSystem;
pub use migration::MigrationSystem;
pub use procreation::ProcreationSystem;
pub use weight_loss::WeightLossSystem;
