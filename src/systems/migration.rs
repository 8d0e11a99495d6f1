use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Animals that decide to leave move to a random habitable neighbour.
///
/// Cells are visited in row-major order and a mover lands in its new cell
/// immediately; the `has_moved` flag keeps it from moving again when that cell
/// is visited later in the same year. Flags are cleared once every cell has
/// been visited. Animals on cells without habitable neighbours stay put.
pub struct MigrationSystem;

impl MigrationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MigrationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MigrationSystem {
    fn name(&self) -> &str {
        "migration"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let mut migrations = 0;
        for loc in world.locations() {
            let movers = match world.cell_mut(loc) {
                Some(cell) => cell.migrants(ctx.parameters, rng),
                None => continue,
            };
            migrations += world.disperse(loc, &movers, rng);
        }
        for cell in world.cells.values_mut() {
            cell.reset_moved();
        }
        world.ledger.migrations += migrations;
        Ok(())
    }
}
