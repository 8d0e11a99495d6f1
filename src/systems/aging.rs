use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

pub struct AgingSystem;

impl AgingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AgingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AgingSystem {
    fn name(&self) -> &str {
        "aging"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for cell in world.cells.values_mut() {
            cell.grow_older();
        }
        Ok(())
    }
}
