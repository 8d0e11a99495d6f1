use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

pub struct DeathSystem;

impl DeathSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeathSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DeathSystem {
    fn name(&self) -> &str {
        "death"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let deaths: usize = world
            .cells
            .values_mut()
            .map(|cell| cell.cull(ctx.parameters, rng).len())
            .sum();
        world.ledger.deaths += deaths;
        Ok(())
    }
}
