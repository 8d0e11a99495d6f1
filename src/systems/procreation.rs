use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

pub struct ProcreationSystem;

impl ProcreationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcreationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProcreationSystem {
    fn name(&self) -> &str {
        "procreation"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let ids = &mut world.ids;
        let births: usize = world
            .cells
            .values_mut()
            .map(|cell| cell.procreate(ctx.parameters, ids, rng))
            .sum();
        world.ledger.births += births;
        Ok(())
    }
}
