use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

pub struct WeightLossSystem;

impl WeightLossSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WeightLossSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for WeightLossSystem {
    fn name(&self) -> &str {
        "weight_loss"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for cell in world.cells.values_mut() {
            cell.lose_weight(ctx.parameters);
        }
        Ok(())
    }
}
