use anyhow::Result;
use tracing::trace;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

pub struct FeedingSystem;

impl FeedingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FeedingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for FeedingSystem {
    fn name(&self) -> &str {
        "feeding"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let mut kills = 0;
        for (loc, cell) in world.cells.iter_mut() {
            let report = cell.feed(ctx.parameters, ctx.feeding_order, rng);
            if !report.killed.is_empty() {
                trace!(
                    year = ctx.year,
                    row = loc.0,
                    col = loc.1,
                    kills = report.killed.len(),
                    fodder_eaten = report.fodder_eaten,
                    "cell fed"
                );
            }
            kills += report.killed.len();
        }
        world.ledger.kills += kills;
        Ok(())
    }
}
