use std::collections::BTreeMap;

use biosim::{
    animal::{AnimalSpec, Species},
    cell::FeedingOrder,
    engine::{EngineBuilder, EngineSettings, YearSummary},
    scenario::ScenarioLoader,
    world::{Placement, World},
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn herbivores(n: usize, age: u32, weight: f64) -> Vec<AnimalSpec> {
    (0..n)
        .map(|_| AnimalSpec {
            species: Species::Herbivore,
            age,
            weight: Some(weight),
        })
        .collect()
}

fn carnivores(n: usize, age: u32, weight: f64) -> Vec<AnimalSpec> {
    (0..n)
        .map(|_| AnimalSpec {
            species: Species::Carnivore,
            age,
            weight: Some(weight),
        })
        .collect()
}

fn snapshot(world: &World) -> Vec<((usize, usize), u64, Species, u32, u64)> {
    world
        .animals()
        .map(|(loc, animal)| {
            (
                loc,
                animal.id().raw(),
                animal.species(),
                animal.age(),
                animal.weight().to_bits(),
            )
        })
        .collect()
}

#[test]
fn scenario_fixture_loads() {
    let scenario = scenario_loader()
        .load("scenarios/small_island.yaml")
        .expect("scenario parses");
    assert_eq!(scenario.name, "small_island");
    let world = scenario.build_world().unwrap();
    assert_eq!(world.dimensions(), (6, 9));
    let animals: usize = scenario.population.iter().map(|p| p.animals.len()).sum();
    assert_eq!(animals, 19);
}

#[test]
fn runs_are_deterministic_for_a_seed() {
    let scenario = scenario_loader()
        .load("scenarios/small_island.yaml")
        .unwrap();

    let run = |seed: Option<u64>| {
        let mut world = scenario.build_world().unwrap();
        let mut engine = EngineBuilder::new(scenario.engine_settings(seed).unwrap())
            .with_annual_cycle()
            .build();
        engine.populate(&mut world, &scenario.population).unwrap();
        let mut summaries: Vec<YearSummary> = Vec::new();
        engine
            .run_with_hook(&mut world, 40, |summary| summaries.push(*summary))
            .unwrap();
        (summaries, snapshot(&world))
    };

    let (summaries_a, animals_a) = run(None);
    let (summaries_b, animals_b) = run(None);
    assert_eq!(summaries_a, summaries_b);
    assert_eq!(animals_a, animals_b);

    let (summaries_c, _) = run(Some(scenario.seed + 1));
    assert_ne!(summaries_a, summaries_c);
}

#[test]
fn lone_herbivore_gains_nine_kilos_per_feeding() {
    let mut world = World::from_map("WWW\nWLW\nWWW").unwrap();
    let updates = BTreeMap::from([("f_max".to_string(), 700.0)]);
    world
        .set_landscape_parameters(biosim::LandscapeKind::Lowland, &updates)
        .unwrap();
    world.spawn((2, 2), Species::Herbivore, 5, 20.0).unwrap();

    let mut engine = EngineBuilder::new(EngineSettings::new("feed", 1))
        .with_system(biosim::systems::FeedingSystem::new())
        .build();
    engine.step_year(&mut world).unwrap();

    let cell = world.cell((2, 2)).unwrap();
    assert_eq!(cell.animals()[0].weight(), 29.0);
    assert_eq!(cell.food().fodder(), 690.0);
}

#[test]
fn unfit_carnivores_never_kill() {
    let mut settings = EngineSettings::new("no_kill", 5);
    settings.feeding_order = FeedingOrder::Insertion;
    let mut engine = EngineBuilder::new(settings)
        .with_system(biosim::systems::FeedingSystem::new())
        .build();
    let params = engine.parameters().clone();

    let mut world = World::from_map("WWW\nWDW\nWWW").unwrap();
    let prey = world.spawn((2, 2), Species::Herbivore, 0, 60.0).unwrap();
    world.spawn((2, 2), Species::Carnivore, 60, 6.0).unwrap();
    let cell = world.cell((2, 2)).unwrap();
    let prey_fitness = cell.animals()[0].fitness(&params.herbivore);
    let hunter_fitness = cell.animals()[1].fitness(&params.carnivore);
    assert!(hunter_fitness < prey_fitness);

    for _ in 0..1000 {
        engine.step_year(&mut world).unwrap();
        let cell = world.cell((2, 2)).unwrap();
        assert!(cell.animals().iter().any(|animal| animal.id() == prey));
        assert_eq!(world.ledger().kills, 0);
    }
}

#[test]
fn death_phase_accounts_for_every_animal() {
    let mut world = World::from_map("WWWW\nWLLW\nWWWW").unwrap();
    let placements = vec![
        Placement {
            loc: (2, 2),
            animals: [herbivores(40, 30, 12.0), carnivores(10, 30, 0.5)].concat(),
        },
        Placement {
            loc: (2, 3),
            animals: herbivores(25, 45, 8.0),
        },
    ];
    let mut engine = EngineBuilder::new(EngineSettings::new("death", 17))
        .with_system(biosim::systems::DeathSystem::new())
        .build();
    engine.populate(&mut world, &placements).unwrap();
    let before = world.total_population();

    let summary = engine.step_year(&mut world).unwrap();
    assert!(summary.deaths > 0);
    assert_eq!(world.total_population(), before - summary.deaths);
}

#[test]
fn newborns_age_in_their_birth_year() {
    let mut world = World::from_map("WWW\nWLW\nWWW").unwrap();
    let placements = vec![Placement {
        loc: (2, 2),
        animals: herbivores(20, 5, 60.0),
    }];
    let mut settings = EngineSettings::new("newborns", 2);
    settings.parameters.herbivore.omega = 0.0;
    settings.parameters.herbivore.mu = 0.0;
    let mut engine = EngineBuilder::new(settings).with_annual_cycle().build();
    engine.populate(&mut world, &placements).unwrap();

    let summary = engine.step_year(&mut world).unwrap();
    assert!(summary.births > 0);
    assert_eq!(summary.herbivores, 20 + summary.births);
    let cell = world.cell((2, 2)).unwrap();
    assert!(cell.animals().iter().all(|animal| animal.age() >= 1));
    assert_eq!(
        cell.animals().iter().filter(|animal| animal.age() == 1).count(),
        summary.births
    );
}

#[test]
fn migrants_only_reach_habitable_neighbours() {
    let map = "WWWWW
               WLWDW
               WLLWW
               WWWWW";
    let mut world = World::from_map(map).unwrap();
    let placements = vec![Placement {
        loc: (2, 2),
        animals: herbivores(200, 2, 40.0),
    }];
    let mut settings = EngineSettings::new("migration", 8);
    settings.parameters.herbivore.mu = 1e6;
    let mut engine = EngineBuilder::new(settings)
        .with_system(biosim::systems::MigrationSystem::new())
        .build();
    engine.populate(&mut world, &placements).unwrap();

    let summary = engine.step_year(&mut world).unwrap();
    assert_eq!(summary.migrations, 200);
    assert!(world.cell((2, 2)).unwrap().is_empty());
    assert_eq!(world.cell((3, 2)).unwrap().len(), 200);
    assert!(world.cell((2, 4)).unwrap().is_empty());
    assert!(world.animals().all(|(_, animal)| !animal.has_moved()));
}

#[test]
fn predation_leaves_no_killed_prey_behind() {
    let mut world = World::from_map("WWW\nWLW\nWWW").unwrap();
    let placements = vec![Placement {
        loc: (2, 2),
        animals: [herbivores(50, 60, 3.0), carnivores(5, 4, 30.0)].concat(),
    }];
    let mut engine = EngineBuilder::new(EngineSettings::new("hunt", 4))
        .with_system(biosim::systems::FeedingSystem::new())
        .build();
    engine.populate(&mut world, &placements).unwrap();

    let summary = engine.step_year(&mut world).unwrap();
    assert!(summary.kills > 0);
    assert_eq!(summary.herbivores, 50 - summary.kills);
    assert_eq!(summary.carnivores, 5);
}
