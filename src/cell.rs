//! Habitat cells: a yearly replenished food patch plus the animals living on it.
//!
//! The per-cell phase operations live here; `systems` applies them to every
//! cell of the island in the fixed yearly order.

use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    animal::{Animal, AnimalId, Diet, IdAllocator, Prey, Species},
    params::Parameters,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LandscapeKind {
    #[serde(alias = "W")]
    Water,
    #[serde(alias = "L")]
    Lowland,
    #[serde(alias = "H")]
    Highland,
    #[serde(alias = "D")]
    Desert,
}

impl LandscapeKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(LandscapeKind::Water),
            'L' => Some(LandscapeKind::Lowland),
            'H' => Some(LandscapeKind::Highland),
            'D' => Some(LandscapeKind::Desert),
            _ => None,
        }
    }

    pub fn is_habitable(self) -> bool {
        self != LandscapeKind::Water
    }
}

/// Order in which animals of a cell take their turn at the food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedingOrder {
    #[default]
    Shuffled,
    Insertion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoodPatch {
    f_max: f64,
    fodder: f64,
}

impl FoodPatch {
    pub fn new(f_max: f64) -> Self {
        let f_max = f_max.max(0.0);
        Self {
            f_max,
            fodder: f_max,
        }
    }

    pub fn f_max(&self) -> f64 {
        self.f_max
    }

    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    pub fn set_f_max(&mut self, f_max: f64) {
        self.f_max = f_max.max(0.0);
        self.fodder = self.fodder.min(self.f_max);
    }

    pub fn replenish(&mut self) {
        self.fodder = self.f_max;
    }

    /// Removes up to `amount` fodder and returns how much was actually taken.
    pub fn take(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || self.fodder <= 0.0 {
            0.0
        } else if self.fodder >= amount {
            self.fodder -= amount;
            amount
        } else {
            let rest = self.fodder;
            self.fodder = 0.0;
            rest
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedingReport {
    pub fodder_eaten: f64,
    pub killed: Vec<Animal>,
}

#[derive(Debug, Clone)]
pub struct Cell {
    kind: LandscapeKind,
    food: FoodPatch,
    animals: Vec<Animal>,
}

impl Cell {
    pub fn new(kind: LandscapeKind, f_max: f64) -> Self {
        Self {
            kind,
            food: FoodPatch::new(f_max),
            animals: Vec::new(),
        }
    }

    pub fn kind(&self) -> LandscapeKind {
        self.kind
    }

    pub fn food(&self) -> &FoodPatch {
        &self.food
    }

    pub fn food_mut(&mut self) -> &mut FoodPatch {
        &mut self.food
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn add(&mut self, animal: Animal) {
        self.animals.push(animal);
    }

    /// Removes every animal whose id is listed and returns them in container order.
    pub fn remove(&mut self, ids: &[AnimalId]) -> Vec<Animal> {
        if ids.is_empty() {
            return Vec::new();
        }
        let doomed: HashSet<AnimalId> = ids.iter().copied().collect();
        let (removed, kept): (Vec<Animal>, Vec<Animal>) = std::mem::take(&mut self.animals)
            .into_iter()
            .partition(|animal| doomed.contains(&animal.id()));
        self.animals = kept;
        removed
    }

    pub fn of_species(&self, species: Species) -> impl Iterator<Item = &Animal> + '_ {
        self.animals
            .iter()
            .filter(move |animal| animal.species() == species)
    }

    pub fn herbivores(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.of_species(Species::Herbivore)
    }

    pub fn carnivores(&self) -> impl Iterator<Item = &Animal> + '_ {
        self.of_species(Species::Carnivore)
    }

    pub fn count(&self, species: Species) -> usize {
        self.of_species(species).count()
    }

    /// Herbivores as prey, weakest first. Ties keep container order.
    pub fn prey_by_fitness(&self, params: &Parameters) -> Vec<Prey> {
        let mut prey: Vec<Prey> = self
            .animals
            .iter()
            .filter(|animal| animal.species().diet() == Diet::Fodder)
            .map(|animal| Prey {
                id: animal.id(),
                fitness: animal.fitness(params.species(animal.species())),
                weight: animal.weight(),
            })
            .collect();
        prey.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        prey
    }

    /// Feeding phase: replenish, graze, then hunt.
    pub fn feed<R: Rng>(
        &mut self,
        params: &Parameters,
        order: FeedingOrder,
        rng: &mut R,
    ) -> FeedingReport {
        self.food.replenish();
        if order == FeedingOrder::Shuffled {
            self.animals.shuffle(rng);
        }

        let mut fodder_eaten = 0.0;
        for grazer in self
            .animals
            .iter_mut()
            .filter(|animal| animal.species().diet() == Diet::Fodder)
        {
            if self.food.fodder() <= 0.0 {
                break;
            }
            let before = self.food.fodder();
            grazer.graze(&mut self.food, params.species(grazer.species()));
            fodder_eaten += before - self.food.fodder();
        }

        let mut prey = self.prey_by_fitness(params);
        let mut killed = Vec::new();
        for hunter in self
            .animals
            .iter_mut()
            .filter(|animal| animal.species().diet() == Diet::Prey)
        {
            if prey.is_empty() {
                break;
            }
            let kills = hunter.hunt(&prey, params.species(hunter.species()), rng);
            prey.retain(|target| !kills.contains(&target.id));
            killed.extend(kills);
        }

        FeedingReport {
            fodder_eaten,
            killed: self.remove(&killed),
        }
    }

    /// Procreation phase; returns the number of newborns.
    ///
    /// Counts are taken before anyone gives birth and newborns join the cell
    /// only after every animal has been evaluated.
    pub fn procreate<R: Rng>(
        &mut self,
        params: &Parameters,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> usize {
        let herbivores = self.count(Species::Herbivore);
        let carnivores = self.count(Species::Carnivore);

        let mut newborns = Vec::new();
        for mother in self.animals.iter_mut() {
            let species = mother.species();
            let n_same = match species {
                Species::Herbivore => herbivores,
                Species::Carnivore => carnivores,
            };
            if let Some(weight) = mother.give_birth(n_same, params.species(species), rng) {
                newborns.push(Animal::new(ids.allocate(), species, 0, weight));
            }
        }

        let births = newborns.len();
        self.animals.extend(newborns);
        births
    }

    /// Migration decision for every animal that has not moved yet this year.
    /// Deciders are flagged as moved and returned; relocation is the caller's job.
    pub fn migrants<R: Rng>(&mut self, params: &Parameters, rng: &mut R) -> Vec<AnimalId> {
        let mut movers = Vec::new();
        for animal in self.animals.iter_mut().filter(|animal| !animal.has_moved()) {
            if animal.wants_to_migrate(params.species(animal.species()), rng) {
                animal.set_has_moved(true);
                movers.push(animal.id());
            }
        }
        movers
    }

    pub fn reset_moved(&mut self) {
        for animal in &mut self.animals {
            animal.set_has_moved(false);
        }
    }

    pub fn grow_older(&mut self) {
        for animal in &mut self.animals {
            animal.grow_older();
        }
    }

    pub fn lose_weight(&mut self, params: &Parameters) {
        for animal in &mut self.animals {
            animal.lose_weight(params.species(animal.species()));
        }
    }

    /// Death phase. Every animal is judged before any is removed.
    pub fn cull<R: Rng>(&mut self, params: &Parameters, rng: &mut R) -> Vec<Animal> {
        let dead: Vec<AnimalId> = self
            .animals
            .iter()
            .filter(|animal| animal.dies(params.species(animal.species()), rng))
            .map(Animal::id)
            .collect();
        self.remove(&dead)
    }
}
