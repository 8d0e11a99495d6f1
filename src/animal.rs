use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::{cell::FoodPatch, fitness::fitness, params::SpeciesParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn diet(self) -> Diet {
        match self {
            Species::Herbivore => Diet::Fodder,
            Species::Carnivore => Diet::Prey,
        }
    }
}

/// What a species eats during the Feeding phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diet {
    Fodder,
    Prey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(u64);

impl AnimalId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> AnimalId {
        let id = AnimalId(self.next);
        self.next += 1;
        id
    }
}

/// Initial population descriptor; a missing weight is drawn like a birth weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSpec {
    pub species: Species,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Prey as seen by a hunting carnivore: fixed for the duration of the hunt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prey {
    pub id: AnimalId,
    pub fitness: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    id: AnimalId,
    species: Species,
    age: u32,
    weight: f64,
    has_moved: bool,
}

impl Animal {
    /// Negative weights are clamped to zero; such an animal dies in the next Death phase.
    pub fn new(id: AnimalId, species: Species, age: u32, weight: f64) -> Self {
        Self {
            id,
            species,
            age,
            weight: weight.max(0.0),
            has_moved: false,
        }
    }

    pub fn from_spec<R: Rng>(
        id: AnimalId,
        spec: &AnimalSpec,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Self {
        let weight = spec
            .weight
            .unwrap_or_else(|| draw_birth_weight(params, rng));
        Self::new(id, spec.species, spec.age, weight)
    }

    pub fn id(&self) -> AnimalId {
        self.id
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub(crate) fn set_has_moved(&mut self, moved: bool) {
        self.has_moved = moved;
    }

    pub fn fitness(&self, params: &SpeciesParams) -> f64 {
        fitness(self.age, self.weight, params)
    }

    /// Eats up to `F` fodder from `food` and returns the weight gained.
    pub fn graze(&mut self, food: &mut FoodPatch, params: &SpeciesParams) -> f64 {
        if self.species.diet() != Diet::Fodder {
            return 0.0;
        }
        let eaten = food.take(params.appetite);
        let gain = params.beta * eaten;
        self.weight += gain;
        gain
    }

    /// Hunts through `prey`, weakest first, until `F` worth of prey is eaten.
    ///
    /// Every decided kill is final even when the last one overshoots `F`; the
    /// overshoot is simply not converted into weight. Returns the killed ids.
    pub fn hunt<R: Rng>(
        &mut self,
        prey: &[Prey],
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Vec<AnimalId> {
        if self.species.diet() != Diet::Prey {
            return Vec::new();
        }
        let cap = params.delta_phi_max.unwrap_or(0.0);
        let hunter_fitness = self.fitness(params);
        let mut eaten = 0.0;
        let mut killed = Vec::new();

        for target in prey {
            if eaten >= params.appetite {
                break;
            }
            let diff = hunter_fitness - target.fitness;
            let kill = if diff <= 0.0 {
                false
            } else if diff < cap {
                rng.gen::<f64>() <= diff / cap
            } else {
                true
            };
            if kill {
                eaten += target.weight;
                killed.push(target.id);
            }
        }

        self.weight += params.beta * eaten.min(params.appetite);
        killed
    }

    /// Decides on a birth given `n_same` animals of this species in the cell
    /// (including this one) and returns the newborn's weight.
    ///
    /// The birth is cancelled when the drawn weight is not positive or the
    /// mother cannot carry it, i.e. the newborn outweighs her or the `xi`
    /// deduction would exceed her weight.
    pub fn give_birth<R: Rng>(
        &mut self,
        n_same: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<f64> {
        if self.weight < params.zeta * (params.w_birth + params.sigma_birth) {
            return None;
        }
        let probability = params.gamma * self.fitness(params) * (n_same as f64 - 1.0);
        let birth = if probability >= 1.0 {
            true
        } else if probability > 0.0 {
            rng.gen::<f64>() < probability
        } else {
            false
        };
        if !birth {
            return None;
        }

        let birth_weight = draw_birth_weight(params, rng);
        let loss = params.xi * birth_weight;
        if birth_weight <= 0.0 || birth_weight >= self.weight || loss > self.weight {
            return None;
        }
        self.weight -= loss;
        Some(birth_weight)
    }

    pub fn wants_to_migrate<R: Rng>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        rng.gen::<f64>() < params.mu * self.fitness(params)
    }

    pub fn grow_older(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    pub fn lose_weight(&mut self, params: &SpeciesParams) {
        self.weight = (self.weight - params.eta * self.weight).max(0.0);
    }

    /// Starved animals always die and consume no random draw.
    pub fn dies<R: Rng>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        let probability = params.omega * (1.0 - self.fitness(params));
        rng.gen::<f64>() < probability
    }
}

/// Draws from `N(w_birth, sigma_birth)`.
pub fn draw_birth_weight<R: Rng>(params: &SpeciesParams, rng: &mut R) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    params.w_birth + params.sigma_birth * z
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn animal(species: Species, age: u32, weight: f64) -> Animal {
        let mut ids = IdAllocator::default();
        Animal::new(ids.allocate(), species, age, weight)
    }

    fn prey_with_fitness(id: u64, fitness: f64, weight: f64) -> Prey {
        Prey {
            id: AnimalId(id),
            fitness,
            weight,
        }
    }

    #[test]
    fn grazing_takes_full_appetite_when_available() {
        let params = SpeciesParams::herbivore();
        let mut herbivore = animal(Species::Herbivore, 5, 20.0);
        let mut food = FoodPatch::new(700.0);
        let gain = herbivore.graze(&mut food, &params);
        assert_eq!(gain, 9.0);
        assert_eq!(herbivore.weight(), 29.0);
        assert_eq!(food.fodder(), 690.0);
    }

    #[test]
    fn grazing_takes_the_remainder() {
        let params = SpeciesParams::herbivore();
        let mut herbivore = animal(Species::Herbivore, 5, 20.0);
        let mut food = FoodPatch::new(4.0);
        herbivore.graze(&mut food, &params);
        assert!((herbivore.weight() - 23.6).abs() < 1e-12);
        assert_eq!(food.fodder(), 0.0);

        herbivore.graze(&mut food, &params);
        assert!((herbivore.weight() - 23.6).abs() < 1e-12);
    }

    #[test]
    fn carnivores_do_not_graze() {
        let params = SpeciesParams::carnivore();
        let mut carnivore = animal(Species::Carnivore, 5, 20.0);
        let mut food = FoodPatch::new(100.0);
        assert_eq!(carnivore.graze(&mut food, &params), 0.0);
        assert_eq!(food.fodder(), 100.0);
    }

    #[test]
    fn hunter_never_kills_fitter_prey() {
        let params = SpeciesParams::carnivore();
        let mut rng = rng();
        for _ in 0..1000 {
            let mut carnivore = animal(Species::Carnivore, 5, 30.0);
            let hunter_fitness = carnivore.fitness(&params);
            let prey = [prey_with_fitness(1, hunter_fitness + 0.05, 20.0)];
            assert!(carnivore.hunt(&prey, &params, &mut rng).is_empty());
            assert_eq!(carnivore.weight(), 30.0);
        }
    }

    #[test]
    fn hunter_gain_is_capped_by_appetite() {
        let mut params = SpeciesParams::carnivore();
        params.delta_phi_max = Some(0.0001);
        let mut carnivore = animal(Species::Carnivore, 5, 30.0);
        let prey = [
            prey_with_fitness(1, 0.0, 40.0),
            prey_with_fitness(2, 0.0, 40.0),
            prey_with_fitness(3, 0.0, 40.0),
        ];
        let killed = carnivore.hunt(&prey, &params, &mut rng());
        assert_eq!(killed, vec![AnimalId(1), AnimalId(2)]);
        assert!((carnivore.weight() - (30.0 + 0.75 * 50.0)).abs() < 1e-12);
    }

    #[test]
    fn herbivores_do_not_hunt() {
        let params = SpeciesParams::herbivore();
        let mut herbivore = animal(Species::Herbivore, 5, 30.0);
        let prey = [prey_with_fitness(1, 0.0, 10.0)];
        assert!(herbivore.hunt(&prey, &params, &mut rng()).is_empty());
    }

    #[test]
    fn light_mothers_never_give_birth() {
        let params = SpeciesParams::herbivore();
        let mut rng = rng();
        let mut mother = animal(Species::Herbivore, 5, 30.0);
        for _ in 0..100 {
            assert_eq!(mother.give_birth(100, &params, &mut rng), None);
        }
        assert_eq!(mother.weight(), 30.0);
    }

    #[test]
    fn lone_animals_never_give_birth() {
        let params = SpeciesParams::herbivore();
        let mut rng = rng();
        let mut mother = animal(Species::Herbivore, 5, 80.0);
        for _ in 0..100 {
            assert_eq!(mother.give_birth(1, &params, &mut rng), None);
        }
    }

    #[test]
    fn birth_deducts_scaled_birth_weight() {
        let params = SpeciesParams::herbivore();
        let mut rng = rng();
        let mut births = 0;
        for _ in 0..50 {
            let mut mother = animal(Species::Herbivore, 5, 80.0);
            if let Some(birth_weight) = mother.give_birth(50, &params, &mut rng) {
                births += 1;
                assert!(birth_weight > 0.0 && birth_weight < 80.0);
                let expected = 80.0 - params.xi * birth_weight;
                assert!((mother.weight() - expected).abs() < 1e-9);
                assert!(mother.weight() >= 0.0);
            }
        }
        assert_eq!(births, 50, "gamma * fitness * 49 exceeds one");
    }

    #[test]
    fn starved_animals_always_die() {
        let params = SpeciesParams::herbivore();
        let mut rng = rng();
        let corpse = animal(Species::Herbivore, 1, 0.0);
        for _ in 0..100 {
            assert!(corpse.dies(&params, &mut rng));
        }
    }

    #[test]
    fn zero_omega_means_no_random_death() {
        let mut params = SpeciesParams::carnivore();
        params.omega = 0.0;
        let mut rng = rng();
        let old = animal(Species::Carnivore, 90, 1.0);
        for _ in 0..100 {
            assert!(!old.dies(&params, &mut rng));
        }
    }

    #[test]
    fn migration_needs_mobility() {
        let mut params = SpeciesParams::herbivore();
        params.mu = 0.0;
        let mut rng = rng();
        let herbivore = animal(Species::Herbivore, 3, 40.0);
        assert!((0..100).all(|_| !herbivore.wants_to_migrate(&params, &mut rng)));
    }

    #[test]
    fn aging_and_weight_loss() {
        let params = SpeciesParams::carnivore();
        let mut carnivore = animal(Species::Carnivore, 3, 16.0);
        carnivore.grow_older();
        carnivore.lose_weight(&params);
        assert_eq!(carnivore.age(), 4);
        assert_eq!(carnivore.weight(), 14.0);
    }

    #[test]
    fn unspecified_weight_is_drawn() {
        let params = SpeciesParams::herbivore();
        let spec = AnimalSpec {
            species: Species::Herbivore,
            age: 0,
            weight: None,
        };
        let mut ids = IdAllocator::default();
        let newborn = Animal::from_spec(ids.allocate(), &spec, &params, &mut rng());
        assert!(newborn.weight() >= 0.0);
        assert_ne!(newborn.weight(), params.w_birth);
    }
}
