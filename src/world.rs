use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    animal::{Animal, AnimalId, AnimalSpec, IdAllocator, Species},
    cell::{Cell, LandscapeKind},
    params::{LandscapeParams, ParamError, Parameters},
};

/// 1-based `(row, col)`; row 1 is the top of the map.
pub type Location = (usize, usize);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("island map is empty")]
    EmptyMap,
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell code '{code}' at ({row}, {col})")]
    UnknownCode { code: char, row: usize, col: usize },
    #[error("border cell ({row}, {col}) must be water")]
    OpenBorder { row: usize, col: usize },
    #[error("location {0:?} is outside the island")]
    OutsideMap(Location),
    #[error("location {0:?} is water")]
    Uninhabitable(Location),
    #[error("invalid weight {weight} for animal placed at {loc:?}")]
    InvalidWeight { loc: Location, weight: f64 },
}

/// Initial animals for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub loc: Location,
    #[serde(alias = "pop")]
    pub animals: Vec<AnimalSpec>,
}

/// Event counts for the year in progress, reset when a new year starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub births: usize,
    pub deaths: usize,
    pub kills: usize,
    pub migrations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Census {
    pub year: u64,
    pub herbivores: usize,
    pub carnivores: usize,
}

impl Census {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }
}

pub struct World {
    year: u64,
    grid: Vec<Vec<LandscapeKind>>,
    landscape: LandscapeParams,
    pub(crate) cells: BTreeMap<Location, Cell>,
    pub(crate) ids: IdAllocator,
    pub(crate) ledger: Ledger,
}

impl World {
    pub fn from_map(map: &str) -> Result<Self, WorldError> {
        Self::with_landscape(map, LandscapeParams::default())
    }

    /// Parses a map of `W`, `L`, `H` and `D` codes. Surrounding whitespace on
    /// each line and blank lines around the map are ignored; rows must be
    /// equally long and ringed by water, so a blank line inside the map is a
    /// ragged row.
    pub fn with_landscape(map: &str, landscape: LandscapeParams) -> Result<Self, WorldError> {
        let lines: Vec<&str> = map.lines().map(str::trim).collect();
        let first = lines.iter().position(|line| !line.is_empty());
        let last = lines.iter().rposition(|line| !line.is_empty());
        let rows: Vec<Vec<char>> = match (first, last) {
            (Some(first), Some(last)) => lines[first..=last]
                .iter()
                .map(|line| line.chars().collect())
                .collect(),
            _ => return Err(WorldError::EmptyMap),
        };
        let width = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(WorldError::EmptyMap),
        };

        let mut grid = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(WorldError::RaggedRow {
                    row: r + 1,
                    expected: width,
                    found: row.len(),
                });
            }
            let kinds = row
                .iter()
                .enumerate()
                .map(|(c, &code)| {
                    LandscapeKind::from_code(code).ok_or(WorldError::UnknownCode {
                        code,
                        row: r + 1,
                        col: c + 1,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            grid.push(kinds);
        }

        let height = grid.len();
        let mut cells = BTreeMap::new();
        for (r, row) in grid.iter().enumerate() {
            for (c, &kind) in row.iter().enumerate() {
                if !kind.is_habitable() {
                    continue;
                }
                if r == 0 || r + 1 == height || c == 0 || c + 1 == width {
                    return Err(WorldError::OpenBorder {
                        row: r + 1,
                        col: c + 1,
                    });
                }
                cells.insert((r + 1, c + 1), Cell::new(kind, landscape.f_max(kind)));
            }
        }

        Ok(Self {
            year: 0,
            grid,
            landscape,
            cells,
            ids: IdAllocator::default(),
            ledger: Ledger::default(),
        })
    }

    pub fn year(&self) -> u64 {
        self.year
    }

    pub fn advance_year(&mut self) {
        self.year += 1;
    }

    pub fn ledger(&self) -> Ledger {
        self.ledger
    }

    pub(crate) fn reset_ledger(&mut self) {
        self.ledger = Ledger::default();
    }

    /// `(rows, cols)` of the whole map, water included.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.grid.len(), self.grid.first().map_or(0, Vec::len))
    }

    pub fn kind_at(&self, loc: Location) -> Option<LandscapeKind> {
        let (row, col) = loc;
        self.grid
            .get(row.checked_sub(1)?)
            .and_then(|cells| cells.get(col.checked_sub(1)?))
            .copied()
    }

    /// Updates the food capacity of one landscape kind and of every cell of that kind.
    pub fn set_landscape_parameters(
        &mut self,
        kind: LandscapeKind,
        updates: &BTreeMap<String, f64>,
    ) -> Result<(), ParamError> {
        self.landscape.update(kind, updates)?;
        let f_max = self.landscape.f_max(kind);
        for cell in self.cells.values_mut().filter(|cell| cell.kind() == kind) {
            cell.food_mut().set_f_max(f_max);
        }
        Ok(())
    }

    pub fn cell(&self, loc: Location) -> Option<&Cell> {
        self.cells.get(&loc)
    }

    pub fn cell_mut(&mut self, loc: Location) -> Option<&mut Cell> {
        self.cells.get_mut(&loc)
    }

    /// Habitable cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Location, &Cell)> + '_ {
        self.cells.iter().map(|(loc, cell)| (*loc, cell))
    }

    pub fn locations(&self) -> Vec<Location> {
        self.cells.keys().copied().collect()
    }

    /// Habitable neighbours in north, east, south, west order.
    pub fn neighbours(&self, loc: Location) -> Vec<Location> {
        let (row, col) = loc;
        let candidates = [
            row.checked_sub(1).map(|r| (r, col)),
            Some((row, col + 1)),
            Some((row + 1, col)),
            col.checked_sub(1).map(|c| (row, c)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(|candidate| self.cells.contains_key(candidate))
            .collect()
    }

    fn check_habitable(&self, loc: Location) -> Result<(), WorldError> {
        match self.kind_at(loc) {
            None => Err(WorldError::OutsideMap(loc)),
            Some(kind) if !kind.is_habitable() => Err(WorldError::Uninhabitable(loc)),
            Some(_) => Ok(()),
        }
    }

    pub fn spawn(
        &mut self,
        loc: Location,
        species: Species,
        age: u32,
        weight: f64,
    ) -> Result<AnimalId, WorldError> {
        self.check_habitable(loc)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(WorldError::InvalidWeight { loc, weight });
        }
        let id = self.ids.allocate();
        if let Some(cell) = self.cells.get_mut(&loc) {
            cell.add(Animal::new(id, species, age, weight));
        }
        Ok(id)
    }

    /// Adds initial animals. Every placement is checked before any animal is
    /// added, so a rejected call leaves the island unchanged.
    pub fn populate<R: Rng>(
        &mut self,
        placements: &[Placement],
        params: &Parameters,
        rng: &mut R,
    ) -> Result<Vec<AnimalId>, WorldError> {
        for placement in placements {
            self.check_habitable(placement.loc)?;
            for spec in &placement.animals {
                if let Some(weight) = spec.weight {
                    if !weight.is_finite() || weight < 0.0 {
                        return Err(WorldError::InvalidWeight {
                            loc: placement.loc,
                            weight,
                        });
                    }
                }
            }
        }

        let mut added = Vec::new();
        for placement in placements {
            for spec in &placement.animals {
                let id = self.ids.allocate();
                let animal = Animal::from_spec(id, spec, params.species(spec.species), rng);
                if let Some(cell) = self.cells.get_mut(&placement.loc) {
                    cell.add(animal);
                    added.push(id);
                }
            }
        }
        Ok(added)
    }

    /// Takes `ids` out of `from` in one pass and sends each to a habitable
    /// neighbour drawn at random. Returns how many animals moved; nothing
    /// moves when `from` has no habitable neighbour.
    pub fn disperse<R: Rng>(&mut self, from: Location, ids: &[AnimalId], rng: &mut R) -> usize {
        let neighbours = self.neighbours(from);
        if neighbours.is_empty() || ids.is_empty() {
            return 0;
        }
        let leaving = match self.cells.get_mut(&from) {
            Some(cell) => cell.remove(ids),
            None => return 0,
        };
        let moved = leaving.len();
        for animal in leaving {
            let to = neighbours[rng.gen_range(0..neighbours.len())];
            if let Some(cell) = self.cells.get_mut(&to) {
                cell.add(animal);
            }
        }
        moved
    }

    pub fn animals(&self) -> impl Iterator<Item = (Location, &Animal)> + '_ {
        self.cells
            .iter()
            .flat_map(|(loc, cell)| cell.animals().iter().map(move |animal| (*loc, animal)))
    }

    pub fn count(&self, species: Species) -> usize {
        self.cells.values().map(|cell| cell.count(species)).sum()
    }

    pub fn total_population(&self) -> usize {
        self.cells.values().map(Cell::len).sum()
    }

    pub fn census(&self) -> Census {
        Census {
            year: self.year,
            herbivores: self.count(Species::Herbivore),
            carnivores: self.count(Species::Carnivore),
        }
    }

    /// Per-location head count of one species over the full map, water included.
    pub fn density(&self, species: Species) -> Vec<Vec<usize>> {
        let (rows, cols) = self.dimensions();
        let mut matrix = vec![vec![0; cols]; rows];
        for ((row, col), cell) in &self.cells {
            matrix[row - 1][col - 1] = cell.count(species);
        }
        matrix
    }
}
