//! Simulation engine: world construction, population management and turns.

use crate::animal::Animal;
use crate::context::{TurnContext, World};
use crate::grid::Grid;
use crate::snapshot::{AnimalSnapshot, FieldSnapshot};
use eco_core::{
    AnimalId, Error, HuntStats, MapField, OccupantType, ParameterStore, Position, Result,
    SimulationConfig, Species, TurnSummary,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

pub struct Simulation {
    config: SimulationConfig,
    world: World,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
    rng: ChaCha8Rng,
}

fn random_free_position(grid: &Grid, rng: &mut ChaCha8Rng) -> Result<Position> {
    let free: Vec<Position> = grid.free_positions().collect();
    free.choose(rng)
        .copied()
        .ok_or_else(|| Error::ResourceExhausted("no free field left on the map".to_string()))
}

impl Simulation {
    /// Build a world with water and the configured starting populations.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut sim = Self::empty(config)?;
        sim.populate()?;
        info!(
            event = "simulation_created",
            width = sim.world.grid.width(),
            height = sim.world.grid.height(),
            herbivores = sim.herbivores.len(),
            carnivores = sim.carnivores.len(),
            seed = ?sim.config.seed,
            "Simulation initialised"
        );
        Ok(sim)
    }

    /// Build the grid and water tiles only, without any animals.
    pub fn empty(config: SimulationConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let world = Self::build_world(&config.parameters, &mut rng)?;
        Ok(Self {
            config,
            world,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
            rng,
        })
    }

    fn build_world(params: &ParameterStore, rng: &mut ChaCha8Rng) -> Result<World> {
        let mut grid = Grid::new(
            params.width(),
            params.height(),
            params.humidity(),
            params.start_grass_density(),
        );
        for _ in 0..params.water_tiles() {
            let pos = random_free_position(&grid, rng)?;
            grid.set_occupant(pos, OccupantType::Water)?;
            grid.mark_near_water(pos);
        }
        Ok(World::new(grid))
    }

    fn populate(&mut self) -> Result<()> {
        for species in [Species::Carnivore, Species::Herbivore] {
            let count = self.config.parameters.start_population(species);
            let energy = self.config.parameters.start_energy(species);
            for _ in 0..count {
                let pos = random_free_position(&self.world.grid, &mut self.rng)?;
                self.spawn(species.occupant(), pos, energy)?;
            }
        }
        Ok(())
    }

    /// Rebuild grid, populations and counters from the stored configuration.
    pub fn reset(&mut self) -> Result<()> {
        *self = Self::new(self.config.clone())?;
        info!(event = "simulation_reset", "Simulation reset");
        Ok(())
    }

    /// Advance the world by one turn.
    ///
    /// Grass grows first, then every herbivore acts, then every carnivore,
    /// each in insertion order. Newborns join the end of their population and
    /// act in the same turn.
    #[instrument(level = "debug", skip(self), fields(turn = self.world.ledger.turn() + 1))]
    pub fn step(&mut self) -> Result<TurnSummary> {
        let turn = self.world.ledger.advance_turn();
        self.world.grid.recalculate(self.config.parameters.humidity());

        self.update_population(Species::Herbivore)?;
        self.update_population(Species::Carnivore)?;

        let summary = self.summary();
        debug!(
            event = "turn_complete",
            turn,
            herbivores = summary.herbivores,
            carnivores = summary.carnivores,
            highest_generation = summary.highest_generation,
            average_grass_density = summary.average_grass_density,
            hunt_success_rate = summary.hunt_success_rate,
            "Turn complete"
        );
        Ok(summary)
    }

    fn update_population(&mut self, species: Species) -> Result<()> {
        let (acting, others) = match species {
            Species::Herbivore => (&mut self.herbivores, &mut self.carnivores),
            Species::Carnivore => (&mut self.carnivores, &mut self.herbivores),
        };

        let mut index = 0;
        while index < acting.len() {
            let mut births = Vec::new();
            let mut ctx = TurnContext::new(&mut self.world, others, &mut births);
            let outcome = acting[index].update(&mut ctx);
            // Newborns are already on the grid, keep them even when the turn fails.
            acting.append(&mut births);
            outcome?;

            if acting[index].is_alive() {
                index += 1;
            } else {
                acting.remove(index);
            }
        }
        Ok(())
    }

    /// Create a wild animal of `kind` with its species' default genome.
    pub fn spawn(&mut self, kind: OccupantType, position: Position, energy: i32) -> Result<AnimalId> {
        let species = Species::try_from(kind)?;
        if !self.world.grid.field(position)?.is_free() {
            return Err(Error::Occupied {
                x: position.x,
                y: position.y,
            });
        }
        let id = self.world.ledger.next_id()?;
        let genome = *self.config.default_genome(species);
        let animal = Animal::new(id, species, position, energy, genome, self.rng.gen());
        self.add_animal(animal)?;
        Ok(id)
    }

    /// Put an animal on the map and into its population.
    pub fn add_animal(&mut self, animal: Animal) -> Result<()> {
        let pos = animal.position();
        if !animal.is_alive() || animal.energy() <= 0 {
            return Err(Error::InvalidParameter {
                key: "energy".to_string(),
                value: animal.energy() as i64,
            });
        }
        if !self.world.grid.field(pos)?.is_free() {
            return Err(Error::Occupied { x: pos.x, y: pos.y });
        }
        self.world.grid.set_occupant(pos, animal.kind())?;
        debug!(
            event = "animal_added",
            animal_id = %animal.id(),
            species = %animal.species(),
            x = pos.x,
            y = pos.y,
            energy = animal.energy(),
            "Animal added"
        );
        self.population_mut(animal.species()).push(animal);
        Ok(())
    }

    /// Take the animal of `kind` at `pos` off the map and out of its population.
    pub fn remove_animal(&mut self, pos: Position, kind: OccupantType) -> Result<Animal> {
        let species = Species::try_from(kind)?;
        self.world.grid.field(pos)?;
        let population = self.population_mut(species);
        let index = population
            .iter()
            .position(|a| a.position() == pos)
            .ok_or(Error::AnimalNotFound {
                kind,
                x: pos.x,
                y: pos.y,
            })?;
        let animal = population.remove(index);
        if let Some(field) = self.world.grid.get_mut(pos) {
            if field.occupant() == kind {
                field.set_occupant(OccupantType::None);
            }
        }
        debug!(
            event = "animal_removed",
            animal_id = %animal.id(),
            species = %species,
            x = pos.x,
            y = pos.y,
            "Animal removed"
        );
        Ok(animal)
    }

    /// Change the energy of the animal of `kind` at `pos`. Returns whether it
    /// survived; a starved animal is removed at once.
    pub fn change_energy(&mut self, pos: Position, kind: OccupantType, delta: i32) -> Result<bool> {
        let species = Species::try_from(kind)?;
        let population = match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        };
        let index = population
            .iter()
            .position(|a| a.position() == pos)
            .ok_or(Error::AnimalNotFound {
                kind,
                x: pos.x,
                y: pos.y,
            })?;
        population[index].change_energy(delta, &mut self.world);
        if population[index].is_alive() {
            Ok(true)
        } else {
            population.remove(index);
            Ok(false)
        }
    }

    fn population_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn population(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub fn field(&self, pos: Position) -> Result<&MapField> {
        self.world.grid.field(pos)
    }

    pub fn herbivore_at(&self, pos: Position) -> Option<&Animal> {
        self.herbivores.iter().find(|a| a.position() == pos)
    }

    pub fn carnivore_at(&self, pos: Position) -> Option<&Animal> {
        self.carnivores.iter().find(|a| a.position() == pos)
    }

    /// The herbivore or, failing that, the carnivore at `pos`.
    pub fn animal_at(&self, pos: Position) -> Option<&Animal> {
        self.herbivore_at(pos).or_else(|| self.carnivore_at(pos))
    }

    pub fn animal_info(&self, pos: Position) -> Option<AnimalSnapshot> {
        self.animal_at(pos).map(AnimalSnapshot::from)
    }

    pub fn field_snapshots(&self) -> Vec<FieldSnapshot> {
        self.world.grid.iter().map(FieldSnapshot::from).collect()
    }

    /// Herbivores first, then carnivores, each in update order.
    pub fn animal_snapshots(&self) -> Vec<AnimalSnapshot> {
        self.herbivores
            .iter()
            .chain(&self.carnivores)
            .map(AnimalSnapshot::from)
            .collect()
    }

    pub fn summary(&self) -> TurnSummary {
        TurnSummary {
            turn: self.world.ledger.turn(),
            herbivores: self.herbivores.len(),
            carnivores: self.carnivores.len(),
            highest_generation: self.world.ledger.highest_generation(),
            average_grass_density: self.world.grid.average_grass_density(),
            hunt_success_rate: self.world.ledger.hunts().success_rate(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.config.parameters
    }

    /// Update a stored parameter. Humidity applies from the next turn, map
    /// size and starting populations from the next [`reset`](Self::reset).
    pub fn set_parameter(&mut self, key: &str, value: i64) -> Result<()> {
        self.config.parameters.set(key, value)?;
        info!(event = "parameter_changed", parameter = key, value, "Parameter changed");
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.world.grid
    }

    pub fn turn(&self) -> u64 {
        self.world.ledger.turn()
    }

    pub fn herbivore_count(&self) -> usize {
        self.herbivores.len()
    }

    pub fn carnivore_count(&self) -> usize {
        self.carnivores.len()
    }

    pub fn highest_generation(&self) -> u32 {
        self.world.ledger.highest_generation()
    }

    pub fn hunt_stats(&self) -> &HuntStats {
        self.world.ledger.hunts()
    }

    pub fn average_grass_density(&self) -> i32 {
        self.world.grid.average_grass_density()
    }

    /// Add a news item on behalf of the driver.
    pub fn report(&mut self, message: impl AsRef<str>) {
        self.world.ledger.report(message);
    }

    pub fn news(&self) -> &[String] {
        self.world.ledger.news().items()
    }

    pub fn drain_news(&mut self) -> Vec<String> {
        self.world.ledger.drain_news()
    }
}
