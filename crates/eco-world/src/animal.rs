//! Animal state and the life cycle shared by both species.

use crate::carnivore;
use crate::context::{TurnContext, World};
use crate::grid::Grid;
use crate::herbivore;
use crate::retry::retry;
use eco_core::{AnimalId, Direction, Genome, OccupantType, Position, Result, Species};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Failed move attempts after which further moves succeed trivially.
pub const MAX_FAILED_MOVES: u32 = 12;

/// Random neighbours tried when placing a newborn.
pub const PLACEMENT_ATTEMPTS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Killed,
}

impl DeathCause {
    fn news(&self, species: Species) -> String {
        match self {
            DeathCause::OldAge => format!("A {} has died!", species),
            DeathCause::Starvation => format!("A {} has starved!", species),
            DeathCause::Killed => format!("A {} has been killed!", species),
        }
    }
}

/// What an animal decided to do with the rest of its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Skip the turn
    Rest,
    /// Eat the grass underfoot
    Graze,
    /// Move towards denser grass, then graze
    Forage,
    /// Run from a carnivore
    Flee { threat: Position },
    /// Chase and attack a herbivore
    Hunt { prey: Position },
    /// Keep walking along the current heading
    Wander,
}

/// An animal in the simulation
#[derive(Debug, Clone)]
pub struct Animal {
    id: AnimalId,
    parent: AnimalId,
    species: Species,
    generation: u32,
    offspring: u32,
    position: Position,
    age: u32,
    energy: i32,
    moves_this_turn: u32,
    failed_moves: u32,
    exhaustion: u32,
    gestation: u32,
    alive: bool,
    heading: Direction,
    genome: Genome,
    rng: ChaCha8Rng,
}

impl Animal {
    /// A wild animal: first generation, no parent. It cannot breed before
    /// one full gestation period has passed.
    pub fn new(
        id: AnimalId,
        species: Species,
        position: Position,
        energy: i32,
        genome: Genome,
        seed: u64,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let heading = Direction::random(&mut rng);
        Self {
            id,
            parent: AnimalId::NONE,
            species,
            generation: 1,
            offspring: 0,
            position,
            age: 0,
            energy,
            moves_this_turn: 0,
            failed_moves: 0,
            exhaustion: 0,
            gestation: genome.gestation(),
            alive: true,
            heading,
            genome,
            rng,
        }
    }

    pub fn with_lineage(mut self, parent: AnimalId, generation: u32) -> Self {
        self.parent = parent;
        self.generation = generation;
        self
    }

    pub fn id(&self) -> AnimalId {
        self.id
    }

    pub fn parent(&self) -> AnimalId {
        self.parent
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// The occupant tag of the field this animal stands on.
    pub fn kind(&self) -> OccupantType {
        self.species.occupant()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn offspring(&self) -> u32 {
        self.offspring
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn energy(&self) -> i32 {
        self.energy
    }

    pub fn moves_this_turn(&self) -> u32 {
        self.moves_this_turn
    }

    pub fn failed_moves(&self) -> u32 {
        self.failed_moves
    }

    pub fn exhaustion(&self) -> u32 {
        self.exhaustion
    }

    pub fn gestation(&self) -> u32 {
        self.gestation
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn is_mature(&self) -> bool {
        self.age >= self.genome.maturity_age()
    }

    pub fn direction_to(&self, target: Position) -> Direction {
        self.position.direction_to(&target)
    }

    pub fn distance_to(&self, target: Position) -> i32 {
        self.position.chebyshev_distance(&target)
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub(crate) fn set_heading(&mut self, heading: Direction) {
        self.heading = heading;
    }

    pub(crate) fn exhaust(&mut self, amount: u32) {
        self.exhaustion = self.exhaustion.saturating_add(amount);
    }

    /// Whether the animal is alive and still has move budget this turn.
    pub(crate) fn has_moves_left(&self) -> bool {
        self.alive && self.moves_this_turn < self.genome.speed()
    }

    pub(crate) fn spend_move(&mut self) {
        self.moves_this_turn += 1;
    }

    /// Use up the rest of this turn's move budget.
    pub(crate) fn end_movement(&mut self) {
        self.moves_this_turn = self.moves_this_turn.max(self.genome.speed());
    }

    pub fn change_energy(&mut self, delta: i32, world: &mut World) {
        self.set_energy(self.energy.saturating_add(delta), world);
    }

    /// Set the energy level. Dropping to zero or below starves the animal.
    pub fn set_energy(&mut self, energy: i32, world: &mut World) {
        self.energy = energy;
        if self.energy <= 0 {
            self.die(DeathCause::Starvation, world);
        }
    }

    /// Mark the animal dead, clear its field and report it.
    ///
    /// Removing it from its population is up to the owner of that list.
    pub fn die(&mut self, cause: DeathCause, world: &mut World) {
        if !self.alive {
            return;
        }
        self.alive = false;
        let kind = self.kind();
        if let Some(field) = world.grid.get_mut(self.position) {
            if field.occupant() == kind {
                field.set_occupant(OccupantType::None);
            }
        }
        debug!(
            event = "animal_death",
            animal_id = %self.id,
            species = %self.species,
            cause = ?cause,
            age = self.age,
            energy = self.energy,
            x = self.position.x,
            y = self.position.y,
            "Animal died"
        );
        world.ledger.report(cause.news(self.species));
    }

    /// Try to step one field in `direction`.
    ///
    /// After more than [`MAX_FAILED_MOVES`] failures in a turn, or once the
    /// animal is dead, every call counts as a move without going anywhere.
    pub fn move_towards(&mut self, direction: Direction, world: &mut World) -> bool {
        if self.failed_moves > MAX_FAILED_MOVES || !self.alive {
            self.moves_this_turn += 1;
            return true;
        }

        let target = self.position.offset(direction);
        if self.moves_this_turn >= self.genome.speed()
            || self.exhaustion > self.genome.stamina()
            || !world.grid.is_free(target)
        {
            self.failed_moves += 1;
            trace!(
                animal_id = %self.id,
                direction = %direction,
                failed_moves = self.failed_moves,
                "Move blocked"
            );
            return false;
        }

        let kind = self.kind();
        if let Some(field) = world.grid.get_mut(self.position) {
            field.set_occupant(OccupantType::None);
        }
        if let Some(field) = world.grid.get_mut(target) {
            field.set_occupant(kind);
        }
        self.position = target;
        self.moves_this_turn += 1;
        self.exhaustion += 1;
        self.change_energy(-1, world);
        true
    }

    /// Closest field within sight holding `kind`. Ties are broken at random.
    pub fn search(&mut self, kind: OccupantType, grid: &Grid) -> Option<Position> {
        let sight = self.genome.sight().min(i32::MAX as u32) as i32;
        let mut closest = i32::MAX;
        let mut candidates = Vec::new();

        for pos in grid.window(self.position, sight) {
            if pos == self.position || grid.occupant(pos) != Some(kind) {
                continue;
            }
            let distance = self.position.chebyshev_distance(&pos);
            if distance < closest {
                closest = distance;
                candidates.clear();
            }
            if distance == closest {
                candidates.push(pos);
            }
        }

        candidates.choose(&mut self.rng).copied()
    }

    /// Run one turn: age, pay upkeep, maybe breed, then act.
    pub fn update(&mut self, ctx: &mut TurnContext<'_>) -> Result<()> {
        if !self.alive || !self.begin_turn(ctx)? {
            return Ok(());
        }

        let action = match self.species {
            Species::Herbivore => herbivore::decide(self, &ctx.world.grid),
            Species::Carnivore => carnivore::decide(self, &ctx.world.grid),
        };
        trace!(animal_id = %self.id, action = ?action, "Animal acting");

        match action {
            Action::Rest => {}
            Action::Graze => herbivore::graze(self, ctx.world),
            Action::Forage => {
                herbivore::move_to_grazing_grounds(self, ctx.world);
                herbivore::graze(self, ctx.world);
            }
            Action::Flee { threat } => herbivore::flee(self, threat, ctx.world),
            Action::Hunt { prey } => carnivore::hunt(self, prey, ctx),
            Action::Wander => carnivore::wander(self, ctx.world),
        }
        Ok(())
    }

    /// Life-cycle bookkeeping at the start of a turn. Returns whether the
    /// animal is still alive afterwards.
    fn begin_turn(&mut self, ctx: &mut TurnContext<'_>) -> Result<bool> {
        self.age = self.age.saturating_add(1);
        self.moves_this_turn = 0;
        self.failed_moves = 0;
        self.exhaustion = self.exhaustion.saturating_sub(1);
        self.gestation = self.gestation.saturating_sub(1);

        if self.age >= self.genome.age_limit() {
            self.die(DeathCause::OldAge, ctx.world);
            return Ok(false);
        }

        self.change_energy(-1, ctx.world);
        if !self.alive {
            return Ok(false);
        }

        if self.is_mature()
            && self.gestation == 0
            && self.energy as i64 >= self.genome.reproductive_energy() as i64
            && self.rng.gen_range(0..3) == 0
        {
            self.reproduce(ctx)?;
        }
        Ok(self.alive)
    }

    /// Place a litter on free neighbouring fields.
    ///
    /// Every newborn gets `energy / (litter + 1)`; the parent pays that share
    /// once. If a newborn finds no free field the remaining litter is
    /// abandoned and the parent pays nothing.
    fn reproduce(&mut self, ctx: &mut TurnContext<'_>) -> Result<()> {
        let litter = self.genome.reproduction_rate();
        let share = (self.energy as i64 / (litter as i64 + 1)) as i32;

        for _ in 0..litter {
            let origin = self.position;
            let grid = &ctx.world.grid;
            let Some(spot) = retry(PLACEMENT_ATTEMPTS, || {
                let candidate = origin.offset(Direction::random(&mut self.rng));
                grid.is_free(candidate).then_some(candidate)
            }) else {
                trace!(
                    animal_id = %self.id,
                    x = origin.x,
                    y = origin.y,
                    "No free field for offspring"
                );
                return Ok(());
            };

            let id = ctx.world.ledger.next_id()?;
            let genome = Genome::from_parent(&self.genome, &mut self.rng);
            let child = Animal::new(id, self.species, spot, share, genome, self.rng.gen())
                .with_lineage(self.id, self.generation + 1);
            ctx.world.grid.set_occupant(spot, self.kind())?;
            debug!(
                event = "animal_born",
                animal_id = %id,
                parent_id = %self.id,
                species = %self.species,
                generation = child.generation,
                energy = share,
                x = spot.x,
                y = spot.y,
                "Offspring placed"
            );
            ctx.births.push(child);
            self.offspring += 1;
        }

        self.change_energy(-share, ctx.world);
        self.gestation = self.genome.gestation();
        ctx.world.ledger.record_generation(self.generation + 1);
        ctx.world
            .ledger
            .report(format!("A new {} has been born!", self.species));
        Ok(())
    }
}
