//! Herbivore behaviour: flee from carnivores, look for grass, graze.

use crate::animal::{Action, Animal};
use crate::context::World;
use crate::grid::Grid;
use crate::retry::retry;
use eco_core::{Direction, MapField, OccupantType, Position};
use rand::Rng;
use tracing::warn;

/// Below this grass density a herbivore goes looking for better pasture.
pub const HUNGRY_DENSITY: i32 = 20;

/// Candidate directions tried before wandering off at random.
pub const GRAZING_ATTEMPTS: usize = 12;

pub fn decide(animal: &mut Animal, grid: &Grid) -> Action {
    if let Some(threat) = animal.search(OccupantType::Carnivore, grid) {
        return Action::Flee { threat };
    }

    let density = grid.get(animal.position()).map_or(0, MapField::grass_density);
    let spare_stamina = animal.genome().stamina() as i64 - animal.genome().speed() as i64;
    if density < HUNGRY_DENSITY && (animal.exhaustion() as i64) < spare_stamina {
        Action::Forage
    } else {
        Action::Graze
    }
}

/// Run directly away from `threat` for the rest of the turn.
pub fn flee(animal: &mut Animal, threat: Position, world: &mut World) {
    let mut direction = animal.direction_to(threat).opposite();
    if direction == Direction::Center {
        warn!(
            animal_id = %animal.id(),
            x = threat.x,
            y = threat.y,
            "Threat has no bearing, fleeing at random"
        );
        direction = Direction::random(animal.rng());
    }

    while animal.has_moves_left() {
        if !animal.move_towards(direction, world) {
            direction = Direction::random(animal.rng());
        }
    }
}

/// Step towards a field in sight with denser grass than the current one.
/// Falls back to a random walk when no such step is possible.
pub fn move_to_grazing_grounds(animal: &mut Animal, world: &mut World) {
    let origin = animal.position();
    let current = world.grid.get(origin).map_or(0, MapField::grass_density);
    let sight = animal.genome().sight().min(i32::MAX as u32) as i32;

    let mut candidates: Vec<Direction> = Vec::new();
    for pos in world.grid.window(origin, sight) {
        let richer = world
            .grid
            .get(pos)
            .is_some_and(|f| f.grass_density() > current);
        if pos != origin && richer {
            let direction = origin.direction_to(&pos);
            if !candidates.contains(&direction) {
                candidates.push(direction);
            }
        }
    }

    let mut direction = Direction::random(animal.rng());
    let reached = retry(GRAZING_ATTEMPTS, || {
        if candidates.is_empty() {
            return None;
        }
        let index = animal.rng().gen_range(0..candidates.len());
        let candidate = candidates.swap_remove(index);
        animal.move_towards(candidate, world).then_some(())
    });
    if reached.is_some() {
        return;
    }

    while animal.has_moves_left() {
        if !animal.move_towards(direction, world) {
            direction = Direction::random(animal.rng());
        }
    }
}

/// Eat from the current field: one move, `metabolism / 3` energy, twice
/// that much grass.
pub fn graze(animal: &mut Animal, world: &mut World) {
    if !animal.has_moves_left() || animal.exhaustion() >= animal.genome().stamina() {
        return;
    }
    let food = (animal.genome().metabolism() / 3).min(i32::MAX as u32 / 2) as i32;
    let Some(field) = world.grid.get_mut(animal.position()) else {
        return;
    };
    if field.grass_density() <= 0 {
        return;
    }
    field.reduce_grass_density(2 * food);
    animal.spend_move();
    animal.change_energy(food, world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TurnContext;
    use eco_core::{carnivore_default_genome, herbivore_default_genome, Genome, Humidity, Species};

    fn world(grass: i32) -> World {
        World::new(Grid::new(12, 12, Humidity::Dry, grass))
    }

    fn place(world: &mut World, species: Species, pos: Position, genome: Genome) -> Animal {
        let id = world.ledger.next_id().unwrap();
        world.grid.set_occupant(pos, species.occupant()).unwrap();
        Animal::new(id, species, pos, 100, genome, 11 * id.0)
    }

    fn turn(animal: &mut Animal, world: &mut World) {
        let mut others = Vec::new();
        let mut births = Vec::new();
        let mut ctx = TurnContext::new(world, &mut others, &mut births);
        animal.update(&mut ctx).unwrap();
    }

    #[test]
    fn test_decide_flee() {
        let mut w = world(100);
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        place(&mut w, Species::Carnivore, Position::new(7, 5), carnivore_default_genome());
        assert_eq!(
            decide(&mut herbivore, &w.grid),
            Action::Flee { threat: Position::new(7, 5) }
        );
    }

    #[test]
    fn test_decide_forage_or_graze() {
        let mut w = world(10);
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        assert_eq!(decide(&mut herbivore, &w.grid), Action::Forage);

        // Too tired to go looking: stamina 10 minus speed 2.
        herbivore.exhaust(8);
        assert_eq!(decide(&mut herbivore, &w.grid), Action::Graze);

        let mut lush = world(50);
        let mut fed = place(&mut lush, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        assert_eq!(decide(&mut fed, &lush.grid), Action::Graze);
    }

    #[test]
    fn test_flee_moves_away() {
        let mut w = world(100);
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        let threat = Position::new(7, 5);
        place(&mut w, Species::Carnivore, threat, carnivore_default_genome());

        flee(&mut herbivore, threat, &mut w);
        assert_eq!(herbivore.position(), Position::new(3, 5));
        assert_eq!(herbivore.moves_this_turn(), 2);
        assert_eq!(w.grid.occupant(Position::new(3, 5)), Some(OccupantType::Herbivore));
    }

    #[test]
    fn test_flee_around_obstacles() {
        let mut w = world(100);
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        w.grid.set_occupant(Position::new(4, 5), OccupantType::Water).unwrap();

        flee(&mut herbivore, Position::new(6, 5), &mut w);
        assert!(!herbivore.has_moves_left());
        assert!(herbivore.distance_to(Position::new(5, 5)) <= 2);
    }

    #[test]
    fn test_graze() {
        let mut w = world(50);
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        graze(&mut herbivore, &mut w);
        // metabolism 10 -> 3 energy, 6 grass
        assert_eq!(herbivore.energy(), 103);
        assert_eq!(w.grid.get(Position::new(5, 5)).unwrap().grass_density(), 44);
        assert_eq!(herbivore.moves_this_turn(), 1);
    }

    #[test]
    fn test_no_grazing_on_bare_ground() {
        let mut w = world(0);
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        graze(&mut herbivore, &mut w);
        assert_eq!(herbivore.energy(), 100);
        assert_eq!(herbivore.moves_this_turn(), 0);
    }

    #[test]
    fn test_move_to_grazing_grounds() {
        let mut w = world(0);
        let pasture = w.grid.field_mut(Position::new(9, 5)).unwrap();
        pasture.set_humidity(Humidity::Saturation);
        pasture.recalculate_grass_density();
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());

        move_to_grazing_grounds(&mut herbivore, &mut w);
        assert_eq!(herbivore.position(), Position::new(6, 5));
        assert_eq!(herbivore.moves_this_turn(), 1);
    }

    #[test]
    fn test_turn_on_bare_ground_spends_budget() {
        let mut w = world(0);
        let mut herbivore = place(&mut w, Species::Herbivore, Position::new(5, 5), herbivore_default_genome());
        turn(&mut herbivore, &mut w);
        assert!(herbivore.is_alive());
        assert_eq!(herbivore.moves_this_turn(), 2);
        assert_ne!(herbivore.position(), Position::new(5, 5));
        assert_eq!(w.grid.count(OccupantType::Herbivore), 1);
    }
}
