//! Carnivore behaviour: rest, hunt, wander.

use crate::animal::{Action, Animal, DeathCause};
use crate::context::{TurnContext, World};
use crate::grid::Grid;
use eco_core::{Direction, OccupantType, Position};
use rand::Rng;
use tracing::{debug, warn};

/// Energy both fighters lose when the predator loses.
pub const FIGHT_PENALTY: i32 = 30;

/// Exhaustion both fighters gain when the predator loses.
pub const FIGHT_EXHAUSTION: u32 = 2;

/// A carnivore with more energy than this rests when tired.
const RESTING_ENERGY: i32 = 50;

pub fn decide(animal: &mut Animal, grid: &Grid) -> Action {
    let stamina = animal.genome().stamina() as i64;
    let speed = animal.genome().speed() as i64;
    if animal.energy() > RESTING_ENERGY && animal.exhaustion() as i64 > stamina - 2 * speed {
        return Action::Rest;
    }

    match animal.search(OccupantType::Herbivore, grid) {
        Some(prey) => Action::Hunt { prey },
        None => Action::Wander,
    }
}

/// Chase the herbivore at `prey` and attack once adjacent.
///
/// A blocked step turns the pursuit direction clockwise; a successful one
/// re-aims at the prey. The pursuit direction becomes the wandering heading,
/// so a carnivore that loses its prey keeps walking the way it chased.
pub fn hunt(animal: &mut Animal, prey: Position, ctx: &mut TurnContext<'_>) {
    let mut direction = animal.direction_to(prey);
    animal.set_heading(direction);
    while animal.has_moves_left() {
        if animal.distance_to(prey) == 1 {
            attack(animal, prey, ctx);
            return;
        }
        if animal.move_towards(direction, ctx.world) {
            direction = animal.direction_to(prey);
        } else {
            direction = direction.rotate(true);
        }
        if direction != Direction::Center {
            animal.set_heading(direction);
        }
    }
}

/// Fight the herbivore at `prey`. Always ends the carnivore's movement.
pub fn attack(animal: &mut Animal, prey: Position, ctx: &mut TurnContext<'_>) {
    let Some(index) = ctx
        .others
        .iter()
        .position(|h| h.is_alive() && h.position() == prey)
    else {
        warn!(
            animal_id = %animal.id(),
            x = prey.x,
            y = prey.y,
            "Attacked a field without prey"
        );
        animal.end_movement();
        return;
    };

    let prey_strength = ctx.others[index].genome().strength() as i64;
    let roll = animal.rng().gen_range(0..10i64) - 3;
    let won = animal.genome().strength() as i64 > prey_strength + roll;
    ctx.world.ledger.record_fight(won);

    if won {
        let mut victim = ctx.others.remove(index);
        let prey_energy = victim.energy();
        victim.die(DeathCause::Killed, ctx.world);

        let gain = (prey_energy / 2) as f64
            + prey_energy as f64 * animal.genome().metabolism() as f64 * 0.04;
        animal.change_energy(gain as i32, ctx.world);
        let direction = animal.direction_to(prey);
        animal.move_towards(direction, ctx.world);
        debug!(
            event = "hunt",
            animal_id = %animal.id(),
            prey_id = %victim.id(),
            won = true,
            gain = gain as i32,
            "Carnivore killed its prey"
        );
    } else {
        animal.change_energy(-FIGHT_PENALTY, ctx.world);
        animal.exhaust(FIGHT_EXHAUSTION);
        let victim = &mut ctx.others[index];
        victim.change_energy(-FIGHT_PENALTY, ctx.world);
        victim.exhaust(FIGHT_EXHAUSTION);
        debug!(
            event = "hunt",
            animal_id = %animal.id(),
            prey_id = %victim.id(),
            won = false,
            "Prey fought the carnivore off"
        );
        if !victim.is_alive() {
            ctx.others.remove(index);
        }
    }

    animal.end_movement();
}

/// Walk along the persisted heading, turning at random when blocked.
pub fn wander(animal: &mut Animal, world: &mut World) {
    while animal.has_moves_left() {
        let heading = animal.heading();
        if !animal.move_towards(heading, world) {
            let turn = Direction::random(animal.rng());
            animal.set_heading(turn);
        }
    }
}
