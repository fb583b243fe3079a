//! Whole-world tests for the Ecologia simulation.

use eco_core::{
    AnimalId, Genome, Humidity, OccupantType, Position, SimulationConfig, Species,
    START_ENERGY_CARNIVORES, START_NO_CARNIVORES, START_NO_HERBIVORES, WATER_TILES, XSIZE, YSIZE,
};
use eco_world::{Animal, Grid, Simulation};
use proptest::prelude::*;
use std::collections::HashSet;

fn config(size: i64, herbivores: i64, carnivores: i64, water: i64, seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig {
        seed: Some(seed),
        ..Default::default()
    };
    let params = &mut config.parameters;
    params.set(XSIZE, size).unwrap();
    params.set(YSIZE, size).unwrap();
    params.set(START_NO_HERBIVORES, herbivores).unwrap();
    params.set(START_NO_CARNIVORES, carnivores).unwrap();
    params.set(WATER_TILES, water).unwrap();
    config
}

/// Every living animal stands on a field tagged with its species, no two
/// share a field, and the grid holds no stray tags.
fn assert_consistent(sim: &Simulation) {
    let mut seen = HashSet::new();
    for species in [Species::Herbivore, Species::Carnivore] {
        for animal in sim.population(species) {
            assert!(animal.is_alive());
            assert!(animal.energy() > 0);
            assert!(animal.age() < animal.genome().age_limit());
            assert!(sim.grid().contains(animal.position()));
            assert_eq!(
                sim.field(animal.position()).unwrap().occupant(),
                species.occupant()
            );
            assert!(seen.insert(animal.position()), "two animals on one field");
        }
    }
    assert_eq!(sim.grid().count(OccupantType::Herbivore), sim.herbivore_count());
    assert_eq!(sim.grid().count(OccupantType::Carnivore), sim.carnivore_count());
}

#[test]
fn test_full_simulation_cycle() {
    let mut sim = Simulation::new(config(40, 150, 30, 5, 12345)).unwrap();
    assert_consistent(&sim);

    for turn in 1..=80 {
        let summary = sim.step().unwrap();
        assert_eq!(summary.turn, turn);
        assert_eq!(summary.herbivores, sim.herbivore_count());
        assert_eq!(summary.carnivores, sim.carnivore_count());
        assert!((0..=100).contains(&summary.average_grass_density));
        assert!(summary.hunt_success_rate <= 100);
        assert_eq!(sim.grid().count(OccupantType::Water), 5);
        assert_consistent(&sim);

        let prefix = format!("{}: ", turn);
        assert!(sim.drain_news().iter().all(|item| item.starts_with(&prefix)));
    }
}

#[test]
fn test_herbivore_sees_carnivore_at_sight_limit() {
    let mut grid = Grid::new(10, 10, Humidity::Dry, 100);
    grid.set_occupant(Position::new(5, 5), OccupantType::Herbivore).unwrap();
    grid.set_occupant(Position::new(5, 9), OccupantType::Carnivore).unwrap();
    let sighted = Genome::from_values([0, 2, 10, 4, 10, 150, 10, 120, 15, 10, 2]);
    let mut herbivore = Animal::new(
        AnimalId(1),
        Species::Herbivore,
        Position::new(5, 5),
        100,
        sighted,
        7,
    );

    assert_eq!(
        herbivore.search(OccupantType::Carnivore, &grid),
        Some(Position::new(5, 9))
    );
}

#[test]
fn test_strong_carnivore_kills_adjacent_prey() {
    let mut config = config(10, 0, 0, 0, 3);
    // A herbivore that cannot move stays put to be caught.
    config.herbivore_genome = Genome::from_values([0, 0, 10, 4, 10, 150, 10, 120, 15, 10, 2]);
    config.carnivore_genome = Genome::from_values([0, 3, 10, 4, 18, 200, 200, 200, 500, 10, 1]);
    let mut sim = Simulation::empty(config).unwrap();
    sim.spawn(OccupantType::Herbivore, Position::new(5, 5), 100)
        .unwrap();
    sim.spawn(OccupantType::Carnivore, Position::new(6, 5), 100)
        .unwrap();

    let summary = sim.step().unwrap();

    assert_eq!(summary.herbivores, 0);
    assert!(sim.herbivore_at(Position::new(5, 5)).is_none());
    let carnivore = &sim.population(Species::Carnivore)[0];
    assert!(carnivore.energy() > 100);
    assert_eq!(carnivore.position(), Position::new(5, 5));
    assert_eq!(sim.hunt_stats().fights_won, 2);
    assert!(sim
        .drain_news()
        .contains(&"1: A Herbivore has been killed!".to_string()));
}

#[test]
fn test_old_age_death() {
    let mut config = config(10, 0, 0, 0, 9);
    config.herbivore_genome = Genome::from_values([0, 2, 10, 4, 10, 1, 10, 120, 15, 10, 2]);
    let mut sim = Simulation::empty(config).unwrap();
    sim.spawn(OccupantType::Herbivore, Position::new(2, 2), 100)
        .unwrap();

    sim.step().unwrap();

    assert_eq!(sim.herbivore_count(), 0);
    assert!(sim.field(Position::new(2, 2)).unwrap().is_free());
    assert_eq!(sim.drain_news(), vec!["1: A Herbivore has died!".to_string()]);
}

#[test]
fn test_herbivores_breed() {
    let mut config = config(30, 20, 0, 0, 77);
    config.herbivore_genome = Genome::from_values([0, 2, 10, 4, 10, 150, 10, 10, 0, 3, 2]);
    let mut sim = Simulation::new(config).unwrap();
    let founders: HashSet<AnimalId> = sim
        .population(Species::Herbivore)
        .iter()
        .map(Animal::id)
        .collect();
    assert_eq!(founders.len(), 20);

    for _ in 0..10 {
        sim.step().unwrap();
        assert_consistent(&sim);
    }

    assert!(sim.highest_generation() >= 2);
    let young: Vec<_> = sim
        .population(Species::Herbivore)
        .iter()
        .filter(|a| a.generation() > 1)
        .collect();
    assert!(!young.is_empty());
    for child in young {
        assert!(!child.parent().is_none());
        assert!(child.id() > child.parent());
        assert!(!founders.contains(&child.id()));
    }
}

#[test]
fn test_carnivores_starve_without_prey() {
    let mut config = config(20, 0, 10, 0, 5);
    config.parameters.set(START_ENERGY_CARNIVORES, 5).unwrap();
    let mut sim = Simulation::new(config).unwrap();

    let mut last = sim.summary();
    for _ in 0..10 {
        last = sim.step().unwrap();
    }
    assert!(last.is_extinct());
    assert_eq!(sim.grid().count(OccupantType::Carnivore), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_occupancy_stays_consistent(
        seed in any::<u64>(),
        herbivores in 0i64..60,
        carnivores in 0i64..15,
        water in 0i64..4,
    ) {
        let mut sim = Simulation::new(config(16, herbivores, carnivores, water, seed)).unwrap();
        for _ in 0..25 {
            sim.step().unwrap();
            assert_consistent(&sim);
        }
    }
}
