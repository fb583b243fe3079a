//! Read-only, serialisable views of world state for display and inspection.

use crate::animal::Animal;
use eco_core::{AnimalId, Genome, Humidity, MapField, OccupantType, Position, Species};
use serde::{Deserialize, Serialize};

/// What a renderer needs to draw one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub position: Position,
    pub occupant: OccupantType,
    pub grass_density: i32,
    pub humidity: Humidity,
    pub near_water: bool,
}

impl From<&MapField> for FieldSnapshot {
    fn from(field: &MapField) -> Self {
        Self {
            position: field.position(),
            occupant: field.occupant(),
            grass_density: field.grass_density(),
            humidity: field.humidity(),
            near_water: field.is_near_water(),
        }
    }
}

/// Identity, vitals and genome of one animal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    pub id: AnimalId,
    pub parent: AnimalId,
    pub species: Species,
    pub position: Position,
    pub age: u32,
    pub energy: i32,
    pub exhaustion: u32,
    pub generation: u32,
    pub offspring: u32,
    pub genome: Genome,
}

impl From<&Animal> for AnimalSnapshot {
    fn from(animal: &Animal) -> Self {
        Self {
            id: animal.id(),
            parent: animal.parent(),
            species: animal.species(),
            position: animal.position(),
            age: animal.age(),
            energy: animal.energy(),
            exhaustion: animal.exhaustion(),
            generation: animal.generation(),
            offspring: animal.offspring(),
            genome: *animal.genome(),
        }
    }
}
