//! World simulation engine.
//!
//! This crate implements the bounded 2D grid where herbivores graze, flee and
//! breed while carnivores hunt them, one synchronous turn at a time.

pub mod animal;
pub mod carnivore;
pub mod context;
pub mod grid;
pub mod herbivore;
pub mod ledger;
pub mod retry;
pub mod simulation;
pub mod snapshot;

pub use animal::{Action, Animal, DeathCause};
pub use context::{TurnContext, World};
pub use grid::Grid;
pub use ledger::{Ledger, NewsFeed};
pub use simulation::Simulation;
pub use snapshot::{AnimalSnapshot, FieldSnapshot};
