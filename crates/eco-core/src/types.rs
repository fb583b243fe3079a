//! Core type definitions for the simulation.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique, monotonically increasing identifier for an animal.
///
/// The value `0` is reserved to mean "no animal" (e.g. the parent of a
/// wild-spawned individual).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(pub u64);

impl AnimalId {
    pub const NONE: AnimalId = AnimalId(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The neighbouring position one step in `direction`.
    pub fn offset(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Chebyshev distance: the number of 8-way steps needed to reach `other`.
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// 8-way bearing from this position towards `target`.
    pub fn direction_to(&self, target: &Position) -> Direction {
        use std::cmp::Ordering::*;
        match (target.x.cmp(&self.x), target.y.cmp(&self.y)) {
            (Equal, Greater) => Direction::Down,
            (Equal, Less) => Direction::Up,
            (Greater, Equal) => Direction::Right,
            (Less, Equal) => Direction::Left,
            (Greater, Greater) => Direction::BottomRight,
            (Less, Greater) => Direction::BottomLeft,
            (Greater, Less) => Direction::TopRight,
            (Less, Less) => Direction::TopLeft,
            (Equal, Equal) => Direction::Center,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

/// Direction for movement. The y axis grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    TopRight,
    Right,
    BottomRight,
    Down,
    BottomLeft,
    Left,
    TopLeft,
    Center,
}

impl Direction {
    /// The eight compass directions in canonical (clockwise from up) order.
    pub const COMPASS: [Direction; 8] = [
        Direction::Up,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Down,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Down => (0, 1),
            Direction::BottomLeft => (-1, 1),
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
            Direction::Center => (0, 0),
        }
    }

    /// Direction for a canonical index; anything outside `0..8` is `Center`.
    pub fn from_index(index: usize) -> Self {
        Self::COMPASS.get(index).copied().unwrap_or(Direction::Center)
    }

    /// Canonical index, `None` for `Center`.
    pub fn to_index(&self) -> Option<usize> {
        Self::COMPASS.iter().position(|d| d == self)
    }

    pub fn opposite(&self) -> Self {
        match self.to_index() {
            Some(i) => Self::from_index((i + 4) % 8),
            None => Direction::Center,
        }
    }

    /// Step one compass point clockwise or anticlockwise. `Center` maps to itself.
    pub fn rotate(&self, clockwise: bool) -> Self {
        match self.to_index() {
            Some(i) if clockwise => Self::from_index((i + 1) % 8),
            Some(i) => Self::from_index((i + 7) % 8),
            None => Direction::Center,
        }
    }

    /// Uniformly random non-center direction.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_index(rng.gen_range(0..8))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::TopRight => "top right",
            Direction::Right => "right",
            Direction::BottomRight => "bottom right",
            Direction::Down => "down",
            Direction::BottomLeft => "bottom left",
            Direction::Left => "left",
            Direction::TopLeft => "top left",
            Direction::Center => "center",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What occupies a map field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupantType {
    #[default]
    None,
    Herbivore,
    Carnivore,
    Water,
}

impl OccupantType {
    pub fn to_int(&self) -> i32 {
        match self {
            OccupantType::None => 0,
            OccupantType::Herbivore => 1,
            OccupantType::Carnivore => 2,
            OccupantType::Water => 3,
        }
    }

    /// Unknown codes decode to `None`.
    pub fn from_int(code: i32) -> Self {
        match code {
            1 => OccupantType::Herbivore,
            2 => OccupantType::Carnivore,
            3 => OccupantType::Water,
            _ => OccupantType::None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OccupantType::None => "None",
            OccupantType::Herbivore => "Herbivore",
            OccupantType::Carnivore => "Carnivore",
            OccupantType::Water => "Water",
        }
    }

    /// Unknown names decode to `None`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Herbivore" => OccupantType::Herbivore,
            "Carnivore" => OccupantType::Carnivore,
            "Water" => OccupantType::Water,
            _ => OccupantType::None,
        }
    }
}

impl fmt::Display for OccupantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two kinds of animal in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    /// The tag a field carries while this species stands on it.
    pub fn occupant(&self) -> OccupantType {
        match self {
            Species::Herbivore => OccupantType::Herbivore,
            Species::Carnivore => OccupantType::Carnivore,
        }
    }
}

impl TryFrom<OccupantType> for Species {
    type Error = Error;

    fn try_from(kind: OccupantType) -> Result<Self> {
        match kind {
            OccupantType::Herbivore => Ok(Species::Herbivore),
            OccupantType::Carnivore => Ok(Species::Carnivore),
            other => Err(Error::InvalidOccupant(other)),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.occupant().name())
    }
}

/// Discrete humidity levels, driving grass growth and decay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Humidity {
    SevereDrought,
    Drought,
    #[default]
    Dry,
    Wet,
    Saturation,
}

impl Humidity {
    pub fn value(&self) -> i32 {
        match self {
            Humidity::SevereDrought => -2,
            Humidity::Drought => -1,
            Humidity::Dry => 0,
            Humidity::Wet => 1,
            Humidity::Saturation => 2,
        }
    }

    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            -2 => Ok(Humidity::SevereDrought),
            -1 => Ok(Humidity::Drought),
            0 => Ok(Humidity::Dry),
            1 => Ok(Humidity::Wet),
            2 => Ok(Humidity::Saturation),
            _ => Err(Error::InvalidParameter {
                key: "humidity".to_string(),
                value,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Humidity::SevereDrought => "Severe Drought",
            Humidity::Drought => "Drought",
            Humidity::Dry => "Dry",
            Humidity::Wet => "Wet",
            Humidity::Saturation => "Saturation",
        }
    }
}

impl fmt::Display for Humidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Humidity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Severe Drought" => Ok(Humidity::SevereDrought),
            "Drought" => Ok(Humidity::Drought),
            "Dry" => Ok(Humidity::Dry),
            "Wet" => Ok(Humidity::Wet),
            "Saturation" => Ok(Humidity::Saturation),
            other => Err(Error::Serialization(format!("unknown humidity level '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_chebyshev_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.chebyshev_distance(&pos2), 4);
        assert_eq!(pos2.chebyshev_distance(&pos1), 4);
        assert_eq!(pos1.chebyshev_distance(&pos1), 0);
    }

    #[test]
    fn test_direction_to() {
        let origin = Position::new(5, 5);
        assert_eq!(origin.direction_to(&Position::new(5, 9)), Direction::Down);
        assert_eq!(origin.direction_to(&Position::new(5, 1)), Direction::Up);
        assert_eq!(origin.direction_to(&Position::new(8, 5)), Direction::Right);
        assert_eq!(origin.direction_to(&Position::new(2, 5)), Direction::Left);
        assert_eq!(origin.direction_to(&Position::new(9, 6)), Direction::BottomRight);
        assert_eq!(origin.direction_to(&Position::new(4, 9)), Direction::BottomLeft);
        assert_eq!(origin.direction_to(&Position::new(7, 0)), Direction::TopRight);
        assert_eq!(origin.direction_to(&Position::new(0, 0)), Direction::TopLeft);
        assert_eq!(origin.direction_to(&origin), Direction::Center);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Up.to_delta(), (0, -1));
        assert_eq!(Direction::Down.to_delta(), (0, 1));
        assert_eq!(Direction::Right.to_delta(), (1, 0));
        assert_eq!(Direction::Left.to_delta(), (-1, 0));
        assert_eq!(Direction::Center.to_delta(), (0, 0));
        assert_eq!(Position::new(2, 2).offset(Direction::TopLeft), Position::new(1, 1));
    }

    #[test]
    fn test_opposite_and_rotation() {
        for dir in Direction::COMPASS {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.rotate(true).rotate(false), dir);
            let (dx, dy) = dir.to_delta();
            assert_eq!(dir.opposite().to_delta(), (-dx, -dy));
        }
        assert_eq!(Direction::Up.rotate(true), Direction::TopRight);
        assert_eq!(Direction::TopLeft.rotate(true), Direction::Up);
        assert_eq!(Direction::Up.rotate(false), Direction::TopLeft);
        assert_eq!(Direction::Center.rotate(true), Direction::Center);
        assert_eq!(Direction::Center.opposite(), Direction::Center);
    }

    #[test]
    fn test_direction_indices() {
        for (i, dir) in Direction::COMPASS.iter().enumerate() {
            assert_eq!(Direction::from_index(i), *dir);
            assert_eq!(dir.to_index(), Some(i));
        }
        assert_eq!(Direction::from_index(8), Direction::Center);
        assert_eq!(Direction::Center.to_index(), None);
    }

    #[test]
    fn test_random_direction_never_center() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            assert_ne!(Direction::random(&mut rng), Direction::Center);
        }
    }

    #[test]
    fn test_occupant_codes() {
        for kind in [
            OccupantType::None,
            OccupantType::Herbivore,
            OccupantType::Carnivore,
            OccupantType::Water,
        ] {
            assert_eq!(OccupantType::from_int(kind.to_int()), kind);
            assert_eq!(OccupantType::from_name(kind.name()), kind);
        }
        assert_eq!(OccupantType::from_int(42), OccupantType::None);
    }

    #[test]
    fn test_species_conversion() {
        assert_eq!(Species::try_from(OccupantType::Herbivore).unwrap(), Species::Herbivore);
        assert_eq!(Species::Carnivore.occupant(), OccupantType::Carnivore);
        assert!(matches!(
            Species::try_from(OccupantType::Water),
            Err(Error::InvalidOccupant(OccupantType::Water))
        ));
    }

    #[test]
    fn test_humidity_values() {
        for value in -2..=2 {
            assert_eq!(Humidity::from_value(value).unwrap().value() as i64, value);
        }
        assert!(Humidity::from_value(3).is_err());
        assert_eq!("Severe Drought".parse::<Humidity>().unwrap(), Humidity::SevereDrought);
        assert!("Monsoon".parse::<Humidity>().is_err());
    }
}
