//! A single cell of the world map.

use crate::types::{Humidity, OccupantType, Position};
use serde::{Deserialize, Serialize};

pub const MAX_GRASS_DENSITY: i32 = 100;

/// One grid cell: occupant, grass cover and local climate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapField {
    position: Position,
    grass_density: i32,
    humidity: Humidity,
    occupant: OccupantType,
    near_water: bool,
}

impl MapField {
    pub fn new(
        position: Position,
        occupant: OccupantType,
        humidity: Humidity,
        grass_density: i32,
    ) -> Self {
        Self {
            position,
            grass_density: grass_density.clamp(0, MAX_GRASS_DENSITY),
            humidity,
            occupant,
            near_water: false,
        }
    }

    /// Grow or decay the grass according to the local humidity.
    /// Water tiles always read as fully grown.
    pub fn recalculate_grass_density(&mut self) {
        self.grass_density =
            (self.grass_density + 2 * self.humidity.value()).clamp(0, MAX_GRASS_DENSITY);
        if self.occupant == OccupantType::Water {
            self.grass_density = MAX_GRASS_DENSITY;
        }
    }

    pub fn reduce_grass_density(&mut self, amount: i32) {
        self.grass_density = (self.grass_density - amount).max(0);
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn grass_density(&self) -> i32 {
        self.grass_density
    }

    pub fn occupant(&self) -> OccupantType {
        self.occupant
    }

    pub fn set_occupant(&mut self, occupant: OccupantType) {
        self.occupant = occupant;
    }

    pub fn is_free(&self) -> bool {
        self.occupant == OccupantType::None
    }

    pub fn humidity(&self) -> Humidity {
        self.humidity
    }

    pub fn set_humidity(&mut self, humidity: Humidity) {
        self.humidity = humidity;
    }

    pub fn is_near_water(&self) -> bool {
        self.near_water
    }

    pub fn set_near_water(&mut self, near_water: bool) {
        self.near_water = near_water;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn field(humidity: Humidity, density: i32) -> MapField {
        MapField::new(Position::new(0, 0), OccupantType::None, humidity, density)
    }

    #[test]
    fn test_grass_growth() {
        let mut f = field(Humidity::Wet, 50);
        f.recalculate_grass_density();
        assert_eq!(f.grass_density(), 52);

        let mut f = field(Humidity::SevereDrought, 50);
        f.recalculate_grass_density();
        assert_eq!(f.grass_density(), 46);

        let mut f = field(Humidity::Dry, 50);
        f.recalculate_grass_density();
        assert_eq!(f.grass_density(), 50);
    }

    #[test]
    fn test_grass_clamped() {
        let mut f = field(Humidity::Saturation, 99);
        f.recalculate_grass_density();
        assert_eq!(f.grass_density(), 100);

        let mut f = field(Humidity::SevereDrought, 3);
        f.recalculate_grass_density();
        assert_eq!(f.grass_density(), 0);

        f.reduce_grass_density(10);
        assert_eq!(f.grass_density(), 0);
    }

    #[test]
    fn test_water_pinned_to_full() {
        let mut f = MapField::new(
            Position::new(1, 1),
            OccupantType::Water,
            Humidity::SevereDrought,
            10,
        );
        f.recalculate_grass_density();
        assert_eq!(f.grass_density(), MAX_GRASS_DENSITY);
    }

    #[test]
    fn test_new_clamps_density() {
        assert_eq!(field(Humidity::Dry, 150).grass_density(), 100);
        assert_eq!(field(Humidity::Dry, -5).grass_density(), 0);
    }

    #[derive(Debug, Clone)]
    enum GrassOp {
        Recalculate,
        Reduce(i32),
        SetHumidity(i64),
    }

    fn grass_op() -> impl Strategy<Value = GrassOp> {
        prop_oneof![
            Just(GrassOp::Recalculate),
            (0..200i32).prop_map(GrassOp::Reduce),
            (-2..=2i64).prop_map(GrassOp::SetHumidity),
        ]
    }

    proptest! {
        #[test]
        fn prop_density_stays_in_range(
            start in -50..200i32,
            water in any::<bool>(),
            ops in proptest::collection::vec(grass_op(), 0..64),
        ) {
            let occupant = if water { OccupantType::Water } else { OccupantType::None };
            let mut f = MapField::new(Position::new(0, 0), occupant, Humidity::Wet, start);
            for op in ops {
                match op {
                    GrassOp::Recalculate => {
                        f.recalculate_grass_density();
                        if water {
                            prop_assert_eq!(f.grass_density(), MAX_GRASS_DENSITY);
                        }
                    }
                    GrassOp::Reduce(amount) => f.reduce_grass_density(amount),
                    GrassOp::SetHumidity(v) => f.set_humidity(Humidity::from_value(v).unwrap()),
                }
                prop_assert!((0..=MAX_GRASS_DENSITY).contains(&f.grass_density()));
            }
        }
    }
}
