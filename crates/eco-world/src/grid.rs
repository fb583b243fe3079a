//! Bounded 2D grid for the world.

use eco_core::{Error, Humidity, MapField, OccupantType, Position, Result};
use serde::{Deserialize, Serialize};

/// Cells within this Chebyshev radius of a water tile count as near water.
pub const NEAR_WATER_RADIUS: i32 = 2;

/// A bounded, row-major grid of map fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    fields: Vec<MapField>,
}

impl Grid {
    /// Create a grid where every field carries the same humidity and grass
    /// density and nothing stands anywhere.
    pub fn new(width: i32, height: i32, humidity: Humidity, grass_density: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let fields = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .map(|pos| MapField::new(pos, OccupantType::None, humidity, grass_density))
            .collect();
        Self {
            width,
            height,
            fields,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn get(&self, pos: Position) -> Option<&MapField> {
        self.index(pos).map(|i| &self.fields[i])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut MapField> {
        self.index(pos).map(move |i| &mut self.fields[i])
    }

    /// Field at `pos`, or `OutOfBounds`.
    pub fn field(&self, pos: Position) -> Result<&MapField> {
        self.get(pos).ok_or(Error::OutOfBounds { x: pos.x, y: pos.y })
    }

    pub fn field_mut(&mut self, pos: Position) -> Result<&mut MapField> {
        self.get_mut(pos).ok_or(Error::OutOfBounds { x: pos.x, y: pos.y })
    }

    /// Occupant at `pos`; `None` outside the grid.
    pub fn occupant(&self, pos: Position) -> Option<OccupantType> {
        self.get(pos).map(MapField::occupant)
    }

    /// Whether `pos` is inside the grid and nothing stands there.
    pub fn is_free(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(MapField::is_free)
    }

    pub fn set_occupant(&mut self, pos: Position, occupant: OccupantType) -> Result<()> {
        self.field_mut(pos)?.set_occupant(occupant);
        Ok(())
    }

    /// Positions of the square window of the given radius around `center`,
    /// clipped to the grid.
    ///
    /// Both bounds are inclusive on purpose, so the window is symmetric and
    /// an animal with sight `n` sees exactly `n` fields in every direction.
    /// A half-open scan (`x < center.x + radius`) would stop one short on the
    /// right and bottom edges.
    pub fn window(&self, center: Position, radius: i32) -> impl Iterator<Item = Position> {
        let radius = radius.clamp(0, self.width.max(self.height));
        let x_range = (center.x - radius).max(0)..=(center.x + radius).min(self.width - 1);
        let y_range = (center.y - radius).max(0)..=(center.y + radius).min(self.height - 1);
        y_range.flat_map(move |y| x_range.clone().map(move |x| Position::new(x, y)))
    }

    /// Flag the area around a water tile as near water and saturate it.
    pub fn mark_near_water(&mut self, center: Position) {
        let area: Vec<Position> = self.window(center, NEAR_WATER_RADIUS).collect();
        for pos in area {
            if let Some(field) = self.get_mut(pos) {
                field.set_near_water(true);
                field.set_humidity(Humidity::Saturation);
            }
        }
    }

    /// Apply the world humidity to every field away from water, then grow
    /// or decay the grass everywhere.
    pub fn recalculate(&mut self, humidity: Humidity) {
        for field in &mut self.fields {
            if !field.is_near_water() {
                field.set_humidity(humidity);
            }
            field.recalculate_grass_density();
        }
    }

    /// Mean grass density over all fields, truncated.
    pub fn average_grass_density(&self) -> i32 {
        let total: i64 = self.fields.iter().map(|f| f.grass_density() as i64).sum();
        (total / self.fields.len().max(1) as i64) as i32
    }

    pub fn free_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.fields
            .iter()
            .filter(|f| f.is_free())
            .map(MapField::position)
    }

    pub fn count(&self, occupant: OccupantType) -> usize {
        self.fields.iter().filter(|f| f.occupant() == occupant).count()
    }

    /// Iterator over all fields in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &MapField> + '_ {
        self.fields.iter()
    }
}
