//! Grid geometry: tile states, directions, locations and dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of one state a tile can take.
pub type TileState = u64;

/// The four neighbour directions of a 2D grid.
///
/// `UP` points towards row 0, `DOWN` towards the last row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction2D {
    Up,
    Right,
    Down,
    Left,
}

impl Direction2D {
    /// All directions, in clockwise order starting at `UP`.
    pub const ALL: [Direction2D; 4] = [
        Direction2D::Up,
        Direction2D::Right,
        Direction2D::Down,
        Direction2D::Left,
    ];

    /// The opposite direction.
    pub fn mirror(self) -> Self {
        match self {
            Direction2D::Up => Direction2D::Down,
            Direction2D::Right => Direction2D::Left,
            Direction2D::Down => Direction2D::Up,
            Direction2D::Left => Direction2D::Right,
        }
    }

    /// Offset of one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction2D::Up => (0, -1),
            Direction2D::Right => (1, 0),
            Direction2D::Down => (0, 1),
            Direction2D::Left => (-1, 0),
        }
    }

    /// Wire spelling of the direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction2D::Up => "UP",
            Direction2D::Right => "RIGHT",
            Direction2D::Down => "DOWN",
            Direction2D::Left => "LEFT",
        }
    }
}

impl fmt::Display for Direction2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction2D {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Ok(Direction2D::Up),
            "RIGHT" => Ok(Direction2D::Right),
            "DOWN" => Ok(Direction2D::Down),
            "LEFT" => Ok(Direction2D::Left),
            _ => Err(format!("unknown direction: {s}")),
        }
    }
}

/// A cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location2D {
    pub x: usize,
    pub y: usize,
}

impl Location2D {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Width and height of a grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of cells.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Check if a location lies inside the grid.
    pub fn contains(&self, location: Location2D) -> bool {
        location.x < self.width && location.y < self.height
    }

    /// Row-major index of a location.
    pub fn index_of(&self, location: Location2D) -> usize {
        location.x + location.y * self.width
    }

    /// Location of a row-major index.
    pub fn location_of(&self, index: usize) -> Location2D {
        Location2D {
            x: index % self.width,
            y: index / self.width,
        }
    }

    /// The neighbour of `location` in `direction`, if it is inside the grid.
    pub fn neighbour(&self, location: Location2D, direction: Direction2D) -> Option<Location2D> {
        let (dx, dy) = direction.delta();
        let x = location.x.checked_add_signed(dx)?;
        let y = location.y.checked_add_signed(dy)?;
        let neighbour = Location2D { x, y };
        self.contains(neighbour).then_some(neighbour)
    }

    /// All in-grid neighbours of `location`, paired with their direction.
    pub fn neighbours(
        &self,
        location: Location2D,
    ) -> impl Iterator<Item = (Direction2D, Location2D)> + '_ {
        Direction2D::ALL
            .into_iter()
            .filter_map(move |direction| Some((direction, self.neighbour(location, direction)?)))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_serialize_uppercase() {
        let json = serde_json::to_string(&Direction2D::Right).unwrap();
        assert_eq!(json, "\"RIGHT\"");

        let parsed: Direction2D = serde_json::from_str("\"UP\"").unwrap();
        assert_eq!(parsed, Direction2D::Up);
    }

    #[test]
    fn mirror_is_an_involution() {
        for direction in Direction2D::ALL {
            assert_ne!(direction, direction.mirror());
            assert_eq!(direction, direction.mirror().mirror());
        }
    }

    #[test]
    fn neighbours_stay_inside_grid() {
        let dims = Dimensions::new(3, 2);

        let corner: Vec<_> = dims.neighbours(Location2D::new(0, 0)).collect();
        assert_eq!(
            corner,
            vec![
                (Direction2D::Right, Location2D::new(1, 0)),
                (Direction2D::Down, Location2D::new(0, 1)),
            ]
        );

        assert_eq!(dims.neighbours(Location2D::new(1, 1)).count(), 3);
        assert_eq!(dims.neighbour(Location2D::new(2, 1), Direction2D::Right), None);
    }

    #[test]
    fn index_round_trips_location() {
        let dims = Dimensions::new(4, 3);
        let location = Location2D::new(3, 2);
        assert_eq!(dims.index_of(location), 11);
        assert_eq!(dims.location_of(11), location);
        assert_eq!(dims.area(), 12);
    }
}
