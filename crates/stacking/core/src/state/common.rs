use std::fmt;

/// Unique identifier for any entity known to the host world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a world (dimension) hosted by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldId(pub u32);

impl WorldId {
    pub const OVERWORLD: Self = Self(0);
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world-{}", self.0)
    }
}

/// Identifier of a scheduling region on regionized hosts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region-{}", self.0)
    }
}

/// Continuous position inside a world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[inline]
    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns true if `other` lies inside the axis-aligned cube of the given
    /// half extent centered on `self`.
    #[inline]
    pub fn within_cube(&self, other: &Position, half_extent: f64) -> bool {
        (self.x - other.x).abs() <= half_extent
            && (self.y - other.y).abs() <= half_extent
            && (self.z - other.z).abs() <= half_extent
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Position qualified by the world it belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub world: WorldId,
    pub position: Position,
}

impl Location {
    pub const fn new(world: WorldId, position: Position) -> Self {
        Self { world, position }
    }

    pub const fn at(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self::new(world, Position::new(x, y, z))
    }

    /// Returns a copy moved upward by `dy`.
    pub fn offset_y(&self, dy: f64) -> Self {
        Self {
            world: self.world,
            position: Position::new(self.position.x, self.position.y + dy, self.position.z),
        }
    }

    /// Squared distance, or `None` when the locations are in different worlds.
    pub fn distance_squared(&self, other: &Location) -> Option<f64> {
        (self.world == other.world).then(|| self.position.distance_squared(&other.position))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.world, self.position)
    }
}

/// An external actor (typically a player) whose presence gates stacking work.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observer {
    pub id: EntityId,
    pub location: Location,
    pub online: bool,
    pub dead: bool,
}

impl Observer {
    pub fn new(id: EntityId, location: Location) -> Self {
        Self {
            id,
            location,
            online: true,
            dead: false,
        }
    }

    /// Observers that count for the sweep snapshot.
    pub fn is_active(&self) -> bool {
        self.online && !self.dead
    }
}
