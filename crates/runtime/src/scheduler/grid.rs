//! Mapping from world locations to scheduling regions.

use stacking_core::{Location, RegionId};

/// Partitions every world into square cells and hashes each cell onto one of
/// `region_count` regions.
///
/// The mapping is a pure function of the location, so every lane agrees on
/// which region owns a given spot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionGrid {
    region_count: u32,
    cell_size: f64,
}

impl RegionGrid {
    /// Side length of a cell, in blocks.
    pub const DEFAULT_CELL_SIZE: f64 = 256.0;

    /// `region_count` is at least 1; a non-positive cell size falls back to
    /// [`Self::DEFAULT_CELL_SIZE`].
    pub fn new(region_count: u32, cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            Self::DEFAULT_CELL_SIZE
        };
        Self {
            region_count: region_count.max(1),
            cell_size,
        }
    }

    pub fn region_count(&self) -> u32 {
        self.region_count
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionId> {
        (0..self.region_count).map(RegionId)
    }

    pub fn region_of(&self, location: &Location) -> RegionId {
        let cell_x = (location.position.x / self.cell_size).floor() as i64;
        let cell_z = (location.position.z / self.cell_size).floor() as i64;

        let mut hash = u64::from(location.world.0).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        hash ^= (cell_x as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        hash = hash.rotate_left(31);
        hash ^= (cell_z as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
        hash ^= hash >> 29;

        RegionId((hash % u64::from(self.region_count)) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacking_core::WorldId;

    #[test]
    fn locations_in_one_cell_share_a_region() {
        let grid = RegionGrid::new(8, 16.0);
        let a = grid.region_of(&Location::at(WorldId(0), 1.0, 64.0, 1.0));
        let b = grid.region_of(&Location::at(WorldId(0), 15.9, 0.0, 15.9));
        assert_eq!(a, b);
    }

    #[test]
    fn regions_stay_in_range_for_negative_coordinates() {
        let grid = RegionGrid::new(3, 16.0);
        for x in [-1000.0, -16.0, -0.5, 0.0, 17.0, 4096.0] {
            let region = grid.region_of(&Location::at(WorldId(2), x, 0.0, -x));
            assert!(region.0 < 3);
        }
    }

    #[test]
    fn degenerate_parameters_are_repaired() {
        let grid = RegionGrid::new(0, -1.0);
        assert_eq!(grid.region_count(), 1);
        assert_eq!(grid.regions().collect::<Vec<_>>(), vec![RegionId(0)]);
        assert_eq!(grid.region_of(&Location::at(WorldId(9), 1e9, 0.0, -1e9)), RegionId(0));
    }
}
