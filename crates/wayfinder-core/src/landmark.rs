//! Buildings and their landmark scores

use crate::ids::{BuildingId, RegionId};
use geo::Coord;
use serde::{Deserialize, Serialize};

/// A building, possibly serving as a local or distant landmark
#[derive(Debug, Clone)]
pub struct Building {
    pub id: BuildingId,
    pub coord: Coord<f64>,
    pub region: Option<RegionId>,

    /// Salience as a cue near a junction, in `[0, 1]`
    pub local_landmarkness: f64,

    /// Salience as a directional cue from afar, in `[0, 1]`
    pub global_landmarkness: f64,
}

impl Building {
    pub fn is_landmark(&self) -> bool {
        self.local_landmarkness > 0.0 || self.global_landmarkness > 0.0
    }
}

/// A distant landmark associated with a destination node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub building: BuildingId,

    /// Distance between the landmark and the anchored node
    pub distance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_landmark() {
        let mut building = Building {
            id: BuildingId(0),
            coord: Coord { x: 0.0, y: 0.0 },
            region: None,
            local_landmarkness: 0.0,
            global_landmarkness: 0.0,
        };
        assert!(!building.is_landmark());
        building.global_landmarkness = 0.4;
        assert!(building.is_landmark());
    }
}
