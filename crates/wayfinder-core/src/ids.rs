//! Integer arena identifiers for world-model objects

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position of this id in its owning arena
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Node in a graph arena (a junction in the primal graph, a street segment in the dual graph)
    NodeId,
    "n"
);
arena_id!(
    /// Edge in a graph arena
    EdgeId,
    "e"
);
arena_id!(
    /// Region of the primal graph
    RegionId,
    "r"
);
arena_id!(
    /// Barrier geometry (river, park, railway, major road)
    BarrierId,
    "b"
);
arena_id!(
    /// Building, possibly acting as a landmark
    BuildingId,
    "bld"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_index() {
        let node = NodeId::new(7);
        assert_eq!(node.index(), 7);
        assert_eq!(node.to_string(), "n7");
        assert_eq!(RegionId(3).to_string(), "r3");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&EdgeId(12)).unwrap();
        assert_eq!(json, "12");
        let back: EdgeId = serde_json::from_str("12").unwrap();
        assert_eq!(back, EdgeId(12));
    }
}
