//! Barriers: rivers, parks, railways and major roads

use crate::ids::{BarrierId, EdgeId};
use geo::LineString;
use serde::{Deserialize, Serialize};

/// Physical kind of a barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierKind {
    Water,
    Park,
    Railway,
    Road,
}

impl BarrierKind {
    /// Natural barriers pedestrians tend to follow
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Water | Self::Park)
    }

    /// Severing barriers pedestrians tend to avoid
    pub fn is_negative(self) -> bool {
        matches!(self, Self::Railway | Self::Road)
    }

    /// Tie-break rank when two barriers are equally far: lower wins
    pub fn priority(self) -> u8 {
        match self {
            Self::Water => 0,
            Self::Park => 1,
            Self::Railway | Self::Road => 2,
        }
    }
}

/// Which barriers an agent orients itself by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierPreference {
    #[default]
    All,
    /// Parks and water
    Positive,
    /// Railways and roads
    Negative,
    /// Everything but parks
    Separating,
}

impl BarrierPreference {
    pub fn accepts(self, kind: BarrierKind) -> bool {
        match self {
            Self::All => true,
            Self::Positive => kind.is_positive(),
            Self::Negative => kind.is_negative(),
            Self::Separating => kind != BarrierKind::Park,
        }
    }
}

/// A barrier geometry and the street segments along it
#[derive(Debug, Clone)]
pub struct Barrier {
    pub id: BarrierId,
    pub kind: BarrierKind,
    pub geometry: LineString<f64>,
    pub edges: Vec<EdgeId>,
}
