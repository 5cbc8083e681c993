//! Agent route-choice profiles and the strategy decision table

use crate::barrier::BarrierPreference;
use crate::limits::{self, ValidationError};
use serde::{Deserialize, Serialize};

/// Cost minimised on each leg between two sub-goals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalHeuristic {
    /// Shortest perceived walking distance on the primal graph
    #[default]
    RoadDistance,
    /// Least cumulative turning on the dual graph
    AngularChange,
}

/// How on-route marks are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    /// Local landmarkness of the junction's buildings
    Landmarks,
    /// Normalised junction centrality
    Centrality,
}

/// Route-choice pipeline resolved once per agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteStrategy {
    /// A single leg minimising the local heuristic, no sub-goals
    Minimising { heuristic: LocalHeuristic },
    /// Region gateways, optionally refined with barriers and on-route marks
    Regional {
        heuristic: LocalHeuristic,
        barriers: bool,
        marks: Option<MarkKind>,
    },
    /// Barrier sub-goals, optionally with on-route marks between them
    BarrierSubGoals {
        heuristic: LocalHeuristic,
        marks: Option<MarkKind>,
    },
    /// Salient on-route marks
    OnRouteMarks {
        heuristic: LocalHeuristic,
        marks: MarkKind,
    },
    /// A single leg maximising global landmarkness
    GlobalLandmarks,
}

impl RouteStrategy {
    /// Heuristic used by the composer between sub-goals
    pub fn heuristic(&self) -> Option<LocalHeuristic> {
        match *self {
            Self::Minimising { heuristic }
            | Self::Regional { heuristic, .. }
            | Self::BarrierSubGoals { heuristic, .. }
            | Self::OnRouteMarks { heuristic, .. } => Some(heuristic),
            Self::GlobalLandmarks => None,
        }
    }

    /// Whether legs may be discounted by distant landmarks
    pub fn allows_landmark_discount(&self) -> bool {
        !matches!(self, Self::Minimising { .. })
    }

    /// Short stable name, used for per-strategy traffic counters
    pub fn label(&self) -> String {
        let heuristic = |h: LocalHeuristic| match h {
            LocalHeuristic::RoadDistance => "RD",
            LocalHeuristic::AngularChange => "AC",
        };
        let marks = |m: MarkKind| match m {
            MarkKind::Landmarks => "L",
            MarkKind::Centrality => "C",
        };
        match *self {
            Self::Minimising { heuristic: h } => heuristic(h).to_string(),
            Self::Regional {
                heuristic: h,
                barriers,
                marks: m,
            } => {
                let mut label = format!("R{}", heuristic(h));
                if barriers {
                    label.push_str("+B");
                }
                if let Some(m) = m {
                    label.push('+');
                    label.push_str(marks(m));
                }
                label
            }
            Self::BarrierSubGoals { heuristic: h, marks: m } => match m {
                Some(m) => format!("B{}+{}", heuristic(h), marks(m)),
                None => format!("B{}", heuristic(h)),
            },
            Self::OnRouteMarks {
                heuristic: h,
                marks: m,
            } => format!("{}{}", marks(m), heuristic(h)),
            Self::GlobalLandmarks => "GL".to_string(),
        }
    }
}

/// Per-agent route-choice profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProperties {
    pub agent_id: u64,

    /// Cost minimised between sub-goals
    pub local_heuristic: LocalHeuristic,

    /// Ignore every cognitive strategy and just minimise the heuristic
    pub only_minimising: bool,

    pub region_based: bool,

    pub barrier_based: bool,
    pub barrier_preference: BarrierPreference,

    /// Perceive edges along natural barriers as cheaper
    pub prefer_natural_barriers: bool,
    pub natural_barriers_mean: f64,
    pub natural_barriers_sd: f64,

    /// Perceive edges along severing barriers as dearer
    pub avoid_severing_barriers: bool,
    pub severing_barriers_mean: f64,
    pub severing_barriers_sd: f64,

    pub using_local_landmarks: bool,

    /// On-route marks scored by centrality rather than landmarks
    pub using_salient_nodes: bool,

    pub using_distant_landmarks: bool,

    /// Only count distant landmarks that anchor the destination
    pub only_anchors: bool,
}

impl Default for AgentProperties {
    fn default() -> Self {
        Self {
            agent_id: 0,
            local_heuristic: LocalHeuristic::RoadDistance,
            only_minimising: false,
            region_based: false,
            barrier_based: false,
            barrier_preference: BarrierPreference::All,
            prefer_natural_barriers: false,
            natural_barriers_mean: 0.70,
            natural_barriers_sd: 0.10,
            avoid_severing_barriers: false,
            severing_barriers_mean: 1.30,
            severing_barriers_sd: 0.10,
            using_local_landmarks: false,
            using_salient_nodes: false,
            using_distant_landmarks: false,
            only_anchors: false,
        }
    }
}

impl AgentProperties {
    /// An agent that only minimises `heuristic`
    pub fn minimising(heuristic: LocalHeuristic) -> Self {
        Self {
            local_heuristic: heuristic,
            only_minimising: true,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, agent_id: u64) -> Self {
        self.agent_id = agent_id;
        self
    }

    fn marks(&self) -> Option<MarkKind> {
        if self.using_local_landmarks {
            Some(MarkKind::Landmarks)
        } else if self.using_salient_nodes {
            Some(MarkKind::Centrality)
        } else {
            None
        }
    }

    /// Resolve the flag set into one strategy
    ///
    /// | only minimising | region | barrier | marks | distant | strategy            |
    /// |-----------------|--------|---------|-------|---------|---------------------|
    /// | yes             | -      | -       | -     | -       | Minimising          |
    /// | no              | yes    | b       | m     | -       | Regional(b, m)      |
    /// | no              | no     | yes     | m     | -       | BarrierSubGoals(m)  |
    /// | no              | no     | no      | m     | -       | OnRouteMarks(m)     |
    /// | no              | no     | no      | none  | yes     | GlobalLandmarks     |
    /// | no              | no     | no      | none  | no      | Minimising          |
    pub fn strategy(&self) -> RouteStrategy {
        let heuristic = self.local_heuristic;
        if self.only_minimising {
            return RouteStrategy::Minimising { heuristic };
        }
        if self.region_based {
            return RouteStrategy::Regional {
                heuristic,
                barriers: self.barrier_based,
                marks: self.marks(),
            };
        }
        if self.barrier_based {
            return RouteStrategy::BarrierSubGoals {
                heuristic,
                marks: self.marks(),
            };
        }
        if let Some(marks) = self.marks() {
            return RouteStrategy::OnRouteMarks { heuristic, marks };
        }
        if self.using_distant_landmarks {
            return RouteStrategy::GlobalLandmarks;
        }
        RouteStrategy::Minimising { heuristic }
    }

    /// Check the perception parameters are usable
    pub fn validate(&self) -> Result<(), ValidationError> {
        limits::validate_perception("natural_barriers", self.natural_barriers_mean, self.natural_barriers_sd)?;
        limits::validate_perception("severing_barriers", self.severing_barriers_mean, self.severing_barriers_sd)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_minimising_wins() {
        let agent = AgentProperties {
            only_minimising: true,
            region_based: true,
            barrier_based: true,
            using_local_landmarks: true,
            local_heuristic: LocalHeuristic::AngularChange,
            ..Default::default()
        };
        assert_eq!(
            agent.strategy(),
            RouteStrategy::Minimising {
                heuristic: LocalHeuristic::AngularChange
            }
        );
        assert!(!agent.strategy().allows_landmark_discount());
    }

    #[test]
    fn test_decision_table() {
        let regional = AgentProperties {
            region_based: true,
            barrier_based: true,
            using_salient_nodes: true,
            ..Default::default()
        };
        assert_eq!(
            regional.strategy(),
            RouteStrategy::Regional {
                heuristic: LocalHeuristic::RoadDistance,
                barriers: true,
                marks: Some(MarkKind::Centrality),
            }
        );

        let barrier = AgentProperties {
            barrier_based: true,
            using_local_landmarks: true,
            ..Default::default()
        };
        assert_eq!(
            barrier.strategy(),
            RouteStrategy::BarrierSubGoals {
                heuristic: LocalHeuristic::RoadDistance,
                marks: Some(MarkKind::Landmarks),
            }
        );
        assert_eq!(barrier.strategy().label(), "BRD+L");

        let marks = AgentProperties {
            using_local_landmarks: true,
            using_distant_landmarks: true,
            ..Default::default()
        };
        assert!(matches!(
            marks.strategy(),
            RouteStrategy::OnRouteMarks {
                marks: MarkKind::Landmarks,
                ..
            }
        ));

        let global = AgentProperties {
            using_distant_landmarks: true,
            ..Default::default()
        };
        assert_eq!(global.strategy(), RouteStrategy::GlobalLandmarks);
        assert_eq!(global.strategy().heuristic(), None);

        assert!(matches!(
            AgentProperties::default().strategy(),
            RouteStrategy::Minimising { .. }
        ));
    }

    #[test]
    fn test_labels() {
        assert_eq!(AgentProperties::default().strategy().label(), "RD");
        let regional = AgentProperties {
            region_based: true,
            barrier_based: true,
            using_local_landmarks: true,
            local_heuristic: LocalHeuristic::AngularChange,
            ..Default::default()
        };
        assert_eq!(regional.strategy().label(), "RAC+B+L");
    }

    #[test]
    fn test_profile_from_partial_json() {
        let agent: AgentProperties =
            serde_json::from_str(r#"{"agent_id": 4, "region_based": true}"#).unwrap();
        assert_eq!(agent.agent_id, 4);
        assert!(agent.region_based);
        assert_eq!(agent.natural_barriers_mean, 0.70);
    }

    #[test]
    fn test_validate_rejects_negative_sd() {
        let agent = AgentProperties {
            natural_barriers_sd: -0.1,
            ..Default::default()
        };
        assert!(agent.validate().is_err());
        assert!(AgentProperties::default().validate().is_ok());
    }
}
