//! Tunable planner constants

use crate::error::{Result, RoutingError};
use serde::{Deserialize, Serialize};
use wayfinder_core::limits::{self, GATEWAY_CONE_DEGREES, VIEW_FIELD_APERTURE_DEGREES};

/// Planner configuration; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Spread of the baseline perception error around 1.0
    pub perception_sd: f64,

    /// Landmark discounts only apply farther than this from the destination (m)
    pub visibility_threshold: f64,

    /// Share of a road-distance cost that global landmarkness can discount
    pub global_landmark_weight_distance: f64,

    /// Share of an angular cost that global landmarkness can discount
    pub global_landmark_weight_angular: f64,

    /// Starting centrality percentile for salient nodes
    pub salient_percentile: f64,
    pub percentile_step: f64,
    pub percentile_floor: f64,

    /// Stop adding on-route marks once wayfinding easiness reaches this
    pub easiness_threshold: f64,

    pub landmark_weight: f64,
    pub gain_weight: f64,
    pub regional_landmark_weight: f64,
    pub regional_gain_weight: f64,

    /// Mark search radius growth per retry, as a share of the remaining distance
    pub radius_growth: f64,

    /// Aperture of the barrier view field (degrees)
    pub view_field_aperture: f64,

    /// Half-width of the gateway direction cone (degrees)
    pub gateway_cone: f64,

    /// Confine road-distance legs to the convex hull around their endpoints,
    /// grown by this many metres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hull_buffer: Option<f64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            perception_sd: 0.10,
            visibility_threshold: 300.0,
            global_landmark_weight_distance: 0.85,
            global_landmark_weight_angular: 0.85,
            salient_percentile: 0.75,
            percentile_step: 0.05,
            percentile_floor: 0.50,
            easiness_threshold: 0.95,
            landmark_weight: 0.6,
            gain_weight: 0.4,
            regional_landmark_weight: 0.5,
            regional_gain_weight: 0.5,
            radius_growth: 0.10,
            view_field_aperture: VIEW_FIELD_APERTURE_DEGREES,
            gateway_cone: GATEWAY_CONE_DEGREES,
            hull_buffer: None,
        }
    }
}

impl PlannerConfig {
    pub fn with_hull_buffer(mut self, buffer: f64) -> Self {
        self.hull_buffer = Some(buffer);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let check = || -> std::result::Result<(), limits::ValidationError> {
            limits::validate_perception("perception", 1.0, self.perception_sd)?;
            limits::validate_distance("visibility_threshold", self.visibility_threshold)?;
            limits::validate_fraction("global_landmark_weight_distance", self.global_landmark_weight_distance)?;
            limits::validate_fraction("global_landmark_weight_angular", self.global_landmark_weight_angular)?;
            limits::validate_fraction("salient_percentile", self.salient_percentile)?;
            limits::validate_fraction("percentile_step", self.percentile_step)?;
            limits::validate_fraction("percentile_floor", self.percentile_floor)?;
            limits::validate_fraction("easiness_threshold", self.easiness_threshold)?;
            limits::validate_fraction("landmark_weight", self.landmark_weight)?;
            limits::validate_fraction("gain_weight", self.gain_weight)?;
            limits::validate_fraction("regional_landmark_weight", self.regional_landmark_weight)?;
            limits::validate_fraction("regional_gain_weight", self.regional_gain_weight)?;
            limits::validate_fraction("radius_growth", self.radius_growth)?;
            limits::validate_distance("view_field_aperture", self.view_field_aperture)?;
            limits::validate_distance("gateway_cone", self.gateway_cone)?;
            if let Some(buffer) = self.hull_buffer {
                limits::validate_distance("hull_buffer", buffer)?;
            }
            Ok(())
        };
        check().map_err(RoutingError::InvalidConfig)
    }
}
