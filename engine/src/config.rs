//! Engine configuration
//!
//! Every tunable constant of the engine lives here with its default. The
//! struct is plain serde data so a host application can load it from files
//! or environment variables with whatever layering it already uses.

use crate::anthropometry::WhrPolicy;
use crate::energy::GoalAdjustmentBounds;
use crate::errors::EngineError;
use crate::goal_planner::PlannerConfig;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cut points used to classify the waist-hip ratio
    pub whr_policy: WhrPolicy,
    /// Allowed deficit/surplus around GET
    pub goal_adjustment: GoalAdjustmentBounds,
    /// Targets under this intake are flagged (not clamped)
    pub minimum_intake_kcal: f64,
    /// Weekly rate bands for the goal planner
    pub planner: PlannerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            whr_policy: WhrPolicy::default(),
            goal_adjustment: GoalAdjustmentBounds::default(),
            minimum_intake_kcal: 1200.0,
            planner: PlannerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reject settings that would make the engine contradict itself
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.goal_adjustment.min_kcal > self.goal_adjustment.max_kcal {
            return Err(EngineError::InvalidConfig(format!(
                "goal_adjustment.min_kcal ({}) exceeds max_kcal ({})",
                self.goal_adjustment.min_kcal, self.goal_adjustment.max_kcal
            )));
        }
        if !self.minimum_intake_kcal.is_finite() || self.minimum_intake_kcal < 0.0 {
            return Err(EngineError::InvalidConfig(
                "minimum_intake_kcal must be a non-negative number".to_string(),
            ));
        }
        self.planner
            .validate()
            .map_err(|e| EngineError::InvalidConfig(format!("planner: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.whr_policy, WhrPolicy::Unisex);
        assert_eq!(config.goal_adjustment.min_kcal, -1000);
        assert_eq!(config.goal_adjustment.max_kcal, 1000);
        assert_eq!(config.minimum_intake_kcal, 1200.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"whr_policy":"sex_specific"}"#).unwrap();
        assert_eq!(config.whr_policy, WhrPolicy::SexSpecific);
        assert_eq!(config.planner, PlannerConfig::default());
    }

    #[test]
    fn test_inverted_adjustment_bounds_rejected() {
        let mut config = EngineConfig::default();
        config.goal_adjustment = GoalAdjustmentBounds {
            min_kcal: 500,
            max_kcal: -500,
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }
}
