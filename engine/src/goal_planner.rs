//! Weight goal viability planning
//!
//! Rates are expressed as a percentage of the initial body weight per week,
//! which scales the safe pace to the patient instead of using one absolute
//! kg/week figure for everybody. Loss and gain have separate bands.

use crate::errors::EngineError;
use crate::validation::validate_weight;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Below this |Δ| (kg) a goal counts as maintenance
const MAINTENANCE_TOLERANCE_KG: f64 = 1e-6;

/// Upper edges of the weekly-rate bands, in % of initial body weight per week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBands {
    /// Up to here the goal scores 5; also the pace behind the ideal deadline
    pub conservative_pct: f64,
    /// Up to here the goal scores 4
    pub good_pct: f64,
    /// Up to here the goal scores 3; the maximum safe pace behind the minimum deadline
    pub moderate_pct: f64,
    /// Up to here the goal scores 2, beyond it 1
    pub aggressive_pct: f64,
}

impl RateBands {
    pub fn validate(&self) -> Result<(), String> {
        let edges = [
            self.conservative_pct,
            self.good_pct,
            self.moderate_pct,
            self.aggressive_pct,
        ];
        if edges.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err("rate bands must be positive numbers".to_string());
        }
        if edges.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err("rate bands must be in ascending order".to_string());
        }
        Ok(())
    }

    /// Viability score for a weekly rate; never increases as the rate grows
    pub fn score(&self, weekly_rate_pct: f64) -> u8 {
        if weekly_rate_pct <= self.conservative_pct {
            5
        } else if weekly_rate_pct <= self.good_pct {
            4
        } else if weekly_rate_pct <= self.moderate_pct {
            3
        } else if weekly_rate_pct <= self.aggressive_pct {
            2
        } else {
            1
        }
    }
}

/// Planner constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub loss: RateBands,
    pub gain: RateBands,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            loss: RateBands {
                conservative_pct: 0.5,
                good_pct: 0.75,
                moderate_pct: 1.0,
                aggressive_pct: 1.5,
            },
            gain: RateBands {
                conservative_pct: 0.25,
                good_pct: 0.375,
                moderate_pct: 0.5,
                aggressive_pct: 0.75,
            },
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.loss.validate().map_err(|e| format!("loss {}", e))?;
        self.gain.validate().map_err(|e| format!("gain {}", e))
    }

    pub fn bands(&self, direction: GoalDirection) -> &RateBands {
        match direction {
            GoalDirection::Gain => &self.gain,
            GoalDirection::Loss | GoalDirection::Maintenance => &self.loss,
        }
    }
}

/// Direction of the weight change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    Loss,
    Gain,
    Maintenance,
}

/// How far past the safe pace a goal is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    High,
    VeryHigh,
}

impl WarningSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            WarningSeverity::High => "High risk",
            WarningSeverity::VeryHigh => "Very high risk",
        }
    }
}

/// Warning attached to a goal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWarning {
    pub severity: WarningSeverity,
    pub message: String,
}

/// Outcome of planning a weight goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub initial_weight_kg: f64,
    pub target_weight_kg: f64,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    pub direction: GoalDirection,
    /// Signed change, negative for loss
    pub delta_kg: f64,
    pub weeks_available: f64,
    pub required_weekly_rate_kg: f64,
    pub required_weekly_rate_pct: f64,
    /// 1 (unsafe) to 5 (comfortably safe)
    pub viability_score: u8,
    pub warnings: Vec<GoalWarning>,
    /// Days needed at the maximum safe pace; absent for maintenance goals
    pub minimum_deadline_days: Option<u32>,
    /// Days needed at the conservative pace; absent for maintenance goals
    pub ideal_deadline_days: Option<u32>,
    pub minimum_deadline_date: Option<NaiveDate>,
    pub ideal_deadline_date: Option<NaiveDate>,
}

fn validate_goal_weight(field: &str, weight_kg: f64) -> Result<(), EngineError> {
    validate_weight(weight_kg).map_err(|message| {
        EngineError::Validation(format!("{}: {}", field, message))
    })
}

/// Days to cover `change_kg` at `weekly_pct` % of `initial_weight_kg` per week
fn deadline_days(change_kg: f64, initial_weight_kg: f64, weekly_pct: f64) -> u32 {
    let weekly_kg = initial_weight_kg * weekly_pct / 100.0;
    (change_kg / weekly_kg * 7.0).ceil() as u32
}

/// Rate the safety of reaching `target_weight_kg` by `target_date`
///
/// # Errors
///
/// `InvalidDateRange` when `target_date` is not after `start_date`,
/// `Validation` for weights outside the plausible range and `InvalidConfig` for incoherent
/// rate bands.
pub fn plan_goal_viability(
    initial_weight_kg: f64,
    target_weight_kg: f64,
    start_date: NaiveDate,
    target_date: NaiveDate,
    config: &PlannerConfig,
) -> Result<GoalPlan, EngineError> {
    validate_goal_weight("Initial weight", initial_weight_kg)?;
    validate_goal_weight("Target weight", target_weight_kg)?;
    config.validate().map_err(EngineError::InvalidConfig)?;

    let days = (target_date - start_date).num_days();
    if days <= 0 {
        return Err(EngineError::InvalidDateRange {
            start: start_date,
            target: target_date,
        });
    }

    let delta_kg = target_weight_kg - initial_weight_kg;
    let change_kg = delta_kg.abs();
    let direction = if change_kg < MAINTENANCE_TOLERANCE_KG {
        GoalDirection::Maintenance
    } else if delta_kg < 0.0 {
        GoalDirection::Loss
    } else {
        GoalDirection::Gain
    };

    let weeks_available = days as f64 / 7.0;
    let required_weekly_rate_kg = change_kg / weeks_available;
    let required_weekly_rate_pct = required_weekly_rate_kg / initial_weight_kg * 100.0;

    let bands = config.bands(direction);
    let (viability_score, minimum_deadline_days, ideal_deadline_days) =
        if direction == GoalDirection::Maintenance {
            (5, None, None)
        } else {
            (
                bands.score(required_weekly_rate_pct),
                Some(deadline_days(change_kg, initial_weight_kg, bands.moderate_pct)),
                Some(deadline_days(change_kg, initial_weight_kg, bands.conservative_pct)),
            )
        };

    let mut warnings = Vec::new();
    if direction != GoalDirection::Maintenance && required_weekly_rate_pct > bands.moderate_pct {
        let severity = if required_weekly_rate_pct > bands.aggressive_pct {
            WarningSeverity::VeryHigh
        } else {
            WarningSeverity::High
        };
        let verb = if direction == GoalDirection::Loss { "lose" } else { "gain" };
        warnings.push(GoalWarning {
            severity,
            message: format!(
                "{}: the goal requires you to {} {:.2} kg/week ({:.2}% of body weight), above the safe maximum of {:.2}%/week",
                severity.label(),
                verb,
                required_weekly_rate_kg,
                required_weekly_rate_pct,
                bands.moderate_pct
            ),
        });
    }

    // Past the last representable date there is no deadline to show
    let offset =
        |days: u32| start_date.checked_add_signed(Duration::days(i64::from(days)));

    debug!(
        ?direction,
        required_weekly_rate_pct,
        viability_score,
        "Goal viability planned"
    );

    Ok(GoalPlan {
        initial_weight_kg,
        target_weight_kg,
        start_date,
        target_date,
        direction,
        delta_kg,
        weeks_available,
        required_weekly_rate_kg,
        required_weekly_rate_pct,
        viability_score,
        warnings,
        minimum_deadline_days,
        ideal_deadline_days,
        minimum_deadline_date: minimum_deadline_days.and_then(offset),
        ideal_deadline_date: ideal_deadline_days.and_then(offset),
    })
}
