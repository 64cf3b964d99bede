//! Full nutritional assessment
//!
//! Runs every calculator over one set of resolved inputs and collects the
//! results in a single report. Missing data never fails the assessment: each
//! section is simply left empty and the fields that would unlock it are
//! listed with display labels.

use crate::activity::{resolve_activity_level, suggest_activity_level, Suggestion};
use crate::anthropometry::{compute_anthropometric_indices, AnthropometricIndices};
use crate::body_composition::{estimate_body_composition, CompositionProtocol, CompositionResult};
use crate::config::EngineConfig;
use crate::energy::{
    compare_energy_protocols, compute_energy, ActivityLevel, BmrEstimate, BmrProtocol,
    EnergyResult,
};
use crate::errors::{EngineError, NotComputable};
use crate::goal_planner::{plan_goal_viability, GoalPlan};
use crate::resolver::{resolve_inputs, DataSources, ResolvedInputs};
use crate::units::EnergyUnit;
use crate::validation::get_missing_fields_labels;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Weight goal to plan alongside the assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRequest {
    pub target_weight_kg: f64,
    pub target_date: NaiveDate,
    /// Defaults to the assessment date
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Defaults to the resolved body weight
    #[serde(default)]
    pub initial_weight_kg: Option<f64>,
}

/// Everything needed to assess one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub sources: DataSources,
    /// Date ages and default goal start are computed at
    pub as_of: NaiveDate,
    #[serde(default)]
    pub composition_protocol: Option<CompositionProtocol>,
    #[serde(default)]
    pub bioimpedance_percent: Option<f64>,
    /// Chosen BMR protocol; the recommended one is used when absent
    #[serde(default)]
    pub bmr_protocol: Option<BmrProtocol>,
    /// Reported exercise frequency, e.g. "3-5x"
    #[serde(default)]
    pub exercise_frequency: Option<String>,
    /// Activity level picked by the clinician; overrides any suggestion
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub goal_adjustment_kcal: i32,
    #[serde(default)]
    pub goal: Option<GoalRequest>,
    #[serde(default)]
    pub energy_unit: EnergyUnit,
}

impl AssessmentRequest {
    pub fn new(sources: DataSources, as_of: NaiveDate) -> Self {
        Self {
            sources,
            as_of,
            composition_protocol: None,
            bioimpedance_percent: None,
            bmr_protocol: None,
            exercise_frequency: None,
            activity_level: None,
            goal_adjustment_kcal: 0,
            goal: None,
            energy_unit: EnergyUnit::default(),
        }
    }
}

/// Energy figures converted to the requested display unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyDisplay {
    pub unit: EnergyUnit,
    pub bmr: f64,
    pub get: f64,
    pub target: f64,
}

impl EnergyDisplay {
    fn new(energy: &EnergyResult, unit: EnergyUnit) -> Self {
        Self {
            unit,
            bmr: unit.from_kcal(energy.bmr_kcal),
            get: unit.from_kcal(energy.get_kcal),
            target: unit.from_kcal(energy.target_kcal),
        }
    }
}

/// Result of a full assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub inputs: ResolvedInputs,
    pub indices: AnthropometricIndices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition: Option<CompositionResult>,
    /// Why the requested composition protocol produced nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition_unavailable: Option<NotComputable>,
    pub protocols: Vec<BmrEstimate>,
    pub activity_suggestion: Option<Suggestion<ActivityLevel>>,
    pub activity_level: ActivityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_display: Option<EnergyDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalPlan>,
    /// Labels of the inputs that would complete the report
    pub missing_fields: Vec<String>,
}

fn push_missing(missing: &mut Vec<String>, field: &str) {
    if !missing.iter().any(|f| f == field) {
        missing.push(field.to_string());
    }
}

/// Run the whole pipeline for one request
///
/// # Errors
///
/// Only hard errors surface: an invalid configuration, a goal adjustment
/// outside the configured bounds, or a goal whose dates or weights are
/// invalid.
pub fn assess(
    request: &AssessmentRequest,
    config: &EngineConfig,
) -> Result<AssessmentReport, EngineError> {
    config.validate()?;
    let bounds = &config.goal_adjustment;
    if !bounds.contains(request.goal_adjustment_kcal) {
        return Err(EngineError::AdjustmentOutOfRange {
            value: request.goal_adjustment_kcal,
            min: bounds.min_kcal,
            max: bounds.max_kcal,
        });
    }

    let inputs = resolve_inputs(&request.sources, request.as_of);
    let profile = &inputs.profile;
    let mut missing = inputs.missing_fields.clone();

    let indices =
        compute_anthropometric_indices(profile, inputs.circumferences.as_ref(), config.whr_policy);

    let (composition, composition_unavailable) = match request.composition_protocol {
        Some(protocol) => match estimate_body_composition(
            profile,
            protocol,
            inputs.skinfolds.as_ref(),
            request.bioimpedance_percent,
        ) {
            Ok(result) => (Some(result), None),
            Err(reason) => {
                if let NotComputable::MissingInput { fields } = &reason {
                    for field in fields {
                        push_missing(&mut missing, field);
                    }
                }
                (None, Some(reason))
            }
        },
        None => (None, None),
    };

    let lean_mass = composition.as_ref().and_then(|c| c.lean_mass_kg);
    let protocols = compare_energy_protocols(profile, lean_mass);

    let activity_suggestion = request
        .exercise_frequency
        .as_deref()
        .and_then(suggest_activity_level);
    let activity_level = resolve_activity_level(
        request.activity_level,
        activity_suggestion,
        ActivityLevel::default(),
    );

    let chosen = request
        .bmr_protocol
        .map(|p| protocols.iter().find(|e| e.protocol == p))
        .unwrap_or_else(|| protocols.iter().find(|e| e.recommended));

    let energy = match chosen {
        Some(BmrEstimate {
            protocol,
            bmr_kcal: Some(bmr),
            ..
        }) => Some(compute_energy(
            *protocol,
            *bmr,
            activity_level,
            request.goal_adjustment_kcal,
            &config.goal_adjustment,
            config.minimum_intake_kcal,
        )?),
        Some(estimate) => {
            debug!(protocol = %estimate.protocol, "Chosen BMR protocol is unavailable");
            for field in &estimate.missing {
                push_missing(&mut missing, field);
            }
            None
        }
        None => None,
    };
    let energy_display = energy
        .as_ref()
        .map(|e| EnergyDisplay::new(e, request.energy_unit));

    let goal = match &request.goal {
        Some(goal) => match goal.initial_weight_kg.or(profile.weight()) {
            Some(initial) => Some(plan_goal_viability(
                initial,
                goal.target_weight_kg,
                goal.start_date.unwrap_or(request.as_of),
                goal.target_date,
                &config.planner,
            )?),
            None => {
                push_missing(&mut missing, "weight");
                None
            }
        },
        None => None,
    };

    let missing_fields = get_missing_fields_labels(&missing);

    Ok(AssessmentReport {
        inputs,
        indices,
        composition,
        composition_unavailable,
        protocols,
        activity_suggestion,
        activity_level,
        energy,
        energy_display,
        goal,
        missing_fields,
    })
}
