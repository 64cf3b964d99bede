//! NutriClinic calculation engine
//!
//! Anthropometric indices, body composition, energy expenditure and weight
//! goal planning for nutrition practice. Every calculator is a pure function
//! of its inputs: no I/O, no clock, no shared state. Missing data leaves the
//! dependent outputs empty instead of failing.

pub mod activity;
pub mod anthropometry;
pub mod assessment;
pub mod body_composition;
pub mod config;
pub mod energy;
pub mod errors;
pub mod goal_planner;
pub mod inputs;
pub mod resolver;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use activity::{
    resolve_activity_level, suggest_activity_factor, suggest_activity_level, ExerciseFrequency,
    Suggestion,
};
pub use anthropometry::{
    classify_bmi, classify_whr, classify_whr_with, compute_anthropometric_indices, compute_bmi,
    compute_whr, ideal_weight_range, AnthropometricIndices, BmiCategory, IdealWeightRange,
    WeightStatus, WhrCategory, WhrPolicy,
};
pub use assessment::{assess, AssessmentReport, AssessmentRequest, EnergyDisplay, GoalRequest};
pub use body_composition::{
    classify_body_fat, estimate_body_composition, BodyFatCategory, CompositionProtocol,
    CompositionResult,
};
pub use config::EngineConfig;
pub use energy::{
    apply_goal, compare_energy_protocols, compute_energy, compute_get, ActivityLevel,
    BmrEstimate, BmrProtocol, EnergyResult, GoalAdjustmentBounds,
};
pub use errors::{EngineError, NotComputable};
pub use goal_planner::{
    plan_goal_viability, GoalDirection, GoalPlan, GoalWarning, PlannerConfig, RateBands,
    WarningSeverity,
};
pub use inputs::{
    BiometricProfile, CircumferenceSet, CircumferenceSite, Sex, SkinfoldSet, SkinfoldSite,
};
pub use resolver::{
    resolve_inputs, AnthropometricRecord, DataSources, ManualEntry, ProfileRecord, Provenance,
    ResolvedInputs,
};
pub use units::{EnergyUnit, HeightUnit, WeightUnit};
pub use validation::ValidationError;
