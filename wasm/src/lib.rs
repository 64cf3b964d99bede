//! NutriClinic WASM Module
//!
//! Browser bindings for the calculation engine. Scalar operations take and
//! return plain numbers; structured ones exchange JSON strings so the front
//! end can pass its form state through unchanged.

use chrono::NaiveDate;
use nutriclinic_engine::{
    assess, classify_bmi, compare_energy_protocols, compute_bmi, compute_get,
    estimate_body_composition, plan_goal_viability, suggest_activity_factor, AssessmentRequest,
    BiometricProfile, CompositionProtocol, EngineConfig, SkinfoldSet,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use wasm_bindgen::prelude::*;

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {}: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn load_config(config_json: Option<String>) -> Result<EngineConfig, String> {
    match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => parse(json, "config"),
        _ => Ok(EngineConfig::default()),
    }
}

/// BMI from weight (kg) and height (cm); `undefined` when either is missing
#[wasm_bindgen]
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    compute_bmi(Some(weight_kg), Some(height_cm))
}

/// BMI category id ("underweight", "normal", ...); `undefined` for a non-finite BMI
#[wasm_bindgen]
pub fn bmi_category(bmi: f64) -> Option<String> {
    if !bmi.is_finite() {
        return None;
    }
    serde_json::to_value(classify_bmi(bmi))
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
}

/// GET for a BMR and one of the standard activity multipliers
#[wasm_bindgen]
pub fn calculate_get(bmr_kcal: f64, activity_factor: f64) -> Option<f64> {
    compute_get(bmr_kcal, activity_factor).ok()
}

/// Suggested activity multiplier for an exercise-frequency bucket
#[wasm_bindgen]
pub fn suggest_factor(exercise_frequency: &str) -> Option<f64> {
    suggest_activity_factor(exercise_frequency)
}

fn compare_protocols_impl(profile_json: &str, lean_mass_kg: Option<f64>) -> Result<String, String> {
    let profile: BiometricProfile = parse(profile_json, "profile")?;
    to_json(&compare_energy_protocols(&profile, lean_mass_kg))
}

/// Compare every BMR protocol for a profile
#[wasm_bindgen]
pub fn compare_protocols(profile_json: &str, lean_mass_kg: Option<f64>) -> Result<String, JsValue> {
    compare_protocols_impl(profile_json, lean_mass_kg).map_err(|e| JsValue::from_str(&e))
}

#[derive(Debug, Deserialize)]
struct CompositionInput {
    #[serde(default)]
    profile: BiometricProfile,
    protocol: CompositionProtocol,
    #[serde(default)]
    skinfolds: Option<SkinfoldSet>,
    #[serde(default)]
    bioimpedance_percent: Option<f64>,
}

/// `{"ok": result}` or `{"not_computable": reason}`
#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum CompositionOutcome<T, E> {
    Ok(T),
    NotComputable(E),
}

fn estimate_composition_impl(input_json: &str) -> Result<String, String> {
    let input: CompositionInput = parse(input_json, "composition input")?;
    match estimate_body_composition(
        &input.profile,
        input.protocol,
        input.skinfolds.as_ref(),
        input.bioimpedance_percent,
    ) {
        Ok(result) => to_json(&CompositionOutcome::<_, ()>::Ok(result)),
        Err(reason) => to_json(&CompositionOutcome::<(), _>::NotComputable(reason)),
    }
}

/// Estimate body composition; missing data is reported, not thrown
#[wasm_bindgen]
pub fn estimate_composition(input_json: &str) -> Result<String, JsValue> {
    estimate_composition_impl(input_json).map_err(|e| JsValue::from_str(&e))
}

#[derive(Debug, Deserialize)]
struct GoalInput {
    initial_weight_kg: f64,
    target_weight_kg: f64,
    start_date: NaiveDate,
    target_date: NaiveDate,
}

fn plan_goal_impl(goal_json: &str, config_json: Option<String>) -> Result<String, String> {
    let goal: GoalInput = parse(goal_json, "goal")?;
    let config = load_config(config_json)?;
    let plan = plan_goal_viability(
        goal.initial_weight_kg,
        goal.target_weight_kg,
        goal.start_date,
        goal.target_date,
        &config.planner,
    )
    .map_err(|e| e.to_string())?;
    to_json(&plan)
}

/// Plan a weight goal; invalid date ranges are thrown as errors
#[wasm_bindgen]
pub fn plan_goal(goal_json: &str, config_json: Option<String>) -> Result<String, JsValue> {
    plan_goal_impl(goal_json, config_json).map_err(|e| JsValue::from_str(&e))
}

fn assess_impl(request_json: &str, config_json: Option<String>) -> Result<String, String> {
    let request: AssessmentRequest = parse(request_json, "assessment request")?;
    let config = load_config(config_json)?;
    let report = assess(&request, &config).map_err(|e| e.to_string())?;
    to_json(&report)
}

/// Run the full assessment pipeline
#[wasm_bindgen]
pub fn run_assessment(request_json: &str, config_json: Option<String>) -> Result<String, JsValue> {
    assess_impl(request_json, config_json).map_err(|e| JsValue::from_str(&e))
}
