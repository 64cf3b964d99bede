//! Plausibility checks for biometric inputs
//!
//! These ranges catch typing mistakes (a height of 1.7 entered in the cm
//! field, a weight in grams) before a value is handed to a formula. They are
//! deliberately wide and say nothing clinical about the patient.

use serde::{Deserialize, Serialize};

/// Plausible body weight range in kg
pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 500.0);
/// Plausible stature range in cm
pub const HEIGHT_RANGE_CM: (f64, f64) = (50.0, 300.0);
/// Plausible age range in years
pub const AGE_RANGE_YEARS: (u32, u32) = (1, 120);
/// Caliper readings outside this range are measurement errors
pub const SKINFOLD_RANGE_MM: (f64, f64) = (1.0, 100.0);
/// Plausible circumference range in cm
pub const CIRCUMFERENCE_RANGE_CM: (f64, f64) = (20.0, 300.0);

fn check_range(value: f64, (min, max): (f64, f64), what: &str, unit: &str) -> Result<(), String> {
    if value.is_nan() || value.is_infinite() {
        return Err(format!("{} must be a valid number", what));
    }
    if value < min {
        return Err(format!("{} must be at least {} {}", what, min, unit));
    }
    if value > max {
        return Err(format!("{} must be at most {} {}", what, max, unit));
    }
    Ok(())
}

/// Validate body weight (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    check_range(weight_kg, WEIGHT_RANGE_KG, "Weight", "kg")
}

/// Validate stature (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    check_range(height_cm, HEIGHT_RANGE_CM, "Height", "cm")
}

/// Validate age in whole years
pub fn validate_age(age_years: u32) -> Result<(), String> {
    let (min, max) = AGE_RANGE_YEARS;
    if age_years < min {
        return Err(format!("Age must be at least {} year", min));
    }
    if age_years > max {
        return Err(format!("Age cannot exceed {} years", max));
    }
    Ok(())
}

/// Validate one caliper reading (in mm)
pub fn validate_skinfold_mm(mm: f64) -> Result<(), String> {
    check_range(mm, SKINFOLD_RANGE_MM, "Skinfold", "mm")
}

/// Validate one tape measurement (in cm)
pub fn validate_circumference_cm(cm: f64) -> Result<(), String> {
    check_range(cm, CIRCUMFERENCE_RANGE_CM, "Circumference", "cm")
}

/// Validate a percentage in [0, 100]
pub fn validate_percentage(value: f64) -> Result<(), String> {
    check_range(value, (0.0, 100.0), "Percentage", "%")
}

/// Lean mass must be positive and cannot exceed body weight
pub fn validate_lean_mass(lean_mass_kg: f64, weight_kg: Option<f64>) -> Result<(), String> {
    if !lean_mass_kg.is_finite() || lean_mass_kg <= 0.0 {
        return Err("Lean mass must be a positive number".to_string());
    }
    match weight_kg {
        Some(w) if lean_mass_kg > w => Err("Lean mass cannot exceed body weight".to_string()),
        _ => Ok(()),
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map field names to the labels shown next to "missing data" hints
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "weight" | "weight_kg" => "Current Weight",
        "height" | "height_cm" => "Height",
        "age" | "age_years" | "date_of_birth" => "Age",
        "sex" | "biological_sex" => "Biological Sex",
        "lean_mass" | "lean_mass_kg" => "Lean Mass",
        "waist" => "Waist Circumference",
        "hip" => "Hip Circumference",
        "bioimpedance_percent" => "Bioimpedance Body Fat",
        "triceps" => "Triceps Skinfold",
        "biceps" => "Biceps Skinfold",
        "subscapular" => "Subscapular Skinfold",
        "suprailiac" => "Suprailiac Skinfold",
        "abdominal" => "Abdominal Skinfold",
        "thigh" => "Thigh Skinfold",
        "chest" => "Chest Skinfold",
        "axillary" => "Midaxillary Skinfold",
        _ => field_name,
    }
}

/// Convert a list of field names to user-friendly labels
pub fn get_missing_fields_labels(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|f| get_field_display_label(f).to_string())
        .collect()
}

/// Validation failure tied to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}
