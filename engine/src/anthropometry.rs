//! Anthropometric indices
//!
//! BMI with its WHO category, the BMI-derived ideal weight band and the
//! waist-hip ratio with its risk band.

use crate::inputs::{positive, BiometricProfile, CircumferenceSet, CircumferenceSite, Sex};
use serde::{Deserialize, Serialize};

/// Lower edge of the healthy BMI band
pub const HEALTHY_BMI_MIN: f64 = 18.5;
/// Upper edge used for the ideal weight band
pub const HEALTHY_BMI_MAX: f64 = 24.9;

// ============================================================================
// BMI
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// BMI interval `[lower, upper)` of this category
    pub fn range(&self) -> (f64, f64) {
        match self {
            BmiCategory::Underweight => (0.0, 18.5),
            BmiCategory::Normal => (18.5, 25.0),
            BmiCategory::Overweight => (25.0, 30.0),
            BmiCategory::Obese => (30.0, f64::INFINITY),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)²
///
/// Returns `None` when either input is missing, non-finite or not positive.
pub fn compute_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let weight = positive(weight_kg)?;
    let height_m = positive(height_cm)? / 100.0;
    Some(weight / (height_m * height_m))
}

/// Classify BMI; each band includes its lower bound
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

// ============================================================================
// Ideal Weight
// ============================================================================

/// Where the current weight sits relative to the ideal band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightStatus {
    Below,
    Within,
    Above,
}

/// Weight band corresponding to BMI 18.5-24.9 at a given height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdealWeightRange {
    pub min_kg: f64,
    pub max_kg: f64,
}

impl IdealWeightRange {
    /// Compare a weight against the band (edges count as within)
    pub fn status_of(&self, weight_kg: f64) -> WeightStatus {
        if weight_kg < self.min_kg {
            WeightStatus::Below
        } else if weight_kg > self.max_kg {
            WeightStatus::Above
        } else {
            WeightStatus::Within
        }
    }

    /// Signed kg to the nearest band edge: negative below, positive above, 0 inside
    pub fn distance_kg(&self, weight_kg: f64) -> f64 {
        match self.status_of(weight_kg) {
            WeightStatus::Below => weight_kg - self.min_kg,
            WeightStatus::Above => weight_kg - self.max_kg,
            WeightStatus::Within => 0.0,
        }
    }
}

/// Ideal weight band for a height
pub fn ideal_weight_range(height_cm: Option<f64>) -> Option<IdealWeightRange> {
    let height_m = positive(height_cm)? / 100.0;
    let height_m_sq = height_m * height_m;
    Some(IdealWeightRange {
        min_kg: HEALTHY_BMI_MIN * height_m_sq,
        max_kg: HEALTHY_BMI_MAX * height_m_sq,
    })
}

// ============================================================================
// Waist-Hip Ratio
// ============================================================================

/// WHR risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhrCategory {
    Low,
    Moderate,
    High,
}

/// Which cut points classify the waist-hip ratio
///
/// `Unisex` applies 0.85 / 0.95 to everyone. `SexSpecific` uses 0.90 / 1.00
/// for men and 0.80 / 0.85 for women, and falls back to the unisex cut points
/// when sex is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WhrPolicy {
    #[default]
    Unisex,
    SexSpecific,
}

impl WhrPolicy {
    /// `(moderate_from, high_from)` cut points
    pub fn cut_points(&self, sex: Option<Sex>) -> (f64, f64) {
        match (self, sex) {
            (WhrPolicy::SexSpecific, Some(Sex::Male)) => (0.90, 1.00),
            (WhrPolicy::SexSpecific, Some(Sex::Female)) => (0.80, 0.85),
            _ => (0.85, 0.95),
        }
    }
}

/// Waist divided by hip
pub fn compute_whr(waist_cm: Option<f64>, hip_cm: Option<f64>) -> Option<f64> {
    Some(positive(waist_cm)? / positive(hip_cm)?)
}

/// Classify WHR with the unisex cut points
pub fn classify_whr(whr: f64) -> WhrCategory {
    classify_whr_with(whr, WhrPolicy::Unisex, None)
}

/// Classify WHR under an explicit policy
pub fn classify_whr_with(whr: f64, policy: WhrPolicy, sex: Option<Sex>) -> WhrCategory {
    let (moderate_from, high_from) = policy.cut_points(sex);
    if whr < moderate_from {
        WhrCategory::Low
    } else if whr < high_from {
        WhrCategory::Moderate
    } else {
        WhrCategory::High
    }
}

// ============================================================================
// Combined Indices
// ============================================================================

/// All anthropometric indices computable from the available data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropometricIndices {
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub ideal_weight_range: Option<IdealWeightRange>,
    pub weight_status: Option<WeightStatus>,
    pub distance_from_ideal_kg: Option<f64>,
    pub whr: Option<f64>,
    pub whr_category: Option<WhrCategory>,
}

/// Compute every index the inputs allow; missing inputs leave the
/// dependent outputs empty
pub fn compute_anthropometric_indices(
    profile: &BiometricProfile,
    circumferences: Option<&CircumferenceSet>,
    whr_policy: WhrPolicy,
) -> AnthropometricIndices {
    let bmi = compute_bmi(profile.weight_kg, profile.height_cm);
    let ideal = ideal_weight_range(profile.height_cm);
    let weight = profile.weight();

    let whr = circumferences.and_then(|c| {
        compute_whr(
            c.get(CircumferenceSite::Waist),
            c.get(CircumferenceSite::Hip),
        )
    });

    AnthropometricIndices {
        bmi,
        bmi_category: bmi.map(classify_bmi),
        ideal_weight_range: ideal,
        weight_status: ideal.zip(weight).map(|(range, w)| range.status_of(w)),
        distance_from_ideal_kg: ideal.zip(weight).map(|(range, w)| range.distance_kg(w)),
        whr,
        whr_category: whr.map(|r| classify_whr_with(r, whr_policy, profile.sex)),
    }
}
