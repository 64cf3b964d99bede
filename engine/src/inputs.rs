//! Input value objects consumed by every calculator
//!
//! These are plain containers. A field that is absent, non-finite or not
//! strictly positive reads back as `None` through the accessor methods, so the
//! calculators never have to repeat that check.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Keep only finite, strictly positive measurements
pub(crate) fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Biological sex, used only by sex-specific regression formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("male"),
            Sex::Female => f.write_str("female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("Unknown sex: {}", other)),
        }
    }
}

/// Biometric data for one calculation call
///
/// Constructed fresh for each call and never mutated afterwards; the `with_*`
/// builders consume and return a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiometricProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lean_mass_kg: Option<f64>,
}

impl BiometricProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weight_kg(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn with_height_cm(mut self, height_cm: f64) -> Self {
        self.height_cm = Some(height_cm);
        self
    }

    pub fn with_age_years(mut self, age_years: u32) -> Self {
        self.age_years = Some(age_years);
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_lean_mass_kg(mut self, lean_mass_kg: f64) -> Self {
        self.lean_mass_kg = Some(lean_mass_kg);
        self
    }

    /// Usable body weight in kg
    pub fn weight(&self) -> Option<f64> {
        positive(self.weight_kg)
    }

    /// Usable height in cm
    pub fn height(&self) -> Option<f64> {
        positive(self.height_cm)
    }

    /// Usable age in years (zero counts as unknown)
    pub fn age(&self) -> Option<u32> {
        self.age_years.filter(|a| *a > 0)
    }

    /// Usable lean mass in kg
    pub fn lean_mass(&self) -> Option<f64> {
        positive(self.lean_mass_kg)
    }
}

// ============================================================================
// Skinfolds
// ============================================================================

/// Caliper measurement sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinfoldSite {
    Triceps,
    Biceps,
    Subscapular,
    Suprailiac,
    Abdominal,
    Thigh,
    Chest,
    Axillary,
}

impl SkinfoldSite {
    pub fn name(self) -> &'static str {
        match self {
            SkinfoldSite::Triceps => "triceps",
            SkinfoldSite::Biceps => "biceps",
            SkinfoldSite::Subscapular => "subscapular",
            SkinfoldSite::Suprailiac => "suprailiac",
            SkinfoldSite::Abdominal => "abdominal",
            SkinfoldSite::Thigh => "thigh",
            SkinfoldSite::Chest => "chest",
            SkinfoldSite::Axillary => "axillary",
        }
    }
}

/// Skinfold thicknesses in millimeters keyed by site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkinfoldSet(BTreeMap<SkinfoldSite, f64>);

impl SkinfoldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, site: SkinfoldSite, mm: f64) -> Self {
        self.0.insert(site, mm);
        self
    }

    /// Usable thickness at a site
    pub fn get(&self, site: SkinfoldSite) -> Option<f64> {
        positive(self.0.get(&site).copied())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkinfoldSite, f64)> + '_ {
        self.0.iter().map(|(site, mm)| (*site, *mm))
    }
}

impl FromIterator<(SkinfoldSite, f64)> for SkinfoldSet {
    fn from_iter<T: IntoIterator<Item = (SkinfoldSite, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Circumferences
// ============================================================================

/// Tape measurement sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircumferenceSite {
    Waist,
    Hip,
    Neck,
    Arm,
    Calf,
}

/// Circumferences in centimeters keyed by site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircumferenceSet(BTreeMap<CircumferenceSite, f64>);

impl CircumferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, site: CircumferenceSite, cm: f64) -> Self {
        self.0.insert(site, cm);
        self
    }

    pub fn get(&self, site: CircumferenceSite) -> Option<f64> {
        positive(self.0.get(&site).copied())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CircumferenceSite, f64)> + '_ {
        self.0.iter().map(|(site, cm)| (*site, *cm))
    }
}

impl FromIterator<(CircumferenceSite, f64)> for CircumferenceSet {
    fn from_iter<T: IntoIterator<Item = (CircumferenceSite, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
