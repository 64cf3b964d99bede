//! Energy expenditure: resting metabolic rate, GET and calorie goals
//!
//! Five BMR protocols are compared side by side. Protocols whose inputs are
//! missing are marked unavailable rather than failing the whole comparison.
//!
//! # References
//!
//! - Harris, J.A. & Benedict, F.G. (1919), revised by Roza & Shizgal (1984).
//! - Mifflin, M.D., et al. (1990). *Am J Clin Nutr*, 51(2), 241-247.
//! - FAO/WHO/UNU (1985). Energy and protein requirements. Technical Report 724.
//! - Cunningham, J.J. (1980). *Am J Clin Nutr*, 33(11), 2372-2374.
//! - Tinsley, G.M., et al. (2019). *Int J Sport Nutr Exerc Metab*, 29(4).

use crate::errors::EngineError;
use crate::inputs::{positive, BiometricProfile, Sex};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// BMR Protocols
// ============================================================================

/// Resting energy expenditure protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmrProtocol {
    HarrisBenedict,
    MifflinStJeor,
    FaoWho,
    Cunningham,
    Tinsley,
}

impl BmrProtocol {
    pub const ALL: [BmrProtocol; 5] = [
        BmrProtocol::HarrisBenedict,
        BmrProtocol::MifflinStJeor,
        BmrProtocol::FaoWho,
        BmrProtocol::Cunningham,
        BmrProtocol::Tinsley,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BmrProtocol::HarrisBenedict => "harris_benedict",
            BmrProtocol::MifflinStJeor => "mifflin_st_jeor",
            BmrProtocol::FaoWho => "fao_who",
            BmrProtocol::Cunningham => "cunningham",
            BmrProtocol::Tinsley => "tinsley",
        }
    }

    /// Whether the protocol is driven by lean (fat-free) mass
    pub fn uses_lean_mass(&self) -> bool {
        matches!(self, BmrProtocol::Cunningham | BmrProtocol::Tinsley)
    }

    /// Evaluate the protocol, listing the inputs it lacks on failure
    pub fn evaluate(
        &self,
        profile: &BiometricProfile,
        lean_mass_kg: Option<f64>,
    ) -> Result<f64, Vec<&'static str>> {
        match self {
            BmrProtocol::HarrisBenedict | BmrProtocol::MifflinStJeor => {
                match (profile.weight(), profile.height(), profile.age(), profile.sex) {
                    (Some(w), Some(h), Some(a), Some(s)) => Ok(match self {
                        BmrProtocol::HarrisBenedict => calculate_bmr_harris_benedict(w, h, a, s),
                        _ => calculate_bmr_mifflin(w, h, a, s),
                    }),
                    _ => Err(missing_fields(profile, true)),
                }
            }
            BmrProtocol::FaoWho => match (profile.weight(), profile.age(), profile.sex) {
                (Some(w), Some(a), Some(s)) => Ok(calculate_bmr_fao_who(w, a, s)),
                _ => Err(missing_fields(profile, false)),
            },
            BmrProtocol::Cunningham => positive(lean_mass_kg)
                .map(calculate_bmr_cunningham)
                .ok_or_else(|| vec!["lean_mass"]),
            BmrProtocol::Tinsley => positive(lean_mass_kg)
                .map(calculate_bmr_tinsley)
                .ok_or_else(|| vec!["lean_mass"]),
        }
    }
}

impl fmt::Display for BmrProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn missing_fields(profile: &BiometricProfile, needs_height: bool) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.weight().is_none() {
        missing.push("weight");
    }
    if needs_height && profile.height().is_none() {
        missing.push("height");
    }
    if profile.age().is_none() {
        missing.push("age");
    }
    if profile.sex.is_none() {
        missing.push("sex");
    }
    missing
}

/// Mifflin-St Jeor (1990)
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: u32, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Harris-Benedict, Roza & Shizgal revision
///
/// Men: BMR = 88.362 + 13.397 × weight(kg) + 4.799 × height(cm) - 5.677 × age(y)
/// Women: BMR = 447.593 + 9.247 × weight(kg) + 3.098 × height(cm) - 4.330 × age(y)
pub fn calculate_bmr_harris_benedict(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    sex: Sex,
) -> f64 {
    let age = f64::from(age_years);
    match sex {
        Sex::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Sex::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

/// FAO/WHO/UNU (1985) weight-only equations, banded by age
pub fn calculate_bmr_fao_who(weight_kg: f64, age_years: u32, sex: Sex) -> f64 {
    let (slope, intercept) = match (sex, age_years) {
        (Sex::Male, 0..=2) => (60.9, -54.0),
        (Sex::Male, 3..=9) => (22.7, 495.0),
        (Sex::Male, 10..=17) => (17.5, 651.0),
        (Sex::Male, 18..=29) => (15.3, 679.0),
        (Sex::Male, 30..=59) => (11.6, 879.0),
        (Sex::Male, _) => (13.5, 487.0),
        (Sex::Female, 0..=2) => (61.0, -51.0),
        (Sex::Female, 3..=9) => (22.5, 499.0),
        (Sex::Female, 10..=17) => (12.2, 746.0),
        (Sex::Female, 18..=29) => (14.7, 496.0),
        (Sex::Female, 30..=59) => (8.7, 829.0),
        (Sex::Female, _) => (10.5, 596.0),
    };
    slope * weight_kg + intercept
}

/// Cunningham (1980): BMR = 500 + 22 × lean mass(kg)
pub fn calculate_bmr_cunningham(lean_mass_kg: f64) -> f64 {
    500.0 + 22.0 * lean_mass_kg
}

/// Tinsley (2019), fat-free mass equation: BMR = 25.9 × lean mass(kg) + 284
pub fn calculate_bmr_tinsley(lean_mass_kg: f64) -> f64 {
    25.9 * lean_mass_kg + 284.0
}

// ============================================================================
// Protocol Comparison
// ============================================================================

/// One row of the protocol comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmrEstimate {
    pub protocol: BmrProtocol,
    pub bmr_kcal: Option<f64>,
    pub available: bool,
    pub recommended: bool,
    /// Inputs this protocol still needs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// Advisory preference order; the first available protocol is recommended
fn preference_order(lean_mass_known: bool) -> &'static [BmrProtocol] {
    if lean_mass_known {
        &[
            BmrProtocol::Cunningham,
            BmrProtocol::Tinsley,
            BmrProtocol::MifflinStJeor,
            BmrProtocol::HarrisBenedict,
            BmrProtocol::FaoWho,
        ]
    } else {
        &[
            BmrProtocol::MifflinStJeor,
            BmrProtocol::HarrisBenedict,
            BmrProtocol::FaoWho,
        ]
    }
}

/// Evaluate every BMR protocol against the available data
///
/// `lean_mass_kg` overrides the profile's own lean mass when given. Never
/// fails: unavailable protocols come back with `available == false`.
pub fn compare_energy_protocols(
    profile: &BiometricProfile,
    lean_mass_kg: Option<f64>,
) -> Vec<BmrEstimate> {
    let lean_mass = positive(lean_mass_kg).or_else(|| profile.lean_mass());

    let mut estimates: Vec<BmrEstimate> = BmrProtocol::ALL
        .iter()
        .map(|protocol| match protocol.evaluate(profile, lean_mass) {
            Ok(bmr) => BmrEstimate {
                protocol: *protocol,
                bmr_kcal: Some(bmr),
                available: true,
                recommended: false,
                missing: Vec::new(),
            },
            Err(missing) => {
                debug!(protocol = %protocol, ?missing, "BMR protocol excluded from comparison");
                BmrEstimate {
                    protocol: *protocol,
                    bmr_kcal: None,
                    available: false,
                    recommended: false,
                    missing: missing.into_iter().map(String::from).collect(),
                }
            }
        })
        .collect();

    let recommended = preference_order(lean_mass.is_some())
        .iter()
        .find(|p| estimates.iter().any(|e| e.protocol == **p && e.available));
    if let Some(choice) = recommended {
        for estimate in estimates.iter_mut() {
            estimate.recommended = estimate.protocol == *choice;
        }
    }

    estimates
}

// ============================================================================
// Activity Factor and GET
// ============================================================================

/// Habitual physical activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Training twice a day or heavy physical work
    ExtraActive,
}

impl ActivityLevel {
    /// Ordered from least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// Activity multiplier for GET
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::LightlyActive => "Light exercise 1-3 days/week",
            ActivityLevel::ModeratelyActive => "Moderate exercise 3-5 days/week",
            ActivityLevel::VeryActive => "Hard exercise 6-7 days/week",
            ActivityLevel::ExtraActive => "Training twice a day or physical job",
        }
    }

    /// Map a multiplier back to its level; anything off the fixed set is rejected
    pub fn from_factor(factor: f64) -> Result<Self, EngineError> {
        ActivityLevel::ALL
            .iter()
            .copied()
            .find(|level| (level.multiplier() - factor).abs() < 1e-9)
            .ok_or(EngineError::InvalidActivityFactor(factor))
    }
}

/// GET = BMR × activity factor, for one of the standard factors only
pub fn compute_get(bmr_kcal: f64, activity_factor: f64) -> Result<f64, EngineError> {
    let level = ActivityLevel::from_factor(activity_factor)?;
    Ok(bmr_kcal * level.multiplier())
}

// ============================================================================
// Calorie Goal
// ============================================================================

/// Allowed range for the signed deficit/surplus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAdjustmentBounds {
    pub min_kcal: i32,
    pub max_kcal: i32,
}

impl Default for GoalAdjustmentBounds {
    fn default() -> Self {
        Self {
            min_kcal: -1000,
            max_kcal: 1000,
        }
    }
}

impl GoalAdjustmentBounds {
    pub fn contains(&self, adjustment_kcal: i32) -> bool {
        (self.min_kcal..=self.max_kcal).contains(&adjustment_kcal)
    }
}

/// Target intake = GET + adjustment (negative for a deficit)
pub fn apply_goal(
    get_kcal: f64,
    adjustment_kcal: i32,
    bounds: &GoalAdjustmentBounds,
) -> Result<f64, EngineError> {
    if !bounds.contains(adjustment_kcal) {
        return Err(EngineError::AdjustmentOutOfRange {
            value: adjustment_kcal,
            min: bounds.min_kcal,
            max: bounds.max_kcal,
        });
    }
    Ok(get_kcal + f64::from(adjustment_kcal))
}

/// Full energy prescription for one chosen protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyResult {
    pub protocol: BmrProtocol,
    pub bmr_kcal: f64,
    pub activity_level: ActivityLevel,
    pub activity_factor: f64,
    pub get_kcal: f64,
    pub goal_adjustment_kcal: i32,
    pub target_kcal: f64,
    /// Target falls under the configured minimum intake; the value is not clamped
    pub below_minimum_intake: bool,
}

/// Build the energy prescription from a BMR already chosen by the caller
pub fn compute_energy(
    protocol: BmrProtocol,
    bmr_kcal: f64,
    activity_level: ActivityLevel,
    adjustment_kcal: i32,
    bounds: &GoalAdjustmentBounds,
    minimum_intake_kcal: f64,
) -> Result<EnergyResult, EngineError> {
    let activity_factor = activity_level.multiplier();
    let get_kcal = compute_get(bmr_kcal, activity_factor)?;
    let target_kcal = apply_goal(get_kcal, adjustment_kcal, bounds)?;

    Ok(EnergyResult {
        protocol,
        bmr_kcal,
        activity_level,
        activity_factor,
        get_kcal,
        goal_adjustment_kcal: adjustment_kcal,
        target_kcal,
        below_minimum_intake: target_kcal < minimum_intake_kcal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn adult_male() -> BiometricProfile {
        BiometricProfile::new()
            .with_weight_kg(80.0)
            .with_height_cm(180.0)
            .with_age_years(30)
            .with_sex(Sex::Male)
    }

    fn estimate(list: &[BmrEstimate], protocol: BmrProtocol) -> &BmrEstimate {
        list.iter().find(|e| e.protocol == protocol).unwrap()
    }

    #[test]
    fn test_bmr_reference_values() {
        assert!((calculate_bmr_mifflin(80.0, 180.0, 30, Sex::Male) - 1780.0).abs() < 1e-9);
        assert!((calculate_bmr_mifflin(60.0, 165.0, 30, Sex::Female) - 1320.25).abs() < 1e-9);
        assert!(
            (calculate_bmr_harris_benedict(80.0, 180.0, 30, Sex::Male) - 1853.632).abs() < 1e-6
        );
        assert!((calculate_bmr_fao_who(80.0, 30, Sex::Male) - 1807.0).abs() < 1e-9);
        assert!((calculate_bmr_fao_who(60.0, 25, Sex::Female) - 1378.0).abs() < 1e-9);
        assert!((calculate_bmr_cunningham(60.0) - 1820.0).abs() < 1e-9);
        assert!((calculate_bmr_tinsley(60.0) - 1838.0).abs() < 1e-9);
    }

    #[test]
    fn test_lean_mass_protocols_excluded_without_lean_mass() {
        let estimates = compare_energy_protocols(&adult_male(), None);
        assert_eq!(estimates.len(), 5);
        for protocol in [BmrProtocol::Cunningham, BmrProtocol::Tinsley] {
            let e = estimate(&estimates, protocol);
            assert!(!e.available);
            assert_eq!(e.bmr_kcal, None);
            assert_eq!(e.missing, vec!["lean_mass".to_string()]);
        }
        assert!(estimate(&estimates, BmrProtocol::MifflinStJeor).recommended);
        assert_eq!(estimates.iter().filter(|e| e.recommended).count(), 1);
    }

    #[test]
    fn test_lean_mass_protocols_included_with_lean_mass() {
        let estimates = compare_energy_protocols(&adult_male(), Some(65.0));
        assert!(estimates.iter().all(|e| e.available));
        assert!(estimate(&estimates, BmrProtocol::Cunningham).recommended);
        assert_eq!(
            estimate(&estimates, BmrProtocol::Tinsley).bmr_kcal,
            Some(25.9 * 65.0 + 284.0)
        );
    }

    #[test]
    fn test_profile_lean_mass_is_used_when_not_overridden() {
        let profile = adult_male().with_lean_mass_kg(62.0);
        let estimates = compare_energy_protocols(&profile, None);
        assert_eq!(
            estimate(&estimates, BmrProtocol::Cunningham).bmr_kcal,
            Some(500.0 + 22.0 * 62.0)
        );
        let overridden = compare_energy_protocols(&profile, Some(70.0));
        assert_eq!(
            estimate(&overridden, BmrProtocol::Cunningham).bmr_kcal,
            Some(500.0 + 22.0 * 70.0)
        );
    }

    #[test]
    fn test_missing_height_keeps_fao_who() {
        let profile = BiometricProfile::new()
            .with_weight_kg(70.0)
            .with_age_years(45)
            .with_sex(Sex::Female);
        let estimates = compare_energy_protocols(&profile, None);
        let mifflin = estimate(&estimates, BmrProtocol::MifflinStJeor);
        assert!(!mifflin.available);
        assert_eq!(mifflin.missing, vec!["height".to_string()]);
        let fao = estimate(&estimates, BmrProtocol::FaoWho);
        assert!(fao.available && fao.recommended);
    }

    #[test]
    fn test_empty_profile_recommends_nothing() {
        let estimates = compare_energy_protocols(&BiometricProfile::new(), None);
        assert!(estimates.iter().all(|e| !e.available && !e.recommended));
    }

    #[test]
    fn test_get_determinism() {
        let get = compute_get(1500.0, 1.55).unwrap();
        assert!((get - 2325.0).abs() < 1e-6);
    }

    #[rstest]
    #[case(1.0)]
    #[case(1.5)]
    #[case(2.0)]
    #[case(f64::NAN)]
    fn test_arbitrary_factors_rejected(#[case] factor: f64) {
        assert!(matches!(
            compute_get(1500.0, factor),
            Err(EngineError::InvalidActivityFactor(_))
        ));
    }

    #[test]
    fn test_apply_goal_bounds() {
        let bounds = GoalAdjustmentBounds::default();
        assert_eq!(apply_goal(2325.0, -500, &bounds).unwrap(), 1825.0);
        assert_eq!(apply_goal(2325.0, 1000, &bounds).unwrap(), 3325.0);
        assert_eq!(
            apply_goal(2325.0, -1001, &bounds).unwrap_err(),
            EngineError::AdjustmentOutOfRange {
                value: -1001,
                min: -1000,
                max: 1000
            }
        );
    }

    #[test]
    fn test_compute_energy_flags_low_target() {
        let bounds = GoalAdjustmentBounds::default();
        let result = compute_energy(
            BmrProtocol::MifflinStJeor,
            1200.0,
            ActivityLevel::Sedentary,
            -500,
            &bounds,
            1200.0,
        )
        .unwrap();
        assert!((result.get_kcal - 1440.0).abs() < 1e-9);
        assert!((result.target_kcal - 940.0).abs() < 1e-9);
        assert!(result.below_minimum_intake);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: target always equals GET plus the adjustment
        #[test]
        fn prop_target_is_get_plus_adjustment(
            bmr in 800.0f64..3000.0,
            level_idx in 0usize..5,
            adjustment in -1000i32..=1000,
        ) {
            let level = ActivityLevel::ALL[level_idx];
            let result = compute_energy(
                BmrProtocol::HarrisBenedict, bmr, level, adjustment,
                &GoalAdjustmentBounds::default(), 1200.0,
            ).unwrap();
            prop_assert!((result.target_kcal - (result.get_kcal + adjustment as f64)).abs() < 1e-9);
            prop_assert!(result.get_kcal >= bmr);
        }

        /// Property: male BMR exceeds female BMR for identical stats
        #[test]
        fn prop_male_bmr_higher(
            weight in 50.0f64..100.0,
            height in 160.0f64..190.0,
            age in 20u32..60
        ) {
            prop_assert!(
                calculate_bmr_mifflin(weight, height, age, Sex::Male)
                    > calculate_bmr_mifflin(weight, height, age, Sex::Female)
            );
        }
    }
}
