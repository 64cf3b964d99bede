//! Data-source resolution
//!
//! A patient's biometric data can come from three places: dated
//! anthropometric assessments, the profile record, and values typed straight
//! into the calculator. For every field the resolver takes the most
//! authoritative usable value (latest assessment, then profile, then manual
//! entry), tags where it came from and hands the calculators one
//! [`BiometricProfile`] in canonical units.
//!
//! A value that fails the plausibility ranges in [`crate::validation`] is
//! skipped and reported, and the next source is tried.

use crate::inputs::{positive, BiometricProfile, CircumferenceSet, Sex, SkinfoldSet};
use crate::units::{HeightUnit, WeightUnit};
use crate::validation::{
    validate_age, validate_circumference_cm, validate_height_cm, validate_lean_mass,
    validate_skinfold_mm, validate_weight, ValidationError,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where a resolved value came from. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Anthropometry,
    Profile,
    Manual,
}

/// One dated anthropometric assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnthropometricRecord {
    pub measured_on: NaiveDate,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub lean_mass_kg: Option<f64>,
    #[serde(default)]
    pub skinfolds: SkinfoldSet,
    #[serde(default)]
    pub circumferences: CircumferenceSet,
}

/// Demographic data kept on the patient record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<Sex>,
}

/// Values typed into the calculator, in whatever unit the user picked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub height_unit: HeightUnit,
    #[serde(default)]
    pub age_years: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub lean_mass_kg: Option<f64>,
}

/// Everything known about a patient, before resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    #[serde(default)]
    pub anthropometry: Vec<AnthropometricRecord>,
    #[serde(default)]
    pub profile: Option<ProfileRecord>,
    #[serde(default)]
    pub manual: Option<ManualEntry>,
}

impl DataSources {
    /// Sources holding only a manual entry
    pub fn manual(entry: ManualEntry) -> Self {
        Self {
            manual: Some(entry),
            ..Self::default()
        }
    }

    /// Assessments, newest first. Records sharing a date keep their input order.
    fn records_newest_first(&self) -> Vec<&AnthropometricRecord> {
        let mut records: Vec<&AnthropometricRecord> = self.anthropometry.iter().collect();
        records.sort_by(|a, b| b.measured_on.cmp(&a.measured_on));
        records
    }
}

/// Provenance of each resolved field; `None` when nothing usable was found
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub weight: Option<Provenance>,
    pub height: Option<Provenance>,
    pub age: Option<Provenance>,
    pub sex: Option<Provenance>,
    pub lean_mass: Option<Provenance>,
    pub skinfolds: Option<Provenance>,
    pub circumferences: Option<Provenance>,
}

/// Normalised inputs ready for the calculators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedInputs {
    pub profile: BiometricProfile,
    pub skinfolds: Option<SkinfoldSet>,
    pub circumferences: Option<CircumferenceSet>,
    pub provenance: FieldProvenance,
    /// Core fields no source could supply
    pub missing_fields: Vec<String>,
    /// Values present in some source but implausible
    pub rejected: Vec<ValidationError>,
}

/// Whole years between `birth_date` and `as_of`
///
/// Returns `None` when the birth date lies after `as_of`.
pub fn age_on(birth_date: NaiveDate, as_of: NaiveDate) -> Option<u32> {
    if birth_date > as_of {
        return None;
    }
    let mut years = as_of.year() - birth_date.year();
    if (as_of.month(), as_of.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// First plausible candidate in precedence order
fn pick<T: Copy>(
    field: &str,
    candidates: impl IntoIterator<Item = (Provenance, Option<T>)>,
    check: impl Fn(T) -> Result<(), String>,
    rejected: &mut Vec<ValidationError>,
) -> Option<(T, Provenance)> {
    for (source, value) in candidates {
        let Some(value) = value else { continue };
        match check(value) {
            Ok(()) => return Some((value, source)),
            Err(message) => {
                warn!(field, ?source, %message, "Skipping implausible source value");
                rejected.push(ValidationError::new(field, &message));
            }
        }
    }
    debug!(field, "No source supplied a usable value");
    None
}

/// Resolve every field of `sources` into one profile
///
/// `as_of` is the date ages are computed at; the engine never reads the clock.
pub fn resolve_inputs(sources: &DataSources, as_of: NaiveDate) -> ResolvedInputs {
    let records = sources.records_newest_first();
    let profile = sources.profile.as_ref();
    let manual = sources.manual.as_ref();
    let mut rejected = Vec::new();

    let weight = pick(
        "weight",
        records
            .iter()
            .map(|r| (Provenance::Anthropometry, positive(r.weight_kg)))
            .chain(profile.map(|p| (Provenance::Profile, positive(p.weight_kg))))
            .chain(manual.map(|m| {
                (
                    Provenance::Manual,
                    positive(m.weight).map(|w| m.weight_unit.to_kg(w)),
                )
            })),
        validate_weight,
        &mut rejected,
    );

    let height = pick(
        "height",
        records
            .iter()
            .map(|r| (Provenance::Anthropometry, positive(r.height_cm)))
            .chain(profile.map(|p| (Provenance::Profile, positive(p.height_cm))))
            .chain(manual.map(|m| {
                (
                    Provenance::Manual,
                    positive(m.height).map(|h| m.height_unit.to_cm(h)),
                )
            })),
        validate_height_cm,
        &mut rejected,
    );

    let age = pick(
        "age",
        profile
            .map(|p| (Provenance::Profile, p.birth_date.and_then(|b| age_on(b, as_of))))
            .into_iter()
            .chain(manual.map(|m| (Provenance::Manual, m.age_years))),
        validate_age,
        &mut rejected,
    );

    let sex = pick(
        "sex",
        profile
            .map(|p| (Provenance::Profile, p.sex))
            .into_iter()
            .chain(manual.map(|m| (Provenance::Manual, m.sex))),
        |_| Ok(()),
        &mut rejected,
    );

    let weight_kg = weight.map(|(w, _)| w);
    let lean_mass = pick(
        "lean_mass",
        records
            .iter()
            .map(|r| (Provenance::Anthropometry, r.lean_mass_kg))
            .chain(manual.map(|m| (Provenance::Manual, m.lean_mass_kg))),
        |lm| validate_lean_mass(lm, weight_kg),
        &mut rejected,
    );

    let skinfolds = records
        .iter()
        .find(|r| !r.skinfolds.is_empty())
        .map(|r| {
            r.skinfolds
                .iter()
                .filter(|(site, mm)| match validate_skinfold_mm(*mm) {
                    Ok(()) => true,
                    Err(message) => {
                        warn!(site = site.name(), %message, "Dropping implausible skinfold");
                        rejected.push(ValidationError::new(site.name(), &message));
                        false
                    }
                })
                .collect::<SkinfoldSet>()
        })
        .filter(|set| !set.is_empty());

    let circumferences = records
        .iter()
        .find(|r| !r.circumferences.is_empty())
        .map(|r| {
            r.circumferences
                .iter()
                .filter(|(site, cm)| match validate_circumference_cm(*cm) {
                    Ok(()) => true,
                    Err(message) => {
                        warn!(?site, %message, "Dropping implausible circumference");
                        rejected.push(ValidationError::new("circumference", &message));
                        false
                    }
                })
                .collect::<CircumferenceSet>()
        })
        .filter(|set| !set.is_empty());

    let provenance = FieldProvenance {
        weight: weight.map(|(_, p)| p),
        height: height.map(|(_, p)| p),
        age: age.map(|(_, p)| p),
        sex: sex.map(|(_, p)| p),
        lean_mass: lean_mass.map(|(_, p)| p),
        skinfolds: skinfolds.as_ref().map(|_| Provenance::Anthropometry),
        circumferences: circumferences.as_ref().map(|_| Provenance::Anthropometry),
    };

    let missing_fields = [
        ("weight", weight.is_none()),
        ("height", height.is_none()),
        ("age", age.is_none()),
        ("sex", sex.is_none()),
    ]
    .into_iter()
    .filter(|(_, missing)| *missing)
    .map(|(field, _)| field.to_string())
    .collect();

    ResolvedInputs {
        profile: BiometricProfile {
            weight_kg,
            height_cm: height.map(|(h, _)| h),
            age_years: age.map(|(a, _)| a),
            sex: sex.map(|(s, _)| s),
            lean_mass_kg: lean_mass.map(|(lm, _)| lm),
        },
        skinfolds,
        circumferences,
        provenance,
        missing_fields,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{CircumferenceSite, SkinfoldSite};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(on: NaiveDate, weight_kg: f64) -> AnthropometricRecord {
        AnthropometricRecord {
            measured_on: on,
            weight_kg: Some(weight_kg),
            ..Default::default()
        }
    }

    #[test]
    fn test_latest_record_wins_over_profile_and_manual() {
        let sources = DataSources {
            anthropometry: vec![record(date(2024, 1, 1), 80.0), record(date(2024, 3, 1), 78.0)],
            profile: Some(ProfileRecord {
                weight_kg: Some(82.0),
                height_cm: Some(175.0),
                ..Default::default()
            }),
            manual: Some(ManualEntry {
                weight: Some(90.0),
                ..Default::default()
            }),
        };
        let resolved = resolve_inputs(&sources, date(2024, 4, 1));
        assert_eq!(resolved.profile.weight_kg, Some(78.0));
        assert_eq!(resolved.provenance.weight, Some(Provenance::Anthropometry));
        assert_eq!(resolved.profile.height_cm, Some(175.0));
        assert_eq!(resolved.provenance.height, Some(Provenance::Profile));
    }

    #[test]
    fn test_manual_entry_is_normalised() {
        let sources = DataSources::manual(ManualEntry {
            weight: Some(154.0),
            weight_unit: WeightUnit::Lbs,
            height: Some(1.75),
            height_unit: HeightUnit::Meters,
            age_years: Some(40),
            sex: Some(Sex::Male),
            lean_mass_kg: None,
        });
        let resolved = resolve_inputs(&sources, date(2024, 1, 1));
        let weight = resolved.profile.weight_kg.unwrap();
        assert!((weight - 69.853).abs() < 0.001);
        assert!((resolved.profile.height_cm.unwrap() - 175.0).abs() < 1e-9);
        assert_eq!(resolved.provenance.age, Some(Provenance::Manual));
        assert!(resolved.missing_fields.is_empty());
    }

    #[test]
    fn test_age_from_birth_date_at_as_of() {
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 14)), Some(33));
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 15)), Some(34));
        assert_eq!(age_on(date(2025, 1, 1), date(2024, 1, 1)), None);

        let sources = DataSources {
            profile: Some(ProfileRecord {
                birth_date: Some(date(1990, 6, 15)),
                ..Default::default()
            }),
            manual: Some(ManualEntry {
                age_years: Some(50),
                ..Default::default()
            }),
            ..Default::default()
        };
        let resolved = resolve_inputs(&sources, date(2024, 1, 1));
        assert_eq!(resolved.profile.age_years, Some(33));
        assert_eq!(resolved.provenance.age, Some(Provenance::Profile));
    }

    #[test]
    fn test_implausible_value_falls_back_to_next_source() {
        let sources = DataSources {
            profile: Some(ProfileRecord {
                height_cm: Some(1.7),
                ..Default::default()
            }),
            manual: Some(ManualEntry {
                height: Some(170.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let resolved = resolve_inputs(&sources, date(2024, 1, 1));
        assert_eq!(resolved.profile.height_cm, Some(170.0));
        assert_eq!(resolved.provenance.height, Some(Provenance::Manual));
        assert_eq!(resolved.rejected.len(), 1);
        assert_eq!(resolved.rejected[0].display_label, "Height");
    }

    #[test]
    fn test_missing_fields_reported() {
        let resolved = resolve_inputs(&DataSources::default(), date(2024, 1, 1));
        assert_eq!(resolved.missing_fields, vec!["weight", "height", "age", "sex"]);
        assert_eq!(resolved.profile, BiometricProfile::default());
        assert_eq!(resolved.provenance, FieldProvenance::default());
    }

    #[test]
    fn test_measurements_come_from_latest_record_that_has_them() {
        let older = AnthropometricRecord {
            measured_on: date(2024, 1, 1),
            skinfolds: SkinfoldSet::new().with(SkinfoldSite::Triceps, 10.0),
            circumferences: CircumferenceSet::new()
                .with(CircumferenceSite::Waist, 80.0)
                .with(CircumferenceSite::Hip, 100.0),
            ..Default::default()
        };
        let newer = AnthropometricRecord {
            measured_on: date(2024, 2, 1),
            skinfolds: SkinfoldSet::new()
                .with(SkinfoldSite::Triceps, 12.0)
                .with(SkinfoldSite::Thigh, 250.0),
            ..Default::default()
        };
        let sources = DataSources {
            anthropometry: vec![older, newer],
            ..Default::default()
        };
        let resolved = resolve_inputs(&sources, date(2024, 3, 1));
        let skinfolds = resolved.skinfolds.unwrap();
        assert_eq!(skinfolds.get(SkinfoldSite::Triceps), Some(12.0));
        assert_eq!(skinfolds.get(SkinfoldSite::Thigh), None);
        assert_eq!(
            resolved.circumferences.unwrap().get(CircumferenceSite::Waist),
            Some(80.0)
        );
        assert_eq!(resolved.rejected[0].field, "thigh");
    }

    #[test]
    fn test_lean_mass_above_weight_rejected() {
        let sources = DataSources {
            anthropometry: vec![AnthropometricRecord {
                measured_on: date(2024, 1, 1),
                weight_kg: Some(70.0),
                lean_mass_kg: Some(75.0),
                ..Default::default()
            }],
            ..Default::default()
        };
        let resolved = resolve_inputs(&sources, date(2024, 1, 2));
        assert_eq!(resolved.profile.lean_mass_kg, None);
        assert_eq!(resolved.provenance.lean_mass, None);
    }
}
