//! End-to-end reference scenarios

use chrono::NaiveDate;
use nutriclinic_engine::{
    assess, compute_anthropometric_indices, estimate_body_composition, plan_goal_viability,
    AnthropometricRecord, AssessmentRequest, BiometricProfile, BmiCategory, BmrProtocol,
    CircumferenceSet, CircumferenceSite, CompositionProtocol, DataSources, EngineConfig,
    GoalDirection, GoalRequest, PlannerConfig, ProfileRecord, Provenance, Sex, SkinfoldSet,
    SkinfoldSite, WarningSeverity, WeightStatus, WhrCategory, WhrPolicy,
};
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn scenario_a_bmi_and_ideal_range() {
    let profile = BiometricProfile::new()
        .with_weight_kg(70.0)
        .with_height_cm(170.0);
    let indices = compute_anthropometric_indices(&profile, None, WhrPolicy::default());

    let bmi = indices.bmi.unwrap();
    assert!((bmi - 24.2215).abs() < 1e-4);
    assert_eq!(indices.bmi_category, Some(BmiCategory::Normal));

    let range = indices.ideal_weight_range.unwrap();
    assert!((range.min_kg - 53.465).abs() < 1e-9);
    assert!((range.max_kg - 71.961).abs() < 1e-9);
    assert_eq!(indices.weight_status, Some(WeightStatus::Within));
    assert_eq!(indices.whr, None);
}

#[test]
fn scenario_b_three_site_skinfolds() {
    let profile = BiometricProfile::new()
        .with_age_years(30)
        .with_sex(Sex::Male)
        .with_weight_kg(80.0);
    let skinfolds = SkinfoldSet::new()
        .with(SkinfoldSite::Triceps, 12.0)
        .with(SkinfoldSite::Subscapular, 10.0)
        .with(SkinfoldSite::Suprailiac, 14.0);

    let result =
        estimate_body_composition(&profile, CompositionProtocol::Skinfold3, Some(&skinfolds), None)
            .unwrap();

    assert!((result.body_density.unwrap() - 1.0739704).abs() < 1e-6);
    assert!((result.body_fat_percent - 10.91).abs() < 0.005);
    let fat = result.fat_mass_kg.unwrap();
    let lean = result.lean_mass_kg.unwrap();
    assert!((fat + lean - 80.0).abs() < 1e-9);
}

#[test]
fn scenario_c_aggressive_loss() {
    let plan = plan_goal_viability(
        80.0,
        75.0,
        date(2024, 1, 1),
        date(2024, 2, 1),
        &PlannerConfig::default(),
    )
    .unwrap();

    assert_eq!(plan.direction, GoalDirection::Loss);
    assert!((plan.required_weekly_rate_kg - 1.13).abs() < 0.01);
    assert!(plan.viability_score <= 3);
    assert!(!plan.warnings.is_empty());
    assert_eq!(plan.warnings[0].severity, WarningSeverity::High);
    assert!(plan.minimum_deadline_days <= plan.ideal_deadline_days);
}

#[rstest]
#[case(0.80, WhrPolicy::Unisex, Sex::Female, WhrCategory::Low)]
#[case(0.90, WhrPolicy::Unisex, Sex::Female, WhrCategory::Moderate)]
#[case(0.90, WhrPolicy::SexSpecific, Sex::Female, WhrCategory::High)]
#[case(0.90, WhrPolicy::SexSpecific, Sex::Male, WhrCategory::Moderate)]
fn whr_policy_is_applied(
    #[case] whr: f64,
    #[case] policy: WhrPolicy,
    #[case] sex: Sex,
    #[case] expected: WhrCategory,
) {
    let profile = BiometricProfile::new().with_sex(sex);
    let circumferences = CircumferenceSet::new()
        .with(CircumferenceSite::Waist, whr * 100.0)
        .with(CircumferenceSite::Hip, 100.0);
    let indices = compute_anthropometric_indices(&profile, Some(&circumferences), policy);
    assert_eq!(indices.whr_category, Some(expected));
}

#[test]
fn full_assessment_from_mixed_sources() {
    let sources = DataSources {
        anthropometry: vec![AnthropometricRecord {
            measured_on: date(2024, 1, 10),
            weight_kg: Some(80.0),
            skinfolds: SkinfoldSet::new()
                .with(SkinfoldSite::Triceps, 12.0)
                .with(SkinfoldSite::Subscapular, 10.0)
                .with(SkinfoldSite::Suprailiac, 14.0),
            circumferences: CircumferenceSet::new()
                .with(CircumferenceSite::Waist, 84.0)
                .with(CircumferenceSite::Hip, 100.0),
            ..Default::default()
        }],
        profile: Some(ProfileRecord {
            weight_kg: Some(83.0),
            height_cm: Some(180.0),
            birth_date: Some(date(1993, 6, 1)),
            sex: Some(Sex::Male),
        }),
        manual: None,
    };

    let mut request = AssessmentRequest::new(sources, date(2024, 2, 1));
    request.composition_protocol = Some(CompositionProtocol::Skinfold3);
    request.exercise_frequency = Some("1-3x".to_string());
    request.goal_adjustment_kcal = -300;
    request.goal = Some(GoalRequest {
        target_weight_kg: 76.0,
        target_date: date(2024, 5, 1),
        start_date: None,
        initial_weight_kg: None,
    });

    let report = assess(&request, &EngineConfig::default()).unwrap();

    assert_eq!(report.inputs.provenance.weight, Some(Provenance::Anthropometry));
    assert_eq!(report.inputs.provenance.height, Some(Provenance::Profile));
    assert_eq!(report.inputs.profile.age_years, Some(30));
    assert!(report.missing_fields.is_empty());

    assert_eq!(report.indices.whr_category, Some(WhrCategory::Low));
    assert!((report.composition.as_ref().unwrap().body_fat_percent - 10.91).abs() < 0.005);

    let energy = report.energy.as_ref().unwrap();
    assert_eq!(energy.protocol, BmrProtocol::Cunningham);
    assert!((energy.activity_factor - 1.375).abs() < 1e-12);
    assert!((energy.target_kcal - (energy.get_kcal - 300.0)).abs() < 1e-9);

    let goal = report.goal.as_ref().unwrap();
    assert_eq!(goal.start_date, date(2024, 2, 1));
    assert_eq!(goal.viability_score, 5);
    assert!(goal.warnings.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["inputs"]["provenance"]["weight"], "anthropometry");
    assert_eq!(json["composition"]["protocol"], "skinfold_3");
}
