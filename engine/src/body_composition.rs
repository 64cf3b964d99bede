//! Body composition estimation
//!
//! Skinfold protocols predict body density from caliper readings, age and
//! sex; the Siri (1961) equation turns density into body fat percent. A
//! bioimpedance reading skips the density step and is taken as measured.
//!
//! # References
//!
//! - Jackson, A.S. & Pollock, M.L. (1978). Generalized equations for
//!   predicting body density of men. *Br J Nutr*, 40(3), 497-504.
//! - Jackson, A.S., Pollock, M.L. & Ward, A. (1980). Generalized equations
//!   for predicting body density of women. *Med Sci Sports Exerc*, 12(3).
//! - Durnin, J.V. & Womersley, J. (1974). Body fat assessed from total body
//!   density and its estimation from skinfold thickness. *Br J Nutr*, 32(1).
//! - Siri, W.E. (1961). Body composition from fluid spaces and density.

use crate::errors::NotComputable;
use crate::inputs::{BiometricProfile, Sex, SkinfoldSet, SkinfoldSite};
use crate::validation::validate_percentage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

// ============================================================================
// Protocols
// ============================================================================

/// Body composition method selected by the clinician
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositionProtocol {
    /// Jackson & Pollock 3-site
    #[serde(rename = "skinfold_3")]
    Skinfold3,
    /// Jackson & Pollock 7-site
    #[serde(rename = "skinfold_7")]
    Skinfold7,
    /// 4-site logarithmic form
    #[serde(rename = "skinfold_4", alias = "weltman")]
    Skinfold4,
    /// Body fat percent read directly from a bioimpedance device
    #[serde(rename = "bioimpedance")]
    Bioimpedance,
}

impl CompositionProtocol {
    pub const ALL: [CompositionProtocol; 4] = [
        CompositionProtocol::Skinfold3,
        CompositionProtocol::Skinfold7,
        CompositionProtocol::Skinfold4,
        CompositionProtocol::Bioimpedance,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CompositionProtocol::Skinfold3 => "skinfold_3",
            CompositionProtocol::Skinfold7 => "skinfold_7",
            CompositionProtocol::Skinfold4 => "skinfold_4",
            CompositionProtocol::Bioimpedance => "bioimpedance",
        }
    }

    /// Density equation for skinfold protocols, `None` for bioimpedance
    pub fn equation(&self) -> Option<&'static SkinfoldEquation> {
        match self {
            CompositionProtocol::Skinfold3 => Some(&JACKSON_POLLOCK_3),
            CompositionProtocol::Skinfold7 => Some(&JACKSON_POLLOCK_7),
            CompositionProtocol::Skinfold4 => Some(&FOUR_SITE_LOG),
            CompositionProtocol::Bioimpedance => None,
        }
    }

    /// Caliper sites this protocol reads
    pub fn required_sites(&self) -> &'static [SkinfoldSite] {
        self.equation().map_or(&[], |eq| eq.required_sites)
    }
}

impl fmt::Display for CompositionProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CompositionProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skinfold_3" | "jackson_pollock_3" | "3_site" => Ok(CompositionProtocol::Skinfold3),
            "skinfold_7" | "jackson_pollock_7" | "7_site" => Ok(CompositionProtocol::Skinfold7),
            "skinfold_4" | "weltman" | "4_site" => Ok(CompositionProtocol::Skinfold4),
            "bioimpedance" | "bia" => Ok(CompositionProtocol::Bioimpedance),
            other => Err(format!("Unknown composition protocol: {}", other)),
        }
    }
}

/// `density = c0 - c1·S + c2·S² - c3·age`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticCoefficients {
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

/// `density = c0 - c1·log10(S)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogCoefficients {
    pub c0: f64,
    pub c1: f64,
}

/// Functional form of a density regression with its per-sex coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DensityEquation {
    Quadratic {
        male: QuadraticCoefficients,
        female: QuadraticCoefficients,
    },
    Log10 {
        male: LogCoefficients,
        female: LogCoefficients,
    },
}

impl DensityEquation {
    /// Body density (g/cm³) from the skinfold sum in mm
    pub fn density(&self, sum_mm: f64, age_years: u32, sex: Sex) -> f64 {
        match self {
            DensityEquation::Quadratic { male, female } => {
                let k = match sex {
                    Sex::Male => male,
                    Sex::Female => female,
                };
                k.c0 - k.c1 * sum_mm + k.c2 * sum_mm * sum_mm - k.c3 * f64::from(age_years)
            }
            DensityEquation::Log10 { male, female } => {
                let k = match sex {
                    Sex::Male => male,
                    Sex::Female => female,
                };
                k.c0 - k.c1 * sum_mm.log10()
            }
        }
    }
}

/// A skinfold protocol: which sites are summed and how the sum maps to density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinfoldEquation {
    pub required_sites: &'static [SkinfoldSite],
    pub equation: DensityEquation,
}

pub const JACKSON_POLLOCK_3: SkinfoldEquation = SkinfoldEquation {
    required_sites: &[
        SkinfoldSite::Triceps,
        SkinfoldSite::Subscapular,
        SkinfoldSite::Suprailiac,
    ],
    equation: DensityEquation::Quadratic {
        male: QuadraticCoefficients {
            c0: 1.10938,
            c1: 0.0008267,
            c2: 0.0000016,
            c3: 0.0002574,
        },
        female: QuadraticCoefficients {
            c0: 1.0994921,
            c1: 0.0009929,
            c2: 0.0000023,
            c3: 0.0001392,
        },
    },
};

pub const JACKSON_POLLOCK_7: SkinfoldEquation = SkinfoldEquation {
    required_sites: &[
        SkinfoldSite::Chest,
        SkinfoldSite::Axillary,
        SkinfoldSite::Triceps,
        SkinfoldSite::Subscapular,
        SkinfoldSite::Abdominal,
        SkinfoldSite::Suprailiac,
        SkinfoldSite::Thigh,
    ],
    equation: DensityEquation::Quadratic {
        male: QuadraticCoefficients {
            c0: 1.112,
            c1: 0.00043499,
            c2: 0.00000055,
            c3: 0.00028826,
        },
        female: QuadraticCoefficients {
            c0: 1.097,
            c1: 0.00046971,
            c2: 0.00000056,
            c3: 0.00012828,
        },
    },
};

/// Durnin & Womersley general-age (17-72 y) coefficients
pub const FOUR_SITE_LOG: SkinfoldEquation = SkinfoldEquation {
    required_sites: &[
        SkinfoldSite::Biceps,
        SkinfoldSite::Triceps,
        SkinfoldSite::Subscapular,
        SkinfoldSite::Suprailiac,
    ],
    equation: DensityEquation::Log10 {
        male: LogCoefficients {
            c0: 1.1765,
            c1: 0.0744,
        },
        female: LogCoefficients {
            c0: 1.1567,
            c1: 0.0717,
        },
    },
};

// ============================================================================
// Density and Siri Conversion
// ============================================================================

/// Siri (1961): BF% = (4.95 / density - 4.5) × 100
pub fn siri_body_fat_percent(density: f64) -> f64 {
    (4.95 / density - 4.5) * 100.0
}

/// Body density from a skinfold protocol
///
/// Requires age, sex and every site the protocol reads; the error lists
/// whatever is missing.
pub fn body_density(
    equation: &SkinfoldEquation,
    skinfolds: &SkinfoldSet,
    age_years: Option<u32>,
    sex: Option<Sex>,
) -> Result<f64, NotComputable> {
    let mut missing: Vec<&str> = Vec::new();
    if age_years.filter(|a| *a > 0).is_none() {
        missing.push("age");
    }
    if sex.is_none() {
        missing.push("sex");
    }

    let mut sum_mm = 0.0;
    for site in equation.required_sites {
        match skinfolds.get(*site) {
            Some(mm) => sum_mm += mm,
            None => missing.push(site.name()),
        }
    }

    match (age_years, sex) {
        (Some(age), Some(sex)) if missing.is_empty() => {
            Ok(equation.equation.density(sum_mm, age, sex))
        }
        _ => Err(NotComputable::missing(missing)),
    }
}

// ============================================================================
// Body Fat Classification
// ============================================================================

/// Body fat category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFatCategory {
    Essential,
    Athletic,
    Fitness,
    Average,
    Obese,
}

impl BodyFatCategory {
    /// Lower body fat percent of each category by sex
    fn lower_bounds(sex: Sex) -> [(f64, BodyFatCategory); 4] {
        match sex {
            Sex::Male => [
                (25.0, BodyFatCategory::Obese),
                (18.0, BodyFatCategory::Average),
                (14.0, BodyFatCategory::Fitness),
                (6.0, BodyFatCategory::Athletic),
            ],
            Sex::Female => [
                (32.0, BodyFatCategory::Obese),
                (25.0, BodyFatCategory::Average),
                (21.0, BodyFatCategory::Fitness),
                (14.0, BodyFatCategory::Athletic),
            ],
        }
    }
}

/// Classify body fat percentage
pub fn classify_body_fat(body_fat_percent: f64, sex: Sex) -> BodyFatCategory {
    BodyFatCategory::lower_bounds(sex)
        .iter()
        .find(|(lower, _)| body_fat_percent >= *lower)
        .map_or(BodyFatCategory::Essential, |(_, category)| *category)
}

// ============================================================================
// Estimation
// ============================================================================

/// Accepted body composition estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub protocol: CompositionProtocol,
    /// Absent for bioimpedance
    pub body_density: Option<f64>,
    pub body_fat_percent: f64,
    /// Absent when body weight is unknown
    pub fat_mass_kg: Option<f64>,
    pub lean_mass_kg: Option<f64>,
    pub category: Option<BodyFatCategory>,
}

/// Estimate body composition with the selected protocol
///
/// Recomputes from scratch on every call. Results outside (0, 100) % are
/// discarded, never clamped.
pub fn estimate_body_composition(
    profile: &BiometricProfile,
    protocol: CompositionProtocol,
    skinfolds: Option<&SkinfoldSet>,
    bioimpedance_percent: Option<f64>,
) -> Result<CompositionResult, NotComputable> {
    let (body_density, body_fat_percent) = match protocol.equation() {
        Some(equation) => {
            let empty = SkinfoldSet::new();
            let density = body_density(
                equation,
                skinfolds.unwrap_or(&empty),
                profile.age(),
                profile.sex,
            )
            .map_err(|reason| {
                debug!(protocol = %protocol, %reason, "Skinfold protocol not evaluated");
                reason
            })?;
            (Some(density), siri_body_fat_percent(density))
        }
        None => {
            let percent = bioimpedance_percent
                .filter(|p| p.is_finite())
                .ok_or_else(|| NotComputable::missing(["bioimpedance_percent"]))?;
            validate_percentage(percent)
                .map_err(|message| NotComputable::InvalidProtocolInput { message })?;
            (None, percent)
        }
    };

    if !(body_fat_percent > 0.0 && body_fat_percent < 100.0) {
        warn!(
            protocol = %protocol,
            body_fat_percent,
            "Discarding body fat estimate outside the physiological range"
        );
        return Err(NotComputable::OutOfRange { body_fat_percent });
    }

    let fat_mass_kg = profile.weight().map(|w| w * body_fat_percent / 100.0);
    let lean_mass_kg = profile.weight().zip(fat_mass_kg).map(|(w, fat)| w - fat);

    Ok(CompositionResult {
        protocol,
        body_density,
        body_fat_percent,
        fat_mass_kg,
        lean_mass_kg,
        category: profile.sex.map(|s| classify_body_fat(body_fat_percent, s)),
    })
}
