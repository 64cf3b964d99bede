//! Unit handling for biometric inputs and energy outputs
//!
//! Every formula in the engine works in a single canonical unit per quantity:
//! kilograms, centimeters and kilocalories. Values typed in other units are
//! normalised once, at the resolver boundary, and never inside a formula.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KG_PER_POUND: f64 = 0.453_592_37;
const KG_PER_STONE: f64 = 6.350_293_18;
const CM_PER_INCH: f64 = 2.54;
const KJ_PER_KCAL: f64 = 4.184;

// ============================================================================
// Body Weight
// ============================================================================

/// Unit a body weight was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
    Stone,
}

impl WeightUnit {
    /// Normalise a value in this unit to kilograms
    pub fn to_kg(self, value: f64) -> f64 {
        value * self.kg_factor()
    }

    /// Express a kilogram value in this unit
    pub fn from_kg(self, kg: f64) -> f64 {
        kg / self.kg_factor()
    }

    fn kg_factor(self) -> f64 {
        match self {
            WeightUnit::Kg => 1.0,
            WeightUnit::Lbs => KG_PER_POUND,
            WeightUnit::Stone => KG_PER_STONE,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
            WeightUnit::Stone => "st",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            "st" | "stone" | "stones" => Ok(WeightUnit::Stone),
            other => Err(format!("Unknown weight unit: {}", other)),
        }
    }
}

// ============================================================================
// Stature
// ============================================================================

/// Unit a stature was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    Meters,
    Inches,
}

impl HeightUnit {
    /// Normalise a value in this unit to centimeters
    pub fn to_cm(self, value: f64) -> f64 {
        match self {
            HeightUnit::Cm => value,
            HeightUnit::Meters => value * 100.0,
            HeightUnit::Inches => value * CM_PER_INCH,
        }
    }

    /// Express a centimeter value in this unit
    pub fn from_cm(self, cm: f64) -> f64 {
        match self {
            HeightUnit::Cm => cm,
            HeightUnit::Meters => cm / 100.0,
            HeightUnit::Inches => cm / CM_PER_INCH,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Meters => "m",
            HeightUnit::Inches => "in",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for HeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(HeightUnit::Cm),
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(HeightUnit::Meters),
            "in" | "inch" | "inches" => Ok(HeightUnit::Inches),
            other => Err(format!("Unknown height unit: {}", other)),
        }
    }
}

// ============================================================================
// Energy
// ============================================================================

/// Unit used when presenting energy values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyUnit {
    #[default]
    Kcal,
    Kj,
}

impl EnergyUnit {
    /// Express a kilocalorie value in this unit
    pub fn from_kcal(self, kcal: f64) -> f64 {
        match self {
            EnergyUnit::Kcal => kcal,
            EnergyUnit::Kj => kcal * KJ_PER_KCAL,
        }
    }

    /// Normalise a value in this unit to kilocalories
    pub fn to_kcal(self, value: f64) -> f64 {
        match self {
            EnergyUnit::Kcal => value,
            EnergyUnit::Kj => value / KJ_PER_KCAL,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            EnergyUnit::Kcal => "kcal",
            EnergyUnit::Kj => "kJ",
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for EnergyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kcal" | "cal" | "calories" => Ok(EnergyUnit::Kcal),
            "kj" | "kilojoule" | "kilojoules" => Ok(EnergyUnit::Kj),
            other => Err(format!("Unknown energy unit: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_weight_conversions() {
        assert!((WeightUnit::Lbs.to_kg(100.0) - 45.359).abs() < 0.001);
        assert!((WeightUnit::Stone.to_kg(11.0) - 69.853).abs() < 0.001);
        assert_eq!(WeightUnit::Kg.to_kg(72.5), 72.5);
    }

    #[test]
    fn test_known_height_conversions() {
        assert!((HeightUnit::Inches.to_cm(70.0) - 177.8).abs() < 1e-9);
        assert!((HeightUnit::Meters.to_cm(1.7) - 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_display_in_kilojoules() {
        assert!((EnergyUnit::Kj.from_kcal(2000.0) - 8368.0).abs() < 1e-9);
        assert_eq!(EnergyUnit::Kj.to_string(), "kJ");
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!(" LBS ".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert_eq!("metres".parse::<HeightUnit>().unwrap(), HeightUnit::Meters);
        assert_eq!("kJ".parse::<EnergyUnit>().unwrap(), EnergyUnit::Kj);
        assert!("furlong".parse::<HeightUnit>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: converting heavier values always yields heavier kilograms
        #[test]
        fn prop_weight_conversion_monotonic(a in 20.0f64..300.0, b in 300.0f64..600.0) {
            for unit in [WeightUnit::Kg, WeightUnit::Lbs, WeightUnit::Stone] {
                prop_assert!(unit.to_kg(b) > unit.to_kg(a));
            }
        }

        #[test]
        fn prop_height_inverse(cm in 50.0f64..300.0) {
            for unit in [HeightUnit::Cm, HeightUnit::Meters, HeightUnit::Inches] {
                prop_assert!((unit.to_cm(unit.from_cm(cm)) - cm).abs() < 1e-9);
            }
        }
    }
}
