//! Activity factor suggestions
//!
//! The patient's reported exercise frequency maps to a default activity
//! level. The result is a [`Suggestion`], never written into a profile or an
//! energy result by the engine: the caller decides whether to take it, and a
//! factor the clinician picked by hand always wins.

use crate::energy::ActivityLevel;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reported weekly exercise frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseFrequency {
    None,
    OneToThreeWeekly,
    ThreeToFiveWeekly,
    SixToSevenWeekly,
    TwiceDailyOrMore,
}

impl ExerciseFrequency {
    pub fn activity_level(&self) -> ActivityLevel {
        match self {
            ExerciseFrequency::None => ActivityLevel::Sedentary,
            ExerciseFrequency::OneToThreeWeekly => ActivityLevel::LightlyActive,
            ExerciseFrequency::ThreeToFiveWeekly => ActivityLevel::ModeratelyActive,
            ExerciseFrequency::SixToSevenWeekly => ActivityLevel::VeryActive,
            ExerciseFrequency::TwiceDailyOrMore => ActivityLevel::ExtraActive,
        }
    }
}

impl FromStr for ExerciseFrequency {
    type Err = String;

    /// Accepts the bucket ids plus the short forms intake forms tend to use
    /// ("1-3x", "3 a 5", "2x/day", ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '_' | '–' | '—' => '-',
                other => other,
            })
            .collect();

        match normalized.as_str() {
            "none" | "never" | "no" | "0" | "0x" | "sedentary" => Ok(ExerciseFrequency::None),
            "1-3" | "1-3x" | "1a3" | "1-3x/week" | "one-to-three-weekly" => {
                Ok(ExerciseFrequency::OneToThreeWeekly)
            }
            "3-5" | "3-5x" | "3a5" | "3-5x/week" | "three-to-five-weekly" => {
                Ok(ExerciseFrequency::ThreeToFiveWeekly)
            }
            "6-7" | "6-7x" | "6a7" | "6-7x/week" | "daily" | "six-to-seven-weekly" => {
                Ok(ExerciseFrequency::SixToSevenWeekly)
            }
            "2x/day" | "2xday" | "2x-per-day" | "twice-daily" | "2x-per-day-or-more"
            | "twice-daily-or-more" => Ok(ExerciseFrequency::TwiceDailyOrMore),
            _ => Err(format!("Unrecognized exercise frequency: {}", s)),
        }
    }
}

/// A value the engine proposes but does not apply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Suggestion<T> {
    pub value: T,
    pub source: ExerciseFrequency,
}

impl<T> Suggestion<T> {
    /// Take the suggested value
    pub fn accept(self) -> T {
        self.value
    }
}

/// Suggest an activity level from an exercise-frequency bucket
///
/// Unrecognized input yields no suggestion; the caller keeps its current level.
pub fn suggest_activity_level(exercise_frequency: &str) -> Option<Suggestion<ActivityLevel>> {
    let source: ExerciseFrequency = exercise_frequency.parse().ok()?;
    Some(Suggestion {
        value: source.activity_level(),
        source,
    })
}

/// Suggest the activity multiplier for an exercise-frequency bucket
pub fn suggest_activity_factor(exercise_frequency: &str) -> Option<f64> {
    suggest_activity_level(exercise_frequency).map(|s| s.accept().multiplier())
}

/// Pick the effective level: manual choice, then accepted suggestion, then fallback
pub fn resolve_activity_level(
    manual: Option<ActivityLevel>,
    suggestion: Option<Suggestion<ActivityLevel>>,
    fallback: ActivityLevel,
) -> ActivityLevel {
    manual
        .or_else(|| suggestion.map(Suggestion::accept))
        .unwrap_or(fallback)
}
