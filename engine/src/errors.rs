//! Error types for the calculation engine
//!
//! Only genuinely invalid combinations surface as [`EngineError`]. Incomplete
//! data is an ordinary state while a form is being filled in and is reported
//! through `Option`s, availability flags and [`NotComputable`] instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard errors raised by the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid date range: target date {target} must be after start date {start}")]
    InvalidDateRange { start: NaiveDate, target: NaiveDate },

    #[error("Invalid activity factor: {0} is not one of the standard multipliers")]
    InvalidActivityFactor(f64),

    #[error("Goal adjustment {value} kcal is outside the allowed range [{min}, {max}]")]
    AdjustmentOutOfRange { value: i32, min: i32, max: i32 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Reason a body-composition estimate could not be produced
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NotComputable {
    #[error("Missing input: {}", fields.join(", "))]
    MissingInput { fields: Vec<String> },

    #[error("Body fat {body_fat_percent:.2}% is outside the physiological range (0, 100)")]
    OutOfRange { body_fat_percent: f64 },

    #[error("Invalid input for protocol: {message}")]
    InvalidProtocolInput { message: String },
}

impl NotComputable {
    pub(crate) fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NotComputable::MissingInput {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_message() {
        let err = EngineError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            target: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: target date 2024-01-01 must be after start date 2024-02-01"
        );
    }

    #[test]
    fn test_missing_input_lists_fields() {
        let err = NotComputable::missing(["age", "sex"]);
        assert_eq!(err.to_string(), "Missing input: age, sex");
    }
}
