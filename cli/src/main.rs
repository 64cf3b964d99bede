//! NutriClinic command-line assessment
//!
//! Reads an assessment request as JSON (from the file given as the first
//! argument, or stdin when it is absent or `-`), runs the engine and prints
//! the report as JSON on stdout. Logs go to stderr.

mod config;

use anyhow::{Context, Result};
use crate::config::CliConfig;
use nutriclinic_engine::{assess, AssessmentRequest, EngineConfig};
use std::io::{self, Read};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = CliConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %CliConfig::environment(),
        "Starting NutriClinic assessment"
    );

    let path = std::env::args().nth(1);
    let input = read_input(path.as_deref())?;
    let output = run(&input, &config.engine)?;
    println!("{}", output);

    Ok(())
}

fn init_tracing(config: &CliConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.as_str().into());

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.logging.json || CliConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path)),
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            Ok(buffer)
        }
    }
}

/// Parse a request, assess it and render the report
fn run(input: &str, config: &EngineConfig) -> Result<String> {
    let request: AssessmentRequest =
        serde_json::from_str(input).context("Invalid assessment request")?;
    debug!(as_of = %request.as_of, "Assessment request parsed");

    let report = assess(&request, config)?;
    if !report.missing_fields.is_empty() {
        info!(missing = ?report.missing_fields, "Assessment is incomplete");
    }

    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_run_produces_report() {
        let input = r#"{
            "as_of": "2024-01-01",
            "sources": {
                "manual": {"weight": 80, "height": 180, "age_years": 30, "sex": "male"}
            },
            "exercise_frequency": "1-3x"
        }"#;
        let output = run(input, &EngineConfig::default()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(report["energy"]["protocol"], "mifflin_st_jeor");
        assert_eq!(report["activity_level"], "lightly_active");
        assert_eq!(report["missing_fields"].as_array().unwrap().len(), 0);
    }

    #[rstest]
    #[case("not json", "Invalid assessment request")]
    #[case(
        r#"{"as_of":"2024-01-01","goal_adjustment_kcal":-5000}"#,
        "outside the allowed range"
    )]
    fn test_run_reports_errors(#[case] input: &str, #[case] expected: &str) {
        let sources = r#"{"manual":{"weight":80,"height":180,"age_years":30,"sex":"male"}}"#;
        let input = input.replacen("{\"as_of\"", &format!("{{\"sources\":{},\"as_of\"", sources), 1);
        let err = run(&input, &EngineConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains(expected));
    }

    #[test]
    fn test_read_input_from_missing_file() {
        let err = read_input(Some("/nonexistent/request.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read request file"));
    }
}
