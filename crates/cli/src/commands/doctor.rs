use geoinsight_core::config::{AppConfig, LoadOptions};
use geoinsight_db::{connect, ping};
use geoinsight_integrations::{handshake, HandshakeReport, HandshakeStatus};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const PROVIDERS: [&str; 3] = ["twilio", "vapi", "groq"];

/// Exit code follows the first failing check: 2 config, 4 database, 6 provider.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = exit_code(&report);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn exit_code(report: &DoctorReport) -> u8 {
    let first_failure = report.checks.iter().find(|check| check.status == CheckStatus::Fail);
    match first_failure.map(|check| check.name.as_str()) {
        None => 0,
        Some("config_validation") => 2,
        Some("database_connectivity") => 4,
        Some(_) => 6,
    }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation".to_string(),
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(run_connectivity_checks(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation".to_string(),
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in std::iter::once("database").chain(PROVIDERS) {
                checks.push(DoctorCheck {
                    name: format!("{name}_connectivity"),
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    // Providers without credentials are reported but do not fail the run.
    let healthy = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if healthy { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if healthy {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn run_connectivity_checks(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![DoctorCheck {
                name: "database_connectivity".to_string(),
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            }];
        }
    };

    runtime.block_on(async {
        let mut checks = vec![check_database_connectivity(config).await];
        checks.extend(handshake::run_all(config).await.into_iter().map(provider_check));
        checks
    })
}

async fn check_database_connectivity(config: &AppConfig) -> DoctorCheck {
    let result = async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;
        let probe = ping(&pool).await.map_err(|error| format!("database ping failed: {error}"));
        pool.close().await;
        probe
    }
    .await;

    match result {
        Ok(()) => DoctorCheck {
            name: "database_connectivity".to_string(),
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        },
        Err(error) => DoctorCheck {
            name: "database_connectivity".to_string(),
            status: CheckStatus::Fail,
            details: error,
        },
    }
}

fn provider_check(report: HandshakeReport) -> DoctorCheck {
    let status = match report.status {
        HandshakeStatus::Pass => CheckStatus::Pass,
        HandshakeStatus::Fail => CheckStatus::Fail,
        HandshakeStatus::Skipped => CheckStatus::Skipped,
    };
    DoctorCheck {
        name: format!("{}_connectivity", report.provider),
        status,
        details: report.details,
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
