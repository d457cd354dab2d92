//! Doctor command - Diagnose configuration and connectivity issues

use clap::Args;
use serde_json::Value;

use iga_sync::{
    extract_page, IgaClient, IgaConfig, IgaError, IgaResult, SyncStats, EMAIL_KEYS,
    FIRST_NAME_KEYS, ID_KEYS, LAST_NAME_KEYS, STATUS_KEYS,
};

use crate::error::{CliError, CliResult};
use crate::models::{DiagnosticCheck, DiagnosticReport, DiagnosticStatus};

const RESET: &str = "\x1b[0m";

/// Endpoints probed in order until one answers.
const PROBE_ENDPOINTS: &[&str] = &[
    "organizations",
    "systemusers?limit=1",
    "users?limit=1",
    "admin/directory/v1/users?maxResults=1",
];

/// Endpoints that return user records, for sampling the directory schema.
const USER_SAMPLE_ENDPOINTS: &[&str] = &[
    "systemusers?limit=1",
    "users?limit=1",
    "admin/directory/v1/users?maxResults=1",
];

/// Fields a usable user record is graded against, as
/// (field, candidate source keys) pairs.
const REQUIRED_FIELDS: [(&str, &[&str]); 5] = [
    ("id", ID_KEYS),
    ("email", EMAIL_KEYS),
    ("first name", FIRST_NAME_KEYS),
    ("last name", LAST_NAME_KEYS),
    ("status", STATUS_KEYS),
];

/// Minimum graded fields a sampled record must cover.
const MIN_RECOGNIZED_FIELDS: usize = 3;

/// Arguments for the doctor command
#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Check that configuration resolves from the environment
fn check_configuration() -> (DiagnosticCheck, Option<IgaConfig>) {
    match IgaConfig::from_env() {
        Ok(config) => {
            let check = DiagnosticCheck::pass(
                "configuration",
                "Configuration",
                &format!("Resolved, API at {}", config.api_url),
            );
            (check, Some(config))
        }
        Err(e) => {
            let check = DiagnosticCheck::fail(
                "configuration",
                "Configuration",
                &format!("Configuration invalid: {e}"),
                "Set IGA_API_URL and IGA_API_KEY in the environment",
            );
            (check, None)
        }
    }
}

/// Builds a client tuned for fast-failing probes.
fn probe_client(config: IgaConfig) -> IgaResult<IgaClient> {
    let probe = config
        .with_timeout_secs(10)
        .with_max_retries(1)
        .with_retry_delay_secs(1)
        .with_rate_limit_delay_secs(0.0)
        .with_rate_limit_max_retries(1);
    IgaClient::new(probe)
}

/// Check that at least one known endpoint answers
///
/// Any HTTP response counts as reachable, even an error status. Whether
/// the key is accepted is the authentication check's concern.
async fn check_connectivity(client: &IgaClient) -> DiagnosticCheck {
    let mut last_error = String::new();

    for endpoint in PROBE_ENDPOINTS {
        let mut stats = SyncStats::new();
        match client.get_json(endpoint, &[], &mut stats).await {
            Ok(_) => {
                return DiagnosticCheck::pass(
                    "connectivity",
                    "Connectivity",
                    &format!("Reached {endpoint}"),
                );
            }
            Err(err) => match err {
                IgaError::Http { status, .. } => {
                    return DiagnosticCheck::pass(
                        "connectivity",
                        "Connectivity",
                        &format!("Reached {endpoint} (status {status})"),
                    );
                }
                other => last_error = other.to_string(),
            },
        }
    }

    DiagnosticCheck::fail(
        "connectivity",
        "Connectivity",
        &format!("No API endpoint answered: {last_error}"),
        "Check the network path to IGA_API_URL",
    )
}

/// Check that the API key is accepted, via an organization lookup
async fn check_authentication(client: &IgaClient) -> DiagnosticCheck {
    let mut stats = SyncStats::new();
    let endpoint = match &client.config().org_id {
        Some(org_id) => format!("organizations/{org_id}"),
        None => "organizations".to_string(),
    };

    match client.get_json(&endpoint, &[], &mut stats).await {
        Ok(body) => {
            let name = body
                .get("displayName")
                .or_else(|| body.get("name"))
                .and_then(Value::as_str);
            let message = match name {
                Some(name) => format!("API key accepted (organization {name})"),
                None => "API key accepted".to_string(),
            };
            DiagnosticCheck::pass("authentication", "Authentication", &message)
        }
        Err(IgaError::Http { status: 401, .. }) => DiagnosticCheck::fail(
            "authentication",
            "Authentication",
            "API key was rejected (401)",
            "Check that IGA_API_KEY holds a valid API key",
        ),
        Err(IgaError::Http { status: 403, .. }) => DiagnosticCheck::warn(
            "authentication",
            "Authentication",
            "API key lacks permission for organization lookup (403)",
            Some("Grant the key read access, or set IGA_ORG_ID to a permitted organization"),
        ),
        Err(IgaError::Http { status, .. }) => DiagnosticCheck::warn(
            "authentication",
            "Authentication",
            &format!("Unexpected status {status} from organization lookup"),
            None,
        ),
        Err(e) => DiagnosticCheck::skip(
            "authentication",
            "Authentication",
            &format!("Skipped - organization lookup did not complete: {e}"),
        ),
    }
}

/// Check that directory records carry recognizable user fields
async fn check_data_format(client: &IgaClient) -> DiagnosticCheck {
    for endpoint in USER_SAMPLE_ENDPOINTS {
        let mut stats = SyncStats::new();
        let body = match client.get_json(endpoint, &[], &mut stats).await {
            Ok(body) => body,
            Err(_) => continue,
        };

        let (records, _) = extract_page(&body);
        if let Some(record) = records.first() {
            return grade_record(record);
        }
    }

    DiagnosticCheck::warn(
        "data_format",
        "Data Format",
        "No user record available to sample",
        Some("Verify the API key can list users"),
    )
}

/// Grades one sampled record against the required field candidates.
fn grade_record(record: &Value) -> DiagnosticCheck {
    let recognized: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .filter(|(_, candidates)| candidates.iter().any(|key| record.get(key).is_some()))
        .map(|(field, _)| *field)
        .collect();

    let summary = format!(
        "{}/{} required fields recognized",
        recognized.len(),
        REQUIRED_FIELDS.len()
    );

    if recognized.len() >= MIN_RECOGNIZED_FIELDS {
        DiagnosticCheck::pass(
            "data_format",
            "Data Format",
            &format!("{summary} ({})", recognized.join(", ")),
        )
    } else {
        DiagnosticCheck::fail(
            "data_format",
            "Data Format",
            &summary,
            "The directory records do not match the expected user field names",
        )
    }
}

/// Run all diagnostic checks
async fn run_all_checks() -> DiagnosticReport {
    let mut checks = Vec::new();

    // Check 1: Configuration
    let (config_check, config) = check_configuration();
    let config_ok = config_check.status.is_ok();
    checks.push(config_check);

    let client = if config_ok {
        config.and_then(|config| probe_client(config).ok())
    } else {
        None
    };

    match client {
        Some(client) => {
            // Check 2: Connectivity
            let connectivity = check_connectivity(&client).await;
            let connected = connectivity.status.is_ok();
            checks.push(connectivity);

            if connected {
                // Check 3: Authentication
                let auth = check_authentication(&client).await;
                let auth_ok = auth.status.is_ok();
                checks.push(auth);

                // Check 4: Data format (requires an accepted key)
                if auth_ok {
                    checks.push(check_data_format(&client).await);
                } else {
                    checks.push(DiagnosticCheck::skip(
                        "data_format",
                        "Data Format",
                        "Skipped - authentication failed",
                    ));
                }
            } else {
                checks.push(DiagnosticCheck::skip(
                    "authentication",
                    "Authentication",
                    "Skipped - no API endpoint reachable",
                ));
                checks.push(DiagnosticCheck::skip(
                    "data_format",
                    "Data Format",
                    "Skipped - no API endpoint reachable",
                ));
            }
        }
        None => {
            checks.push(DiagnosticCheck::skip(
                "connectivity",
                "Connectivity",
                "Skipped - configuration failed",
            ));
            checks.push(DiagnosticCheck::skip(
                "authentication",
                "Authentication",
                "Skipped - configuration failed",
            ));
            checks.push(DiagnosticCheck::skip(
                "data_format",
                "Data Format",
                "Skipped - configuration failed",
            ));
        }
    }

    DiagnosticReport::new(checks)
}

/// Print human-readable output
fn print_report(report: &DiagnosticReport) {
    let use_color = std::env::var("NO_COLOR").is_err();

    println!();
    println!("iga-sync doctor");
    println!("═══════════════════════════════════════════════════════");
    println!();

    for check in &report.checks {
        let status_display = if use_color {
            format!(
                "{}{} {}{}",
                check.status.color(),
                check.status.symbol(),
                check.status.display(),
                RESET
            )
        } else {
            format!("{} {}", check.status.symbol(), check.status.display())
        };

        // Align columns: display_name (20 chars), status (10 chars), message
        println!(
            "  {:<20} {:>10}    {}",
            check.display_name, status_display, check.message
        );

        if let Some(ref suggestion) = check.suggestion {
            if use_color {
                println!("                              └─ \x1b[90m{suggestion}{RESET}");
            } else {
                println!("                              └─ {suggestion}");
            }
        }
    }

    println!();
    println!("═══════════════════════════════════════════════════════");

    let overall_label = match report.overall_status {
        DiagnosticStatus::Pass => "All checks passed".to_string(),
        DiagnosticStatus::Fail => {
            let count = report.fail_count();
            if count == 1 {
                "1 check failed".to_string()
            } else {
                format!("{count} checks failed")
            }
        }
        DiagnosticStatus::Warn => "Warnings detected".to_string(),
        DiagnosticStatus::Skip => "Checks skipped".to_string(),
    };
    let overall_display = if use_color {
        format!(
            "{}{} {}{}",
            report.overall_status.color(),
            report.overall_status.symbol(),
            overall_label,
            RESET
        )
    } else {
        format!("{} {}", report.overall_status.symbol(), overall_label)
    };

    println!("  Overall Status: {overall_display}");
    println!();
    println!("  CLI Version: {}", report.cli_version);
    println!("  Checked at: {}", report.timestamp);
    println!();
}

/// Execute the doctor command
pub async fn execute(args: DoctorArgs) -> CliResult<()> {
    let report = run_all_checks().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    // Non-zero exit for scripting when any check failed
    if report.overall_status == DiagnosticStatus::Fail {
        return Err(CliError::Validation(
            "One or more diagnostic checks failed".to_string(),
        ));
    }

    Ok(())
}
