//! Report command - Generate downstream documents from user data

use std::fs;

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use iga_sync::{
    bulk_import_payload, compliance_report, default_report_period, department_breakdown,
    department_reports, monitoring_metrics, security_report, slack_notification, IgaUser,
    SyncStats, UserExport, UserSyncService, DEFAULT_AUDITOR,
};

use crate::error::{CliError, CliResult};
use crate::output::print_success;

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Which report to generate
    #[arg(long, value_enum)]
    pub kind: ReportKind,

    /// Path to an export produced by `iga-sync sync`; omit to run a fresh retrieval
    #[arg(long)]
    pub input: Option<String>,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    /// Reporting period for compliance reports, e.g. Q3_2026
    #[arg(long)]
    pub period: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ReportKind {
    Security,
    Departments,
    Compliance,
    Monitoring,
    Slack,
    BulkImport,
}

/// Execute the report command
pub async fn execute(args: ReportArgs) -> CliResult<()> {
    let (users, stats) = match &args.input {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("cannot read {}: {}", path, e)))?;
            let export: UserExport = serde_json::from_str(&contents).map_err(|e| {
                CliError::Validation(format!("{} is not a valid export: {}", path, e))
            })?;
            (export.users, export.metadata.sync_stats)
        }
        None => {
            let mut service = UserSyncService::from_env()?;
            service.retrieve_all_users().await?;
            (service.users().to_vec(), service.stats().clone())
        }
    };

    let document = build_report(&args, &users, &stats, Utc::now())?;
    let rendered = serde_json::to_string_pretty(&document)?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            print_success(&format!("Report written to {}", path));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn build_report(
    args: &ReportArgs,
    users: &[IgaUser],
    stats: &SyncStats,
    now: DateTime<Utc>,
) -> CliResult<Value> {
    let value = match args.kind {
        ReportKind::Security => serde_json::to_value(security_report(users, now))?,
        ReportKind::Departments => {
            let breakdown: Vec<Value> = department_breakdown(users)
                .into_iter()
                .map(|(department, count)| json!({"department": department, "users": count}))
                .collect();
            json!({
                "breakdown": breakdown,
                "reports": department_reports(users),
            })
        }
        ReportKind::Compliance => {
            let period = args
                .period
                .clone()
                .unwrap_or_else(|| default_report_period(now));
            serde_json::to_value(compliance_report(users, &period, DEFAULT_AUDITOR, now))?
        }
        ReportKind::Monitoring => serde_json::to_value(monitoring_metrics(users, stats, now))?,
        ReportKind::Slack => slack_notification(&monitoring_metrics(users, stats, now)),
        ReportKind::BulkImport => serde_json::to_value(bulk_import_payload(users, now))?,
    };
    Ok(value)
}
