//! Sync command - Retrieve users from the IGA platform and export them

use chrono::Utc;
use clap::Args;

use iga_sync::{
    high_risk_users, inactive_users, privileged_users, IgaUser, UserSyncService,
    DEFAULT_INACTIVE_DAYS, DEFAULT_RISK_THRESHOLD,
};

use crate::error::CliResult;
use crate::output::{print_header, print_key_value, print_success, print_warning};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Write the export to this file instead of a timestamped name
    #[arg(long)]
    pub output: Option<String>,

    /// Skip writing the JSON export
    #[arg(long)]
    pub skip_export: bool,

    /// Risk score threshold for the high-risk summary
    #[arg(long, default_value_t = DEFAULT_RISK_THRESHOLD)]
    pub risk_threshold: u8,
}

/// Execute the sync command
pub async fn execute(args: SyncArgs) -> CliResult<()> {
    let mut service = UserSyncService::from_env()?;

    print_header("SparrowVision IGA User Sync");
    service.retrieve_all_users().await?;

    let stats = service.stats();
    print_key_value("Users retrieved", &stats.total_users.to_string());
    print_key_value("Active", &stats.active_users.to_string());
    print_key_value("Suspended", &stats.suspended_users.to_string());
    print_key_value("API calls", &stats.api_calls.to_string());
    print_key_value("Duration", &format!("{:.2}s", stats.duration_secs()));

    if stats.errors > 0 {
        print_warning(&format!("{} records skipped during retrieval", stats.errors));
    }

    print_insights(service.users(), args.risk_threshold);

    if !args.skip_export {
        let path = service.export_to_file(args.output.as_deref())?;
        print_success(&format!("Export written to {}", path));
    }

    Ok(())
}

/// Print the security insights shown after every run.
fn print_insights(users: &[IgaUser], risk_threshold: u8) {
    let mut risky = high_risk_users(users, risk_threshold);
    risky.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));

    println!();
    println!("High-risk users (score >= {}): {}", risk_threshold, risky.len());
    for user in risky.iter().take(5) {
        println!("  {} (risk {})", user.email, user.risk_score);
    }

    let inactive = inactive_users(users, DEFAULT_INACTIVE_DAYS, Utc::now());
    println!(
        "Inactive {}+ days: {}",
        DEFAULT_INACTIVE_DAYS,
        inactive.len()
    );

    let privileged = privileged_users(users);
    println!("Privileged users: {}", privileged.len());
    println!();
}
