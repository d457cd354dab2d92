//! SparrowVision IGA user sync
//!
//! This crate retrieves the full user population from an IGA platform's REST
//! API, normalizes vendor-specific records into a common user model, scores
//! each account for access risk, and generates the security, compliance, and
//! monitoring documents downstream systems consume.
//!
//! # Features
//!
//! - Cursor-paginated retrieval across JumpCloud, Okta, and Google-style
//!   response envelopes
//! - Rate-limit aware HTTP client with `Retry-After` handling and bounded
//!   retries for transient failures
//! - Heuristic risk scoring from account status, login recency, and
//!   privileged group membership
//! - Security posture, per-department, and ISO 27001 access review reports
//! - Timestamped JSON export with run statistics for audit trails
//!
//! # Example
//!
//! ```no_run
//! use iga_sync::{IgaConfig, UserSyncService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IgaConfig::new("https://console.example.com/api", "secret-key");
//! let mut service = UserSyncService::new(config)?;
//!
//! let users = service.retrieve_all_users().await?;
//! println!("Retrieved {} users", users.len());
//!
//! service.export_to_file(Some("iga_users.json"))?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod mapping;
mod models;
mod report;
mod risk;
mod stats;
mod sync;

// Re-exports
pub use client::IgaClient;
pub use config::{
    IgaConfig, ENV_API_KEY, ENV_API_URL, ENV_MAX_RETRIES, ENV_ORG_ID, ENV_PAGE_SIZE,
    ENV_RATE_LIMIT_DELAY, ENV_RATE_LIMIT_MAX_RETRIES, ENV_RETRY_DELAY, ENV_TIMEOUT,
};
pub use error::{IgaError, IgaResult};
pub use mapping::{
    parse_timestamp, EMAIL_KEYS, FIRST_NAME_KEYS, ID_KEYS, LAST_LOGIN_KEYS, LAST_NAME_KEYS,
    STATUS_KEYS, USERNAME_KEYS,
};
pub use models::{ExportDocument, ExportMetadata, IgaUser, UserExport, UserStatus};
pub use report::{
    bulk_import_payload, compliance_report, default_report_period, department_breakdown,
    department_reports, monitoring_metrics, security_report, slack_notification, ActionItem,
    AlertSeverity, BulkImportPayload, BulkImportUser, ComplianceFindings, ComplianceReport,
    DepartmentReport, MonitoringMetrics, Priority, Recommendation, RiskDistribution,
    SecurityReport, SyncAlert, ACTION_ITEM_RISK_THRESHOLD, DEFAULT_AUDITOR,
    HIGH_RISK_ALERT_THRESHOLD, MAX_ACTION_ITEMS, MEDIUM_RISK_THRESHOLD,
    MIN_DEPARTMENT_REPORT_USERS, SLOW_SYNC_THRESHOLD_SECS,
};
pub use risk::{
    calculate_risk_score, calculate_risk_score_with_keywords, matching_group_count,
    ADMIN_GROUP_KEYWORDS,
};
pub use stats::SyncStats;
pub use sync::{
    extract_page, high_risk_users, inactive_users, privileged_users,
    privileged_users_with_keywords, UserSyncService, DEFAULT_INACTIVE_DAYS,
    DEFAULT_RISK_THRESHOLD, PRIVILEGED_GROUP_KEYWORDS,
};
