//! Report generators for downstream security and compliance consumers.
//!
//! All generators are pure functions over a user slice and, where relevant,
//! the run statistics. They produce serializable documents; writing or
//! shipping them is the caller's concern.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{IgaUser, UserStatus};
use crate::risk::matching_group_count;
use crate::stats::SyncStats;
use crate::sync::{
    high_risk_users, inactive_users, privileged_users, DEFAULT_RISK_THRESHOLD,
    PRIVILEGED_GROUP_KEYWORDS,
};

/// Lower bound of the medium risk band.
pub const MEDIUM_RISK_THRESHOLD: u8 = 40;

/// Auditor recorded in compliance reports unless the caller overrides it.
pub const DEFAULT_AUDITOR: &str = "SparrowVision_IGA_Sync";

/// Risk score at which a user becomes a compliance action item.
pub const ACTION_ITEM_RISK_THRESHOLD: u8 = 80;

/// Maximum action items per compliance report.
pub const MAX_ACTION_ITEMS: usize = 10;

/// Minimum department size for a dedicated department report.
pub const MIN_DEPARTMENT_REPORT_USERS: usize = 10;

/// High-risk user count above which a monitoring alert fires.
pub const HIGH_RISK_ALERT_THRESHOLD: usize = 10;

/// Sync duration in seconds above which a slow-sync alert fires.
pub const SLOW_SYNC_THRESHOLD_SECS: f64 = 300.0;

/// Recommendation or action priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Severity of a monitoring alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
}

/// Counts of users per risk band.
#[derive(Debug, Clone, Serialize)]
pub struct RiskDistribution {
    /// Users at or above the high-risk threshold.
    pub high_risk: usize,
    /// Users in the medium band.
    pub medium_risk: usize,
    /// Users below the medium band.
    pub low_risk: usize,
}

/// Security posture summary across the user population.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityReport {
    pub timestamp: DateTime<Utc>,
    pub total_users: usize,
    pub high_risk_users: usize,
    pub inactive_30_days: usize,
    pub inactive_90_days: usize,
    pub privileged_users: usize,
    pub risk_distribution: RiskDistribution,
}

/// Per-department summary, produced for departments above the size cutoff.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentReport {
    pub department: String,
    pub total_users: usize,
    pub active_users: usize,
    pub average_risk_score: f64,
    pub high_risk_users: usize,
    pub privileged_users: usize,
}

/// Counts backing a compliance report.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceFindings {
    pub high_risk_users: usize,
    pub inactive_users_30_days: usize,
    pub inactive_users_90_days: usize,
    pub privileged_users: usize,
    pub users_without_recent_login: usize,
}

/// A remediation recommendation tied to a compliance control.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub recommendation: String,
    pub compliance_framework: String,
}

/// A single user flagged for review.
#[derive(Debug, Clone, Serialize)]
pub struct ActionItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub priority: Priority,
    pub user_id: String,
    pub user_email: String,
    pub risk_score: u8,
    pub action: String,
    pub due_date: String,
}

/// ISO 27001 access review report.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub report_type: String,
    pub generated_at: DateTime<Utc>,
    pub report_period: String,
    pub auditor: String,
    pub total_users_reviewed: usize,
    pub findings: ComplianceFindings,
    pub recommendations: Vec<Recommendation>,
    pub action_items: Vec<ActionItem>,
}

/// An alert raised from sync metrics.
#[derive(Debug, Clone, Serialize)]
pub struct SyncAlert {
    pub severity: AlertSeverity,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    pub action_required: bool,
}

/// Metrics document for an external monitoring system.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringMetrics {
    pub timestamp: DateTime<Utc>,
    pub sync_success: bool,
    pub total_users: usize,
    pub api_calls: u64,
    pub sync_duration: f64,
    pub error_count: u64,
    pub high_risk_users: usize,
    pub alerts: Vec<SyncAlert>,
}

/// A user entry in the bulk-import payload.
#[derive(Debug, Clone, Serialize)]
pub struct BulkImportUser {
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub status: UserStatus,
    pub risk_score: u8,
    pub last_login: Option<String>,
    pub groups: Vec<String>,
}

impl From<&IgaUser> for BulkImportUser {
    fn from(user: &IgaUser) -> Self {
        Self {
            external_id: user.id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            department: user.department.clone(),
            job_title: user.job_title.clone(),
            status: user.status,
            risk_score: user.risk_score,
            last_login: user.last_login.clone(),
            groups: user.groups.clone(),
        }
    }
}

/// Payload for the downstream bulk-import endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BulkImportPayload {
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub users: Vec<BulkImportUser>,
}

/// Builds a security posture summary.
#[must_use]
pub fn security_report(users: &[IgaUser], now: DateTime<Utc>) -> SecurityReport {
    SecurityReport {
        timestamp: now,
        total_users: users.len(),
        high_risk_users: high_risk_users(users, DEFAULT_RISK_THRESHOLD).len(),
        inactive_30_days: inactive_users(users, 30, now).len(),
        inactive_90_days: inactive_users(users, 90, now).len(),
        privileged_users: privileged_users(users).len(),
        risk_distribution: RiskDistribution {
            high_risk: users
                .iter()
                .filter(|u| u.risk_score >= DEFAULT_RISK_THRESHOLD)
                .count(),
            medium_risk: users
                .iter()
                .filter(|u| (MEDIUM_RISK_THRESHOLD..DEFAULT_RISK_THRESHOLD).contains(&u.risk_score))
                .count(),
            low_risk: users
                .iter()
                .filter(|u| u.risk_score < MEDIUM_RISK_THRESHOLD)
                .count(),
        },
    }
}

/// Counts users per department, grouping missing departments under
/// "Unknown". Ordered by size, largest first.
#[must_use]
pub fn department_breakdown(users: &[IgaUser]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for user in users {
        *counts.entry(department_name(user)).or_insert(0) += 1;
    }

    let mut breakdown: Vec<(String, usize)> = counts.into_iter().collect();
    breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    breakdown
}

/// Builds reports for every department with at least
/// [`MIN_DEPARTMENT_REPORT_USERS`] members, ordered by department name.
#[must_use]
pub fn department_reports(users: &[IgaUser]) -> Vec<DepartmentReport> {
    let mut by_department: BTreeMap<String, Vec<&IgaUser>> = BTreeMap::new();
    for user in users {
        by_department.entry(department_name(user)).or_default().push(user);
    }

    by_department
        .into_iter()
        .filter(|(_, members)| members.len() >= MIN_DEPARTMENT_REPORT_USERS)
        .map(|(department, members)| {
            let total_risk: u32 = members.iter().map(|u| u32::from(u.risk_score)).sum();
            DepartmentReport {
                department,
                total_users: members.len(),
                active_users: members
                    .iter()
                    .filter(|u| u.status == UserStatus::Active)
                    .count(),
                average_risk_score: f64::from(total_risk) / members.len() as f64,
                high_risk_users: members
                    .iter()
                    .filter(|u| u.risk_score >= DEFAULT_RISK_THRESHOLD)
                    .count(),
                privileged_users: members
                    .iter()
                    .filter(|u| matching_group_count(&u.groups, PRIVILEGED_GROUP_KEYWORDS) > 0)
                    .count(),
            }
        })
        .collect()
}

fn department_name(user: &IgaUser) -> String {
    user.department
        .clone()
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Builds an ISO 27001 access review report.
///
/// Action items cover the highest-risk users at or above
/// [`ACTION_ITEM_RISK_THRESHOLD`], capped at [`MAX_ACTION_ITEMS`].
#[must_use]
pub fn compliance_report(
    users: &[IgaUser],
    report_period: &str,
    auditor: &str,
    now: DateTime<Utc>,
) -> ComplianceReport {
    let findings = ComplianceFindings {
        high_risk_users: high_risk_users(users, DEFAULT_RISK_THRESHOLD).len(),
        inactive_users_30_days: inactive_users(users, 30, now).len(),
        inactive_users_90_days: inactive_users(users, 90, now).len(),
        privileged_users: privileged_users(users).len(),
        users_without_recent_login: users
            .iter()
            .filter(|u| u.last_login.as_deref().unwrap_or("").is_empty())
            .count(),
    };

    let mut recommendations = Vec::new();
    if findings.high_risk_users > 0 {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "Risk Management".to_string(),
            recommendation: format!(
                "Review and remediate {} high-risk user accounts",
                findings.high_risk_users
            ),
            compliance_framework: "ISO 27001 A.9.2.1".to_string(),
        });
    }
    if findings.inactive_users_90_days > 0 {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "Access Management".to_string(),
            recommendation: format!(
                "Disable or remove {} accounts inactive for 90+ days",
                findings.inactive_users_90_days
            ),
            compliance_framework: "ISO 27001 A.9.2.6".to_string(),
        });
    }
    if findings.privileged_users as f64 > users.len() as f64 * 0.1 {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "Privilege Management".to_string(),
            recommendation: format!(
                "Review privileged access - {} users have administrative privileges",
                findings.privileged_users
            ),
            compliance_framework: "ISO 27001 A.9.2.3".to_string(),
        });
    }

    let mut review_targets = high_risk_users(users, ACTION_ITEM_RISK_THRESHOLD);
    review_targets.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    let action_items = review_targets
        .into_iter()
        .take(MAX_ACTION_ITEMS)
        .map(|user| ActionItem {
            item_type: "USER_REVIEW".to_string(),
            priority: Priority::High,
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            risk_score: user.risk_score,
            action: "Immediate access review required".to_string(),
            due_date: now.format("%Y-%m-%d").to_string(),
        })
        .collect();

    ComplianceReport {
        report_type: "ISO_27001_ACCESS_REVIEW".to_string(),
        generated_at: now,
        report_period: report_period.to_string(),
        auditor: auditor.to_string(),
        total_users_reviewed: users.len(),
        findings,
        recommendations,
        action_items,
    }
}

/// Formats the quarter containing `now`, e.g. `Q3_2026`.
#[must_use]
pub fn default_report_period(now: DateTime<Utc>) -> String {
    format!("Q{}_{}", (now.month() - 1) / 3 + 1, now.year())
}

/// Builds a metrics document with threshold-driven alerts.
#[must_use]
pub fn monitoring_metrics(
    users: &[IgaUser],
    stats: &SyncStats,
    now: DateTime<Utc>,
) -> MonitoringMetrics {
    let high_risk = high_risk_users(users, DEFAULT_RISK_THRESHOLD).len();
    let duration = stats.duration_secs();

    let mut alerts = Vec::new();
    if high_risk > HIGH_RISK_ALERT_THRESHOLD {
        alerts.push(SyncAlert {
            severity: AlertSeverity::Warning,
            alert_type: "HIGH_RISK_USERS".to_string(),
            message: format!("{} users with high risk scores detected", high_risk),
            action_required: true,
        });
    }
    if duration > SLOW_SYNC_THRESHOLD_SECS {
        alerts.push(SyncAlert {
            severity: AlertSeverity::Info,
            alert_type: "SLOW_SYNC".to_string(),
            message: format!("Sync took {:.1} seconds", duration),
            action_required: false,
        });
    }
    if stats.errors > 0 {
        alerts.push(SyncAlert {
            severity: AlertSeverity::Error,
            alert_type: "SYNC_ERRORS".to_string(),
            message: format!("{} errors occurred during sync", stats.errors),
            action_required: true,
        });
    }

    MonitoringMetrics {
        timestamp: now,
        sync_success: stats.end_time.is_some(),
        total_users: users.len(),
        api_calls: stats.api_calls,
        sync_duration: duration,
        error_count: stats.errors,
        high_risk_users: high_risk,
        alerts,
    }
}

/// Builds a Slack webhook payload summarizing a sync run.
#[must_use]
pub fn slack_notification(metrics: &MonitoringMetrics) -> Value {
    json!({
        "text": "SparrowVision IGA Sync Complete",
        "blocks": [{
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*SparrowVision IGA Sync Results*\n• Users: {}\n• Duration: {:.1}s\n• Alerts: {}",
                    metrics.total_users, metrics.sync_duration, metrics.alerts.len()
                ),
            }
        }]
    })
}

/// Builds the bulk-import payload for the downstream platform.
#[must_use]
pub fn bulk_import_payload(users: &[IgaUser], now: DateTime<Utc>) -> BulkImportPayload {
    BulkImportPayload {
        source: "IGA_SYNC".to_string(),
        timestamp: now,
        users: users.iter().map(BulkImportUser::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn test_user(id: &str, risk: u8, department: Option<&str>, groups: &[&str]) -> IgaUser {
        IgaUser {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            username: id.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            display_name: String::new(),
            status: UserStatus::Active,
            department: department.map(str::to_string),
            job_title: None,
            manager_id: None,
            manager_email: None,
            phone_number: None,
            employee_id: None,
            created_date: None,
            last_login: Some("2025-05-30T09:00:00Z".to_string()),
            last_updated: None,
            groups: groups.iter().map(|g| (*g).to_string()).collect(),
            attributes: Value::Null,
            risk_score: risk,
        }
    }

    #[test]
    fn test_security_report_risk_distribution() {
        let users = vec![
            test_user("a", 10, None, &[]),
            test_user("b", 40, None, &[]),
            test_user("c", 69, None, &[]),
            test_user("d", 70, None, &[]),
            test_user("e", 100, None, &[]),
        ];

        let report = security_report(&users, now());
        assert_eq!(report.total_users, 5);
        assert_eq!(report.risk_distribution.high_risk, 2);
        assert_eq!(report.risk_distribution.medium_risk, 2);
        assert_eq!(report.risk_distribution.low_risk, 1);
        assert_eq!(report.high_risk_users, 2);
    }

    #[test]
    fn test_department_breakdown_orders_by_size() {
        let users = vec![
            test_user("a", 0, Some("Engineering"), &[]),
            test_user("b", 0, Some("Engineering"), &[]),
            test_user("c", 0, None, &[]),
            test_user("d", 0, Some("Sales"), &[]),
        ];

        let breakdown = department_breakdown(&users);
        assert_eq!(
            breakdown,
            vec![
                ("Engineering".to_string(), 2),
                ("Sales".to_string(), 1),
                ("Unknown".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_department_reports_require_minimum_size() {
        let mut users = Vec::new();
        for i in 0..MIN_DEPARTMENT_REPORT_USERS {
            users.push(test_user(&format!("eng{}", i), 50, Some("Engineering"), &[]));
        }
        users.push(test_user("solo", 90, Some("Sales"), &["admins"]));

        let reports = department_reports(&users);
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.department, "Engineering");
        assert_eq!(report.total_users, MIN_DEPARTMENT_REPORT_USERS);
        assert_eq!(report.active_users, MIN_DEPARTMENT_REPORT_USERS);
        assert_eq!(report.average_risk_score, 50.0);
        assert_eq!(report.high_risk_users, 0);
    }

    #[test]
    fn test_compliance_report_without_findings_has_no_recommendations() {
        let users = vec![test_user("clean", 0, None, &[])];

        let report = compliance_report(&users, "Q2_2025", DEFAULT_AUDITOR, now());
        assert_eq!(report.report_type, "ISO_27001_ACCESS_REVIEW");
        assert_eq!(report.report_period, "Q2_2025");
        assert_eq!(report.auditor, "SparrowVision_IGA_Sync");
        assert!(report.recommendations.is_empty());
        assert!(report.action_items.is_empty());
    }

    #[test]
    fn test_default_report_period_formats_quarter() {
        assert_eq!(default_report_period(now()), "Q2_2025");

        let december = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(default_report_period(december), "Q4_2024");
    }

    #[test]
    fn test_compliance_recommendations_cover_all_controls() {
        let mut users = vec![
            // High risk, stale login, admin group
            IgaUser {
                last_login: Some("2024-01-01T00:00:00Z".to_string()),
                ..test_user("risky", 85, None, &["org-admins"])
            },
        ];
        // Small population so one privileged user exceeds the 10% ratio
        users.push(test_user("plain", 0, None, &[]));

        let report = compliance_report(&users, "Q2_2025", DEFAULT_AUDITOR, now());
        let frameworks: Vec<&str> = report
            .recommendations
            .iter()
            .map(|r| r.compliance_framework.as_str())
            .collect();
        assert!(frameworks.contains(&"ISO 27001 A.9.2.1"));
        assert!(frameworks.contains(&"ISO 27001 A.9.2.6"));
        assert!(frameworks.contains(&"ISO 27001 A.9.2.3"));
    }

    #[test]
    fn test_compliance_action_items_take_highest_risk_first() {
        let mut users = Vec::new();
        for i in 0..12 {
            users.push(test_user(&format!("u{}", i), 80 + (i as u8), None, &[]));
        }

        let report = compliance_report(&users, "Q2_2025", DEFAULT_AUDITOR, now());
        assert_eq!(report.action_items.len(), MAX_ACTION_ITEMS);
        assert_eq!(report.action_items[0].risk_score, 91);
        assert_eq!(report.action_items[0].item_type, "USER_REVIEW");
        assert_eq!(report.action_items[0].due_date, "2025-06-01");
    }

    #[test]
    fn test_monitoring_metrics_without_problems_has_no_alerts() {
        let users = vec![test_user("a", 0, None, &[])];
        let stats = SyncStats::new();

        let metrics = monitoring_metrics(&users, &stats, now());
        assert!(metrics.alerts.is_empty());
        assert_eq!(metrics.total_users, 1);
        assert!(!metrics.sync_success);
    }

    #[test]
    fn test_monitoring_alerts_on_errors_and_high_risk() {
        let mut users = Vec::new();
        for i in 0..11 {
            users.push(test_user(&format!("r{}", i), 95, None, &[]));
        }
        let mut stats = SyncStats::new();
        stats.increment_errors();

        let metrics = monitoring_metrics(&users, &stats, now());
        let types: Vec<&str> = metrics
            .alerts
            .iter()
            .map(|a| a.alert_type.as_str())
            .collect();
        assert_eq!(types, vec!["HIGH_RISK_USERS", "SYNC_ERRORS"]);
        assert!(metrics.alerts[0].action_required);
    }

    #[test]
    fn test_alert_serialization_uses_renamed_type_key() {
        let alert = SyncAlert {
            severity: AlertSeverity::Warning,
            alert_type: "HIGH_RISK_USERS".to_string(),
            message: "11 users with high risk scores detected".to_string(),
            action_required: true,
        };

        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["severity"], "WARNING");
        assert_eq!(value["type"], "HIGH_RISK_USERS");
    }

    #[test]
    fn test_slack_notification_shape() {
        let users = vec![test_user("a", 0, None, &[])];
        let metrics = monitoring_metrics(&users, &SyncStats::new(), now());

        let payload = slack_notification(&metrics);
        assert_eq!(payload["text"], "SparrowVision IGA Sync Complete");
        assert_eq!(payload["blocks"][0]["type"], "section");
        assert_eq!(payload["blocks"][0]["text"]["type"], "mrkdwn");
    }

    #[test]
    fn test_bulk_import_payload_maps_users() {
        let users = vec![test_user("u1", 42, Some("Engineering"), &["devs"])];

        let payload = bulk_import_payload(&users, now());
        assert_eq!(payload.source, "IGA_SYNC");
        assert_eq!(payload.users.len(), 1);

        let entry = &payload.users[0];
        assert_eq!(entry.external_id, "u1");
        assert_eq!(entry.email, "u1@example.com");
        assert_eq!(entry.risk_score, 42);
        assert_eq!(entry.groups, vec!["devs"]);
    }
}
