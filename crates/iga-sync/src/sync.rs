//! User synchronization from an IGA platform.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::client::IgaClient;
use crate::config::IgaConfig;
use crate::error::IgaResult;
use crate::mapping::parse_timestamp;
use crate::models::{ExportDocument, ExportMetadata, IgaUser};
use crate::risk::matching_group_count;
use crate::stats::SyncStats;

/// Endpoint queried for user records.
const USERS_ENDPOINT: &str = "systemusers";

/// Fields requested from the platform for each user record.
const USER_FIELDS: &str = "id,email,username,firstname,lastname,displayname,activated,suspended,\
    department,jobTitle,employeeIdentifier,phoneNumber,created,lastLogin,groups";

/// Default risk threshold for the high-risk query.
pub const DEFAULT_RISK_THRESHOLD: u8 = 70;

/// Default inactivity window in days.
pub const DEFAULT_INACTIVE_DAYS: i64 = 30;

/// Group-name keywords that mark a user as privileged.
///
/// Deliberately a superset of the risk scorer's admin keywords; the two
/// lists are tuned independently.
pub const PRIVILEGED_GROUP_KEYWORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "superuser",
    "privileged",
    "sudo",
];

/// Synchronizes users from an IGA platform.
///
/// Owns the transport client, the retrieved user collection, and the
/// statistics for the current run.
#[derive(Debug)]
pub struct UserSyncService {
    client: IgaClient,
    users: Vec<IgaUser>,
    stats: SyncStats,
}

impl UserSyncService {
    /// Creates a service from a configuration.
    pub fn new(config: IgaConfig) -> IgaResult<Self> {
        Ok(Self {
            client: IgaClient::new(config)?,
            users: Vec::new(),
            stats: SyncStats::new(),
        })
    }

    /// Creates a service from `IGA_*` environment variables.
    pub fn from_env() -> IgaResult<Self> {
        Self::new(IgaConfig::from_env()?)
    }

    /// The users retrieved by the last run.
    #[must_use]
    pub fn users(&self) -> &[IgaUser] {
        &self.users
    }

    /// Statistics for the last run.
    #[must_use]
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &IgaConfig {
        self.client.config()
    }

    /// Retrieves all users using cursor pagination.
    ///
    /// Statistics are reset at the start of the run and finalized on every
    /// exit path, including transport failures that abort pagination.
    #[instrument(skip(self))]
    pub async fn retrieve_all_users(&mut self) -> IgaResult<&[IgaUser]> {
        self.users.clear();
        self.stats.reset();
        self.stats.mark_started();
        info!("Starting user retrieval from IGA platform");

        let result = self.fetch_pages().await;
        if let Err(e) = &result {
            error!("User retrieval failed: {}", e);
        }

        self.stats.mark_finished();
        self.stats.set_total_users(self.users.len() as u64);
        self.stats.log_summary();

        result?;
        Ok(&self.users)
    }

    async fn fetch_pages(&mut self) -> IgaResult<()> {
        let mut cursor: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            page_count += 1;
            debug!("Fetching page {}", page_count);

            let mut params = vec![
                ("limit", self.client.config().page_size.to_string()),
                ("fields", USER_FIELDS.to_string()),
            ];
            if let Some(token) = &cursor {
                params.push(("cursor", token.clone()));
            }

            let body = self
                .client
                .get_json(USERS_ENDPOINT, &params, &mut self.stats)
                .await?;
            let (records, next_cursor) = extract_page(&body);

            let now = Utc::now();
            let mut page_users = 0usize;
            for record in &records {
                match IgaUser::from_raw(record, now) {
                    Ok(user) => {
                        self.stats.record_user(user.status);
                        self.users.push(user);
                        page_users += 1;
                    }
                    Err(e) => {
                        warn!("Skipping user record: {}", e);
                        self.stats.increment_errors();
                    }
                }
            }
            info!("Processed {} users from page {}", page_users, page_count);

            if next_cursor.is_none() || records.is_empty() {
                break;
            }
            cursor = next_cursor;
        }

        Ok(())
    }

    /// Users with risk score at or above `threshold`.
    #[must_use]
    pub fn high_risk_users(&self, threshold: u8) -> Vec<&IgaUser> {
        high_risk_users(&self.users, threshold)
    }

    /// Users who have not logged in within `days` days.
    #[must_use]
    pub fn inactive_users(&self, days: i64) -> Vec<&IgaUser> {
        inactive_users(&self.users, days, Utc::now())
    }

    /// Users belonging to at least one privileged group.
    #[must_use]
    pub fn privileged_users(&self) -> Vec<&IgaUser> {
        privileged_users(&self.users)
    }

    /// Exports the retrieved users as a JSON document.
    ///
    /// When `filename` is `None` a timestamped name is generated. Returns
    /// the path written.
    pub fn export_to_file(&self, filename: Option<&str>) -> IgaResult<String> {
        let filename = match filename {
            Some(name) => name.to_string(),
            None => format!(
                "iga_users_export_{}.json",
                Utc::now().format("%Y%m%d_%H%M%S")
            ),
        };

        let document = ExportDocument {
            metadata: ExportMetadata {
                export_timestamp: Utc::now(),
                total_users: self.users.len(),
                sync_stats: self.stats.clone(),
                source_api: self.client.config().api_url.clone(),
            },
            users: &self.users,
        };

        std::fs::write(&filename, serde_json::to_string_pretty(&document)?)?;
        info!("Users exported to {}", filename);
        Ok(filename)
    }
}

/// Splits a page body into its records and pagination cursor.
///
/// Three shapes are recognized: `{results, next_cursor}`,
/// `{data, next_cursor | nextCursor}`, and a bare array, which cannot
/// paginate further. Anything else is an empty page.
#[must_use]
pub fn extract_page(body: &Value) -> (Vec<Value>, Option<String>) {
    if let Some(results) = body.get("results").and_then(Value::as_array) {
        return (results.clone(), cursor_value(body.get("next_cursor")));
    }
    if let Some(data) = body.get("data").and_then(Value::as_array) {
        let cursor = cursor_value(body.get("next_cursor"))
            .or_else(|| cursor_value(body.get("nextCursor")));
        return (data.clone(), cursor);
    }
    match body.as_array() {
        Some(items) => (items.clone(), None),
        None => (Vec::new(), None),
    }
}

/// Reads a cursor token, treating empty strings as absent.
fn cursor_value(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Returns users whose risk score is at or above `threshold`.
#[must_use]
pub fn high_risk_users(users: &[IgaUser], threshold: u8) -> Vec<&IgaUser> {
    users
        .iter()
        .filter(|user| user.risk_score >= threshold)
        .collect()
}

/// Returns users who have not logged in within `days` days of `now`.
///
/// Users with no login date or an unparseable one are always included.
#[must_use]
pub fn inactive_users(users: &[IgaUser], days: i64, now: DateTime<Utc>) -> Vec<&IgaUser> {
    let cutoff = now - Duration::days(days);
    users
        .iter()
        .filter(|user| match user.last_login.as_deref() {
            None | Some("") => true,
            Some(raw) => match parse_timestamp(raw) {
                Some(login) => login < cutoff,
                None => true,
            },
        })
        .collect()
}

/// Returns users belonging to at least one privileged group.
#[must_use]
pub fn privileged_users(users: &[IgaUser]) -> Vec<&IgaUser> {
    privileged_users_with_keywords(users, PRIVILEGED_GROUP_KEYWORDS)
}

/// Same as [`privileged_users`], matching groups against a caller-supplied
/// keyword list.
#[must_use]
pub fn privileged_users_with_keywords<'a>(
    users: &'a [IgaUser],
    keywords: &[&str],
) -> Vec<&'a IgaUser> {
    users
        .iter()
        .filter(|user| matching_group_count(&user.groups, keywords) > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserStatus;
    use chrono::TimeZone;
    use serde_json::json;

    fn test_user(id: &str, risk: u8, last_login: Option<&str>, groups: &[&str]) -> IgaUser {
        IgaUser {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            username: id.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            display_name: String::new(),
            status: UserStatus::Active,
            department: None,
            job_title: None,
            manager_id: None,
            manager_email: None,
            phone_number: None,
            employee_id: None,
            created_date: None,
            last_login: last_login.map(str::to_string),
            last_updated: None,
            groups: groups.iter().map(|g| (*g).to_string()).collect(),
            attributes: Value::Null,
            risk_score: risk,
        }
    }

    #[test]
    fn test_extract_page_results_shape() {
        let body = json!({
            "results": [{"id": "1"}, {"id": "2"}],
            "next_cursor": "abc"
        });

        let (records, cursor) = extract_page(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_page_data_shape_with_camel_case_cursor() {
        let body = json!({
            "data": [{"id": "1"}],
            "nextCursor": "tok-2"
        });

        let (records, cursor) = extract_page(&body);
        assert_eq!(records.len(), 1);
        assert_eq!(cursor.as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_extract_page_bare_array_has_no_cursor() {
        let body = json!([{"id": "1"}, {"id": "2"}, {"id": "3"}]);

        let (records, cursor) = extract_page(&body);
        assert_eq!(records.len(), 3);
        assert!(cursor.is_none());
    }

    #[test]
    fn test_extract_page_empty_cursor_means_done() {
        let body = json!({"results": [{"id": "1"}], "next_cursor": ""});

        let (_, cursor) = extract_page(&body);
        assert!(cursor.is_none());
    }

    #[test]
    fn test_extract_page_unrecognized_shape_is_empty() {
        let body = json!({"totalCount": 0});

        let (records, cursor) = extract_page(&body);
        assert!(records.is_empty());
        assert!(cursor.is_none());
    }

    #[test]
    fn test_high_risk_threshold_is_inclusive() {
        let users = vec![
            test_user("low", 69, None, &[]),
            test_user("edge", 70, None, &[]),
            test_user("high", 85, None, &[]),
        ];

        let risky = high_risk_users(&users, DEFAULT_RISK_THRESHOLD);
        let ids: Vec<&str> = risky.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["edge", "high"]);
    }

    #[test]
    fn test_inactive_users_returns_only_stale_or_missing_logins() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let users = vec![
            test_user("recent", 0, Some("2025-05-22T12:00:00Z"), &[]),
            test_user("never", 0, None, &[]),
        ];

        let inactive = inactive_users(&users, DEFAULT_INACTIVE_DAYS, now);
        let ids: Vec<&str> = inactive.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["never"]);
    }

    #[test]
    fn test_inactive_users_includes_unparseable_dates() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let users = vec![test_user("odd", 0, Some("not-a-date"), &[])];

        let inactive = inactive_users(&users, 30, now);
        assert_eq!(inactive.len(), 1);
    }

    #[test]
    fn test_inactive_cutoff_is_strict() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        // Exactly 30 days ago, not older than the cutoff
        let users = vec![test_user("edge", 0, Some("2025-05-02T12:00:00Z"), &[])];

        let inactive = inactive_users(&users, 30, now);
        assert!(inactive.is_empty());
    }

    #[test]
    fn test_privileged_users_matches_sudo_keyword() {
        let users = vec![
            test_user("ops", 0, None, &["sudo-users"]),
            test_user("dev", 0, None, &["Engineering"]),
        ];

        let privileged = privileged_users(&users);
        let ids: Vec<&str> = privileged.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["ops"]);
    }

    #[test]
    fn test_privileged_user_listed_once_despite_multiple_groups() {
        let users = vec![test_user("root", 0, None, &["admins", "root-access"])];

        let privileged = privileged_users(&users);
        assert_eq!(privileged.len(), 1);
    }

    #[test]
    fn test_privileged_keywords_are_overridable() {
        let users = vec![
            test_user("ops", 0, None, &["oncall-rotation"]),
            test_user("adm", 0, None, &["admins"]),
        ];

        let privileged = privileged_users_with_keywords(&users, &["oncall"]);
        let ids: Vec<&str> = privileged.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["ops"]);
    }
}
