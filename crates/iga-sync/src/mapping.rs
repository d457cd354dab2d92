//! Normalization of raw API records into [`IgaUser`] entities.
//!
//! IGA platforms disagree on field names (JumpCloud uses `firstname`,
//! Okta uses `firstName`, SCIM-ish APIs use `given_name`). Each canonical
//! field is resolved first-match-wins over an ordered candidate key list,
//! so vendor differences stay data rather than branching.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{IgaError, IgaResult};
use crate::models::{IgaUser, UserStatus};
use crate::risk::calculate_risk_score;

/// Candidate source keys for the user id.
pub const ID_KEYS: &[&str] = &["_id", "id", "userId"];
/// Candidate source keys for the email address.
pub const EMAIL_KEYS: &[&str] = &["email"];
/// Candidate source keys for the login name.
pub const USERNAME_KEYS: &[&str] = &["username", "login"];
/// Candidate source keys for the given name.
pub const FIRST_NAME_KEYS: &[&str] = &["firstname", "firstName", "given_name"];
/// Candidate source keys for the family name.
pub const LAST_NAME_KEYS: &[&str] = &["lastname", "lastName", "family_name"];
/// Candidate source keys for the display name.
pub const DISPLAY_NAME_KEYS: &[&str] = &["displayname", "displayName"];
/// Candidate source keys for the department.
pub const DEPARTMENT_KEYS: &[&str] = &["department", "organization"];
/// Candidate source keys for the job title.
pub const JOB_TITLE_KEYS: &[&str] = &["jobTitle", "title"];
/// Candidate source keys for the employee identifier.
pub const EMPLOYEE_ID_KEYS: &[&str] = &["employeeIdentifier", "employeeNumber"];
/// Candidate source keys for the phone number.
pub const PHONE_KEYS: &[&str] = &["phoneNumber", "mobilePhone"];
/// Candidate source keys for the manager's user id.
pub const MANAGER_ID_KEYS: &[&str] = &["managerId", "manager"];
/// Candidate source keys for the manager's email address.
pub const MANAGER_EMAIL_KEYS: &[&str] = &["managerEmail"];
/// Candidate source keys for the creation timestamp.
pub const CREATED_KEYS: &[&str] = &["created", "createdAt"];
/// Candidate source keys for the last login timestamp.
pub const LAST_LOGIN_KEYS: &[&str] = &["lastLogin", "lastSignIn"];
/// Candidate source keys for the last update timestamp.
pub const LAST_UPDATED_KEYS: &[&str] = &["updated", "lastUpdated"];
/// Status source keys, checked for presence in order.
pub const STATUS_KEYS: &[&str] = &["activated", "suspended", "status"];

impl IgaUser {
    /// Normalizes a raw API record into an [`IgaUser`].
    ///
    /// The record must be a JSON object; anything else is an
    /// [`IgaError::InvalidRecord`]. `now` anchors the risk calculation,
    /// so normalizing the same record with the same `now` is idempotent.
    pub fn from_raw(record: &Value, now: DateTime<Utc>) -> IgaResult<Self> {
        let map = record.as_object().ok_or_else(|| {
            IgaError::InvalidRecord(format!("expected a JSON object, got: {}", record))
        })?;

        let email = first_match(map, EMAIL_KEYS).unwrap_or_default();
        let username = first_match(map, USERNAME_KEYS).unwrap_or_else(|| email.clone());
        let first_name = first_match(map, FIRST_NAME_KEYS).unwrap_or_default();
        let last_name = first_match(map, LAST_NAME_KEYS).unwrap_or_default();
        let display_name = first_match(map, DISPLAY_NAME_KEYS)
            .unwrap_or_else(|| format!("{} {}", first_name, last_name).trim().to_string());

        let status = resolve_status(map);
        let groups = extract_groups(map);
        let last_login = first_match(map, LAST_LOGIN_KEYS);
        let risk_score = calculate_risk_score(status, last_login.as_deref(), &groups, now);

        Ok(Self {
            id: first_match(map, ID_KEYS).unwrap_or_default(),
            email,
            username,
            first_name,
            last_name,
            display_name,
            status,
            department: first_match(map, DEPARTMENT_KEYS),
            job_title: first_match(map, JOB_TITLE_KEYS),
            manager_id: first_match(map, MANAGER_ID_KEYS),
            manager_email: first_match(map, MANAGER_EMAIL_KEYS),
            phone_number: first_match(map, PHONE_KEYS),
            employee_id: first_match(map, EMPLOYEE_ID_KEYS),
            created_date: first_match(map, CREATED_KEYS),
            last_login,
            last_updated: first_match(map, LAST_UPDATED_KEYS),
            groups,
            attributes: record.clone(),
            risk_score,
        })
    }
}

/// Returns the first candidate key whose value is a usable scalar.
fn first_match(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(scalar_value))
}

/// Converts a JSON scalar into a non-empty string.
///
/// Nulls, empty strings, arrays, and objects do not match, so the lookup
/// falls through to the next candidate key.
fn scalar_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolves the account status from the first present non-null status key.
///
/// Boolean values map by key polarity: `activated: true` and
/// `suspended: false` are ACTIVE, `activated: false` and `suspended: true`
/// are SUSPENDED. String values are uppercased and matched against the
/// known statuses.
fn resolve_status(record: &Map<String, Value>) -> UserStatus {
    for key in STATUS_KEYS {
        let Some(value) = record.get(*key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if let Some(flag) = value.as_bool() {
            let active = if *key == "suspended" { !flag } else { flag };
            return if active {
                UserStatus::Active
            } else {
                UserStatus::Suspended
            };
        }
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return UserStatus::from_raw(&raw);
    }
    UserStatus::Unknown
}

/// Maps the raw `groups` value to a list of group names.
///
/// Anything other than an array yields no groups.
fn extract_groups(record: &Map<String, Value>) -> Vec<String> {
    match record.get("groups") {
        Some(Value::Array(items)) => items.iter().map(group_name).collect(),
        _ => Vec::new(),
    }
}

/// Extracts a display name from a single group element.
fn group_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

/// Parses a vendor-supplied timestamp into UTC.
///
/// Accepts RFC 3339 (trailing `Z` or an explicit offset), naive datetimes
/// assumed UTC, and bare dates taken as midnight UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}
