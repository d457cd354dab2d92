//! Core data types for IGA user synchronization.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stats::SyncStats;

/// Account status normalized from vendor-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    /// Account is enabled and in use.
    Active,
    /// Account is disabled but retained.
    Suspended,
    /// Account has been created by provisioning but not yet activated.
    Provisioned,
    /// Account is staged for a future start date.
    Staged,
    /// Account has been removed from the platform.
    Deprovisioned,
    /// Account belongs to a user who has left the organization.
    Exit,
    /// Status could not be determined from the source record.
    #[default]
    Unknown,
}

impl UserStatus {
    /// Normalizes a raw status string, falling back to [`UserStatus::Unknown`]
    /// for anything unrecognized.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "ACTIVE" => UserStatus::Active,
            "SUSPENDED" => UserStatus::Suspended,
            "PROVISIONED" => UserStatus::Provisioned,
            "STAGED" => UserStatus::Staged,
            "DEPROVISIONED" => UserStatus::Deprovisioned,
            "EXIT" => UserStatus::Exit,
            _ => UserStatus::Unknown,
        }
    }

    /// Get the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Suspended => "SUSPENDED",
            UserStatus::Provisioned => "PROVISIONED",
            UserStatus::Staged => "STAGED",
            UserStatus::Deprovisioned => "DEPROVISIONED",
            UserStatus::Exit => "EXIT",
            UserStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user record normalized from an IGA platform.
///
/// Immutable once constructed for a given sync run. The raw source
/// record is retained in `attributes` for traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgaUser {
    /// Vendor-assigned user id.
    pub id: String,
    /// Primary email address.
    pub email: String,
    /// Login name, falling back to the email address.
    pub username: String,
    /// Given (first) name.
    pub first_name: String,
    /// Family (last) name.
    pub last_name: String,
    /// Display name, derived from first and last name when not supplied.
    pub display_name: String,
    /// Normalized account status.
    pub status: UserStatus,
    /// Department or organization.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title.
    #[serde(default)]
    pub job_title: Option<String>,
    /// Manager's user id.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// Manager's email address.
    #[serde(default)]
    pub manager_email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Employee identifier from the HR system.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Account creation timestamp, as supplied by the platform.
    #[serde(default)]
    pub created_date: Option<String>,
    /// Last login timestamp, as supplied by the platform.
    #[serde(default)]
    pub last_login: Option<String>,
    /// Last update timestamp, as supplied by the platform.
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Group names the user belongs to.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Full raw source record.
    #[serde(default)]
    pub attributes: Value,
    /// Risk score in [0, 100], computed once at parse time.
    #[serde(default)]
    pub risk_score: u8,
}

/// Metadata block included in a user export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// When the export was written.
    pub export_timestamp: DateTime<Utc>,
    /// Number of users in the export.
    pub total_users: usize,
    /// Statistics from the sync run that produced the users.
    pub sync_stats: SyncStats,
    /// Base URL of the API the users came from.
    pub source_api: String,
}

/// Export document written by a sync run, borrowing the user collection.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    /// Export metadata.
    pub metadata: ExportMetadata,
    /// The synchronized users.
    pub users: &'a [IgaUser],
}

/// A previously written export document, loaded back for reporting.
#[derive(Debug, Clone, Deserialize)]
pub struct UserExport {
    /// Export metadata.
    pub metadata: ExportMetadata,
    /// The synchronized users.
    pub users: Vec<IgaUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_raw_known_values() {
        assert_eq!(UserStatus::from_raw("ACTIVE"), UserStatus::Active);
        assert_eq!(UserStatus::from_raw("active"), UserStatus::Active);
        assert_eq!(UserStatus::from_raw("Suspended"), UserStatus::Suspended);
        assert_eq!(
            UserStatus::from_raw("DEPROVISIONED"),
            UserStatus::Deprovisioned
        );
        assert_eq!(UserStatus::from_raw("staged"), UserStatus::Staged);
    }

    #[test]
    fn test_status_from_raw_unrecognized_falls_back_to_unknown() {
        assert_eq!(UserStatus::from_raw("LOCKED"), UserStatus::Unknown);
        assert_eq!(UserStatus::from_raw(""), UserStatus::Unknown);
        assert_eq!(UserStatus::from_raw("42"), UserStatus::Unknown);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&UserStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");

        let status: UserStatus = serde_json::from_str("\"SUSPENDED\"").unwrap();
        assert_eq!(status, UserStatus::Suspended);
    }

    #[test]
    fn test_status_display_matches_as_str() {
        assert_eq!(UserStatus::Exit.to_string(), "EXIT");
        assert_eq!(UserStatus::Unknown.as_str(), "UNKNOWN");
    }
}
