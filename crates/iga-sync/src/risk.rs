//! Risk scoring for synchronized users.

use chrono::{DateTime, Utc};

use crate::mapping::parse_timestamp;
use crate::models::UserStatus;

/// Group-name keywords that indicate administrative access.
pub const ADMIN_GROUP_KEYWORDS: &[&str] =
    &["admin", "administrator", "root", "superuser", "privileged"];

/// Computes an access-risk score in [0, 100] for a user.
///
/// Deterministic in its inputs; `now` anchors the login-age buckets.
#[must_use]
pub fn calculate_risk_score(
    status: UserStatus,
    last_login: Option<&str>,
    groups: &[String],
    now: DateTime<Utc>,
) -> u8 {
    calculate_risk_score_with_keywords(status, last_login, groups, ADMIN_GROUP_KEYWORDS, now)
}

/// Same as [`calculate_risk_score`], scoring group membership against a
/// caller-supplied keyword list.
#[must_use]
pub fn calculate_risk_score_with_keywords(
    status: UserStatus,
    last_login: Option<&str>,
    groups: &[String],
    keywords: &[&str],
    now: DateTime<Utc>,
) -> u8 {
    let mut score: u32 = 0;

    match status {
        UserStatus::Suspended => score += 20,
        UserStatus::Deprovisioned => score += 50,
        _ => {}
    }

    match last_login.filter(|raw| !raw.is_empty()) {
        Some(raw) => match parse_timestamp(raw) {
            Some(login) => {
                let days = (now - login).num_days();
                if days > 90 {
                    score += 30;
                } else if days > 30 {
                    score += 15;
                } else if days > 7 {
                    score += 5;
                }
            }
            // Unknown login date is risky
            None => score += 10,
        },
        // No login date is risky
        None => score += 25,
    }

    score += matching_group_count(groups, keywords) * 10;

    score.min(100) as u8
}

/// Counts groups whose lowercased name contains any of the keywords.
#[must_use]
pub fn matching_group_count(groups: &[String], keywords: &[&str]) -> u32 {
    groups
        .iter()
        .filter(|group| {
            let name = group.to_lowercase();
            keywords.iter().any(|keyword| name.contains(keyword))
        })
        .count() as u32
}
