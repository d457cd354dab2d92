//! Shared helpers for iga-sync integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::{Respond, ResponseTemplate};

use iga_sync::IgaConfig;

/// Builds a config pointed at a mock server, with throttling disabled.
pub fn test_config(base_url: &str) -> IgaConfig {
    IgaConfig::for_testing(base_url)
}

/// JumpCloud-style user record with a login two days ago.
pub fn console_user(id: &str, email_prefix: &str) -> Value {
    json!({
        "_id": id,
        "email": format!("{}@example.com", email_prefix),
        "username": email_prefix,
        "firstname": "Test",
        "lastname": "User",
        "activated": true,
        "department": "Engineering",
        "lastLogin": (Utc::now() - Duration::days(2)).to_rfc3339(),
        "groups": ["engineering"]
    })
}

/// Active user record with no recorded login.
pub fn user_without_login(id: &str, email_prefix: &str) -> Value {
    json!({
        "_id": id,
        "email": format!("{}@example.com", email_prefix),
        "username": email_prefix,
        "firstname": "New",
        "lastname": "Hire",
        "activated": true,
        "groups": []
    })
}

/// Suspended administrator with a login long in the past.
pub fn suspended_admin(id: &str, email_prefix: &str) -> Value {
    json!({
        "_id": id,
        "email": format!("{}@example.com", email_prefix),
        "username": email_prefix,
        "firstname": "Dormant",
        "lastname": "Admin",
        "suspended": true,
        "lastLogin": "2024-10-01T00:00:00Z",
        "groups": [{"name": "Platform Admins"}]
    })
}

/// Generates a sequence of user records.
pub fn generate_users(count: usize, offset: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let n = offset + i;
            console_user(&format!("user-{}", n), &format!("user{}", n))
        })
        .collect()
}

/// Wraps records in the `results` / `next_cursor` envelope.
pub fn results_page(records: Vec<Value>, next_cursor: Option<&str>) -> Value {
    match next_cursor {
        Some(cursor) => json!({ "results": records, "next_cursor": cursor }),
        None => json!({ "results": records }),
    }
}

/// Wraps records in the `data` / `nextCursor` envelope.
pub fn data_page(records: Vec<Value>, next_cursor: Option<&str>) -> Value {
    match next_cursor {
        Some(cursor) => json!({ "data": records, "nextCursor": cursor }),
        None => json!({ "data": records }),
    }
}

/// Serves each page in sequence, then empty pages for extra requests.
pub struct PaginatedResponder {
    pages: Vec<Value>,
    current_page: Arc<AtomicU32>,
}

impl PaginatedResponder {
    pub fn new(pages: Vec<Value>) -> Self {
        Self {
            pages,
            current_page: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl Respond for PaginatedResponder {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let page_idx = self.current_page.fetch_add(1, Ordering::SeqCst) as usize;
        if page_idx < self.pages.len() {
            ResponseTemplate::new(200).set_body_json(self.pages[page_idx].clone())
        } else {
            ResponseTemplate::new(200).set_body_json(json!({ "results": [] }))
        }
    }
}
