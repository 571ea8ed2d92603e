use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::web::types::ValidEmail;

pub const STORAGE_KEY_PREFIX: &str = "email:";

/// The persisted unit of data representing one captured sign-up.
///
/// Serialized as `{"email": .., "submittedAt": .., "userAgent": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
    pub email: String,
    /// ISO-8601, millisecond precision, UTC (`2026-10-17T09:30:00.123Z`)
    pub submitted_at: String,
    /// Copied verbatim from the `user-agent` header, empty if it was missing.
    #[serde(rename = "userAgent")]
    pub user_agent_hint: String,
}

impl SubscriberRecord {
    pub fn new(email: &ValidEmail, user_agent_hint: String, submitted_at: DateTime<Utc>) -> Self {
        Self {
            email: email.as_ref().to_string(),
            submitted_at: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            user_agent_hint,
        }
    }
}

/// `"email:" + normalized email`. Any two submissions that normalize to the same
/// address share a key.
pub fn storage_key(email: &ValidEmail) -> String {
    format!("{STORAGE_KEY_PREFIX}{}", email.as_ref())
}
