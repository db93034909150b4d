use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::grant::{ApplyMode, DurationType};

/// Body of `POST /members/subscriptions`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessRequest {
    pub member_id: String,
    pub plan_id: String,
    pub metadata: GrantMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantMetadata {
    pub reason: String,
    pub apply_mode: ApplyMode,
    pub duration: u32,
    pub duration_type: DurationType,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: &'static str,
    pub granted_manually: bool,
}

/// Lifecycle actions on an existing subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionAction {
    Pause,
    Resume,
    Cancel,
}

impl SubscriptionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionAction::Pause => "pause",
            SubscriptionAction::Resume => "resume",
            SubscriptionAction::Cancel => "cancel",
        }
    }
}
