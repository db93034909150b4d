use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{member::MemberStatus, plan::SubscriptionPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationType {
    Days,
    Months,
}

/// How a grant composes with a subscription that is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Replace the current period, starting now.
    Override,
    /// Start when the current period ends.
    Queue,
}

/// Request to give a member access to a plan. Never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub plan_id: String,
    pub duration: u32,
    pub duration_type: DurationType,
    pub reason: String,
    pub apply_mode: ApplyMode,
}

impl AccessGrant {
    /// A grant of one billing cycle of `plan`.
    pub fn one_cycle(
        plan: &SubscriptionPlan,
        reason: impl Into<String>,
        apply_mode: ApplyMode,
    ) -> Self {
        let (duration, duration_type) = plan.duration.grant_length();
        AccessGrant {
            plan_id: plan.id.clone(),
            duration,
            duration_type,
            reason: reason.into(),
            apply_mode,
        }
    }
}

/// Plan assignment and dates a grant resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPlan {
    pub plan_id: String,
    pub status: MemberStatus,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    /// Mode actually applied; an expired or missing subscription always overrides.
    pub applied_mode: ApplyMode,
}
