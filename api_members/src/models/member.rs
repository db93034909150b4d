use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
    Expired,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Expired => "expired",
        }
    }
}

/// Plan a member is subscribed to, as far as the member record knows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRef {
    pub id: String,
    pub name: Option<String>,
}

/// Canonical member record used by every console operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Status as stored by the backend; may be stale, see [`Member::effective_status`].
    pub status: MemberStatus,
    pub plan: Option<PlanRef>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_expiry_date: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the paid period has run out at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.subscription_expiry_date
            .is_some_and(|expiry| expiry <= now)
    }

    /// Status the console shows.
    ///
    /// The backend owns the stored status and may not have flipped it yet;
    /// a past expiry date always reads as `Expired`. Nothing is written back.
    pub fn effective_status(&self, now: DateTime<Utc>) -> MemberStatus {
        if self.is_expired(now) {
            MemberStatus::Expired
        } else {
            self.status
        }
    }

    /// Expiry of a subscription that is still running at `now`.
    pub fn active_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.subscription_expiry_date.filter(|expiry| *expiry > now)
    }
}
