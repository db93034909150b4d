use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
    Abandoned,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Abandoned => "abandoned",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Backend spellings vary between providers.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "success" | "successful" | "paid" | "completed" => Some(PaymentStatus::Success),
            "pending" | "processing" | "ongoing" => Some(PaymentStatus::Pending),
            "failed" | "declined" => Some(PaymentStatus::Failed),
            "abandoned" | "cancelled" => Some(PaymentStatus::Abandoned),
            "refunded" | "reversed" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: String,
    pub reference: String,
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub plan_id: Option<String>,
    pub amount: f64,
    pub currency: Option<String>,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}
