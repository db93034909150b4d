use serde::{Deserialize, Serialize};

use super::grant::DurationType;

/// Billing cycle of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanDuration {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl PlanDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanDuration::Weekly => "weekly",
            PlanDuration::Monthly => "monthly",
            PlanDuration::Quarterly => "quarterly",
            PlanDuration::Yearly => "yearly",
        }
    }

    /// One billing cycle expressed as a grant length.
    pub fn grant_length(&self) -> (u32, DurationType) {
        match self {
            PlanDuration::Weekly => (7, DurationType::Days),
            PlanDuration::Monthly => (1, DurationType::Months),
            PlanDuration::Quarterly => (3, DurationType::Months),
            PlanDuration::Yearly => (12, DurationType::Months),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanVisibility {
    Public,
    InviteOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFeature {
    pub name: String,
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: Option<String>,
    pub duration: PlanDuration,
    pub features: Vec<PlanFeature>,
    pub visibility: PlanVisibility,
    pub is_active: bool,
    pub member_count: Option<u64>,
}

impl SubscriptionPlan {
    pub fn included_features(&self) -> impl Iterator<Item = &PlanFeature> {
        self.features.iter().filter(|feature| feature.included)
    }

    /// Whether the plan can be offered in the grant-access flow.
    pub fn is_grantable(&self) -> bool {
        self.is_active
    }
}
