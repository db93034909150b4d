use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

use crate::models::plan::{PlanDuration, PlanFeature, PlanVisibility, SubscriptionPlan};

/// Feature entry: older plans store plain strings, newer ones carry a flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeatureDto {
    Name(String),
    Flagged { name: String, included: bool },
}

/// Plan as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub duration: String,
    #[serde(default)]
    pub features: Vec<FeatureDto>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, alias = "subscriberCount", alias = "membersCount")]
    pub member_count: Option<u64>,
}

fn default_active() -> bool {
    true
}

impl TryFrom<PlanDto> for SubscriptionPlan {
    type Error = AppError;

    fn try_from(dto: PlanDto) -> Res<Self> {
        let duration = match dto.duration.trim().to_lowercase().as_str() {
            "weekly" => PlanDuration::Weekly,
            "monthly" => PlanDuration::Monthly,
            "quarterly" => PlanDuration::Quarterly,
            "yearly" | "annual" | "annually" => PlanDuration::Yearly,
            other => {
                return Err(AppError::Internal(format!(
                    "Plan {} has unknown duration '{}'",
                    dto.id, other
                )));
            }
        };

        let visibility = match dto.visibility.as_deref().map(str::trim) {
            Some("invite_only") | Some("inviteOnly") | Some("private") => PlanVisibility::InviteOnly,
            _ => PlanVisibility::Public,
        };

        let features = dto
            .features
            .into_iter()
            .map(|feature| match feature {
                FeatureDto::Name(name) => PlanFeature {
                    name,
                    included: true,
                },
                FeatureDto::Flagged { name, included } => PlanFeature { name, included },
            })
            .collect();

        Ok(SubscriptionPlan {
            id: dto.id,
            name: dto.name,
            description: dto.description.unwrap_or_default(),
            price: dto.price,
            currency: dto.currency,
            duration,
            features,
            visibility,
            is_active: dto.is_active,
            member_count: dto.member_count,
        })
    }
}

/// Body for creating or editing a plan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub duration: PlanDuration,
    pub features: Vec<PlanFeature>,
    pub visibility: PlanVisibility,
    pub is_active: bool,
}

impl PlanDraft {
    /// Rejects drafts the backend would refuse anyway.
    pub fn validate(&self) -> Res<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Plan name is required".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::Validation(
                "Price must be zero or a positive amount".to_string(),
            ));
        }
        if self.features.iter().any(|feature| feature.name.trim().is_empty()) {
            return Err(AppError::Validation("Feature names cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl From<&SubscriptionPlan> for PlanDraft {
    fn from(plan: &SubscriptionPlan) -> Self {
        PlanDraft {
            name: plan.name.clone(),
            description: plan.description.clone(),
            price: plan.price,
            currency: plan.currency.clone(),
            duration: plan.duration,
            features: plan.features.clone(),
            visibility: plan.visibility,
            is_active: plan.is_active,
        }
    }
}
