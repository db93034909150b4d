use common::error::{AppError, Res};
use serde::Deserialize;

use crate::{
    dtos::member::PlanRefDto,
    misc::date::parse_optional,
    models::payment::{Payment, PaymentStatus},
};

/// Member field on a payment: bare id or a populated object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PayerDto {
    Id(String),
    Embedded {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default, rename = "firstName")]
        first_name: Option<String>,
        #[serde(default, rename = "lastName")]
        last_name: Option<String>,
    },
}

/// Payment as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    #[serde(alias = "_id")]
    pub id: String,
    pub reference: String,
    #[serde(default, alias = "member")]
    pub member_id: Option<PayerDto>,
    #[serde(default, alias = "plan")]
    pub plan_id: Option<PlanRefDto>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub status: String,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TryFrom<PaymentDto> for Payment {
    type Error = AppError;

    fn try_from(dto: PaymentDto) -> Res<Self> {
        let status = PaymentStatus::parse(&dto.status).ok_or_else(|| {
            AppError::Internal(format!(
                "Payment {} has unknown status '{}'",
                dto.reference, dto.status
            ))
        })?;

        let (member_id, member_name) = match dto.member_id {
            Some(PayerDto::Id(id)) => (Some(id), None),
            Some(PayerDto::Embedded {
                id,
                first_name,
                last_name,
            }) => {
                let name = format!(
                    "{} {}",
                    first_name.unwrap_or_default(),
                    last_name.unwrap_or_default()
                )
                .trim()
                .to_string();
                (Some(id), Some(name).filter(|n| !n.is_empty()))
            }
            None => (None, None),
        };

        let plan_id = dto.plan_id.map(|plan| match plan {
            PlanRefDto::Id(id) => id,
            PlanRefDto::Embedded { id, .. } => id,
        });

        let paid_at = match parse_optional(dto.paid_at.as_deref())? {
            Some(paid_at) => Some(paid_at),
            None => parse_optional(dto.created_at.as_deref())?,
        };

        Ok(Payment {
            id: dto.id,
            reference: dto.reference,
            member_id,
            member_name,
            plan_id,
            amount: dto.amount,
            currency: dto.currency,
            status,
            paid_at,
        })
    }
}

/// Result of asking the backend to confirm a payment with the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerificationDto {
    #[serde(default)]
    pub reference: Option<String>,
    pub status: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populated_payment_maps_member_name_and_plan() {
        let dto: PaymentDto = serde_json::from_str(
            r#"{
                "_id": "pay1",
                "reference": "ref_123",
                "member": { "_id": "m1", "firstName": "Ife", "lastName": "Ade" },
                "plan": "p1",
                "amount": 15000,
                "status": "success",
                "createdAt": "2025-05-02T08:00:00Z"
            }"#,
        )
        .unwrap();
        let payment = Payment::try_from(dto).unwrap();
        assert_eq!(payment.member_id.as_deref(), Some("m1"));
        assert_eq!(payment.member_name.as_deref(), Some("Ife Ade"));
        assert_eq!(payment.plan_id.as_deref(), Some("p1"));
        assert_eq!(payment.status, PaymentStatus::Success);
        assert!(payment.paid_at.is_some());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let dto: PaymentDto = serde_json::from_str(
            r#"{ "id": "pay2", "reference": "ref_9", "status": "weird" }"#,
        )
        .unwrap();
        assert!(Payment::try_from(dto).is_err());
    }
}
