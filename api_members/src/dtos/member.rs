use common::error::{AppError, Res};
use log::warn;
use serde::Deserialize;

use crate::{
    misc::date::parse_optional,
    models::member::{Member, MemberStatus, PlanRef},
};

/// Plan field on a member: the backend sends a bare id or a populated object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlanRefDto {
    Id(String),
    Embedded {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

/// Member as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Some listings only carry a single display name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subscription_plan: Option<PlanRefDto>,
    #[serde(default)]
    pub subscription_start_date: Option<String>,
    #[serde(default)]
    pub subscription_expiry_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn parse_status(raw: Option<&str>, member_id: &str) -> MemberStatus {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("active") => MemberStatus::Active,
        Some("expired") => MemberStatus::Expired,
        Some("inactive") | None => MemberStatus::Inactive,
        Some(other) => {
            warn!("Member {} has unknown status '{}', treating as inactive", member_id, other);
            MemberStatus::Inactive
        }
    }
}

impl TryFrom<MemberDto> for Member {
    type Error = AppError;

    fn try_from(dto: MemberDto) -> Res<Self> {
        let (first_name, last_name) = match (dto.first_name, dto.last_name) {
            (Some(first), last) if !first.trim().is_empty() => (first, last.unwrap_or_default()),
            (_, last) => {
                let display = dto.name.unwrap_or_default();
                match display.trim().split_once(' ') {
                    Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
                    None => (display.trim().to_string(), last.unwrap_or_default()),
                }
            }
        };

        let plan = dto.subscription_plan.map(|plan| match plan {
            PlanRefDto::Id(id) => PlanRef { id, name: None },
            PlanRefDto::Embedded { id, name } => PlanRef { id, name },
        });

        Ok(Member {
            status: parse_status(dto.status.as_deref(), &dto.id),
            subscription_start_date: parse_optional(dto.subscription_start_date.as_deref())?,
            subscription_expiry_date: parse_optional(dto.subscription_expiry_date.as_deref())?,
            joined_at: parse_optional(dto.created_at.as_deref())?,
            id: dto.id,
            first_name,
            last_name,
            email: dto.email,
            phone: dto.phone.filter(|phone| !phone.trim().is_empty()),
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn decode(json: &str) -> Member {
        let dto: MemberDto = serde_json::from_str(json).unwrap();
        Member::try_from(dto).unwrap()
    }

    #[test]
    fn populated_member_maps_to_canonical_shape() {
        let member = decode(
            r#"{
                "_id": "m1",
                "firstName": "Tunde",
                "lastName": "Bakare",
                "email": "tunde@example.com",
                "phone": "",
                "status": "ACTIVE",
                "subscriptionPlan": { "_id": "p1", "name": "Gold" },
                "subscriptionStartDate": "2025-05-01T00:00:00.000Z",
                "subscriptionExpiryDate": "2025-06-01T00:00:00.000Z"
            }"#,
        );
        assert_eq!(member.id, "m1");
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.phone, None);
        assert_eq!(
            member.plan,
            Some(PlanRef {
                id: "p1".to_string(),
                name: Some("Gold".to_string())
            })
        );
        assert_eq!(
            member.subscription_expiry_date,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn bare_plan_id_and_display_name_are_accepted() {
        let member = decode(
            r#"{ "id": "m2", "name": "Amaka Grace Obi", "email": "a@o.ng", "subscriptionPlan": "p9" }"#,
        );
        assert_eq!(member.first_name, "Amaka");
        assert_eq!(member.last_name, "Grace Obi");
        assert_eq!(member.status, MemberStatus::Inactive);
        assert_eq!(member.plan.unwrap().id, "p9");
        assert_eq!(member.subscription_expiry_date, None);
    }

    #[test]
    fn unreadable_dates_fail_the_mapping() {
        let dto: MemberDto =
            serde_json::from_str(r#"{ "_id": "m3", "subscriptionExpiryDate": "soon" }"#).unwrap();
        assert!(Member::try_from(dto).is_err());
    }
}
