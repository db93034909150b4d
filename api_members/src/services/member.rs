use api_auth::ApiClient;
use chrono::{DateTime, Utc};
use common::{
    error::{AppError, Res},
    http::{ApiRequest, path_segment},
};
use log::{info, warn};

use crate::{
    dtos::{
        member::MemberDto,
        page::{Page, decode_page},
        sub::{GrantAccessRequest, GrantMetadata, SubscriptionAction},
    },
    grant::plan_grant,
    models::{
        grant::{AccessGrant, GrantPlan},
        member::{Member, MemberStatus},
    },
};

pub const MEMBERS_PATH: &str = "/members";
pub const SUBSCRIPTIONS_PATH: &str = "/members/subscriptions";

/// Filters for the member listing.
#[derive(Debug, Clone, Default)]
pub struct MemberQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<MemberStatus>,
    pub search: Option<String>,
}

impl MemberQuery {
    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(page) = self.page {
            request = request.query("page", page);
        }
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }
        if let Some(status) = self.status {
            request = request.query("status", status.as_str());
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            request = request.query("search", search);
        }
        request
    }
}

pub async fn list_members(client: &ApiClient, query: &MemberQuery) -> Res<Page<Member>> {
    let response = client.send(query.apply(ApiRequest::get(MEMBERS_PATH))).await?;
    decode_page::<MemberDto>(&response)?.try_map(Member::try_from)
}

/// Walks every page of the listing matching `filters`.
///
/// Page numbers advance from the request, not from the response metadata,
/// and the walk stops once `total` members arrived, a page is empty, or a
/// page repeats the previous one.
pub async fn list_all_members(client: &ApiClient, filters: &MemberQuery) -> Res<Vec<Member>> {
    let mut query = filters.clone();
    let mut page_number = query.page.unwrap_or(1);
    let mut members: Vec<Member> = Vec::new();
    let mut previous_first: Option<String> = None;

    loop {
        query.page = Some(page_number);
        let page = list_members(client, &query).await?;
        let first = page.items.first().map(|member| member.id.clone());
        if first.is_none() {
            break;
        }
        if first == previous_first {
            warn!("Backend repeated page {} of members, stopping", page_number);
            break;
        }

        let total = page.total;
        members.extend(page.items);
        if members.len() as u64 >= total {
            break;
        }
        previous_first = first;
        page_number += 1;
    }
    Ok(members)
}

pub async fn get_member(client: &ApiClient, member_id: &str) -> Res<Member> {
    let request = ApiRequest::get(format!("{}/{}", MEMBERS_PATH, path_segment(member_id)?));
    let dto: MemberDto = match client.send_json(request).await {
        Ok(dto) => dto,
        Err(error) if error.status() == Some(404) => {
            return Err(AppError::NotFound(format!("Member {}", member_id)));
        }
        Err(error) => return Err(error),
    };
    Member::try_from(dto)
}

/// Gives `member` access to a plan.
///
/// The dates are resolved locally against the member's current expiry;
/// a grant that fails validation is reported without contacting the backend.
pub async fn grant_access(
    client: &ApiClient,
    member: &Member,
    grant: &AccessGrant,
    now: DateTime<Utc>,
) -> Res<GrantPlan> {
    let plan = plan_grant(member.subscription_expiry_date, grant, now)?;

    let body = GrantAccessRequest {
        member_id: member.id.clone(),
        plan_id: plan.plan_id.clone(),
        metadata: GrantMetadata {
            reason: grant.reason.clone(),
            apply_mode: plan.applied_mode,
            duration: grant.duration,
            duration_type: grant.duration_type,
            start_date: plan.start_date,
            expiry_date: plan.expiry_date,
            status: plan.status.as_str(),
            granted_manually: true,
        },
    };
    client
        .send(ApiRequest::post(SUBSCRIPTIONS_PATH).json(&body)?)
        .await?;

    info!(
        "Granted {} access to plan {} until {}",
        member.id,
        plan.plan_id,
        plan.expiry_date.to_rfc3339()
    );
    Ok(plan)
}

pub async fn change_subscription(
    client: &ApiClient,
    subscription_id: &str,
    action: SubscriptionAction,
) -> Res<()> {
    let path = format!(
        "{}/{}/{}",
        SUBSCRIPTIONS_PATH,
        path_segment(subscription_id)?,
        action.as_str()
    );
    client.send(ApiRequest::patch(path)).await?;
    info!("Subscription {}: {}", subscription_id, action.as_str());
    Ok(())
}
