use api_auth::ApiClient;
use common::{
    error::Res,
    http::{ApiRequest, path_segment},
};
use log::info;

use crate::{
    dtos::plan::{PlanDraft, PlanDto},
    models::plan::SubscriptionPlan,
};

pub const PLANS_PATH: &str = "/plans";

pub async fn list_plans(client: &ApiClient) -> Res<Vec<SubscriptionPlan>> {
    let plans: Vec<PlanDto> = client.send_json(ApiRequest::get(PLANS_PATH)).await?;
    plans.into_iter().map(SubscriptionPlan::try_from).collect()
}

pub async fn create_plan(client: &ApiClient, draft: &PlanDraft) -> Res<SubscriptionPlan> {
    draft.validate()?;
    let request = ApiRequest::post(PLANS_PATH).json(draft)?;
    let plan = SubscriptionPlan::try_from(client.send_json::<PlanDto>(request).await?)?;
    info!("Created plan {} ({})", plan.name, plan.id);
    Ok(plan)
}

pub async fn update_plan(
    client: &ApiClient,
    plan_id: &str,
    draft: &PlanDraft,
) -> Res<SubscriptionPlan> {
    draft.validate()?;
    let path = format!("{}/{}", PLANS_PATH, path_segment(plan_id)?);
    let request = ApiRequest::put(path).json(draft)?;
    SubscriptionPlan::try_from(client.send_json::<PlanDto>(request).await?)
}

pub async fn delete_plan(client: &ApiClient, plan_id: &str) -> Res<()> {
    let path = format!("{}/{}", PLANS_PATH, path_segment(plan_id)?);
    client.send(ApiRequest::delete(path)).await?;
    info!("Deleted plan {}", plan_id);
    Ok(())
}

/// Opens or closes a plan for new grants, keeping everything else as is.
pub async fn set_plan_active(
    client: &ApiClient,
    plan: &SubscriptionPlan,
    active: bool,
) -> Res<SubscriptionPlan> {
    let draft = PlanDraft {
        is_active: active,
        ..PlanDraft::from(plan)
    };
    let updated = update_plan(client, &plan.id, &draft).await?;
    info!(
        "Plan {} is now {}",
        updated.name,
        if updated.is_active { "active" } else { "inactive" }
    );
    Ok(updated)
}
