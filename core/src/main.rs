use std::env;

use anyhow::{Context, bail};
use api_auth::{ApiClient, dtos::auth::LoginRequest, services::auth};
use api_members::services::{
    analytics::member_overview,
    member::{self, MemberQuery},
    plan,
};
use chrono::Utc;
use common::{env_config::Config, error::Res};
use log::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // get env vars
    let config = Config::from_env().context("Failed to load configuration")?;
    let (Ok(email), Ok(password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) else {
        bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set");
    };

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config).context("Failed to set up logger")?;
    }
    info!(
        "Console starting against {} ({})",
        config.api_base_url, config.environment
    );

    let client = ApiClient::new(&config).context("Failed to build API client")?;

    let result = run(&client, LoginRequest { email, password }).await;
    if let Err(error) = &result {
        error.log();
    }

    if client.session().is_authenticated() {
        if let Err(error) = auth::logout(&client).await {
            warn!("Logout failed: {}", error);
        }
    }
    Ok(result?)
}

async fn run(client: &ApiClient, credentials: LoginRequest) -> Res<()> {
    // sign in
    auth::login(client, &credentials).await?;
    let admin = auth::profile(client).await?;
    info!("Signed in as {} <{}>", admin.full_name(), admin.email);

    // dashboard summary
    let plans = plan::list_plans(client).await?;
    info!(
        "{} plan(s), {} open for grants",
        plans.len(),
        plans.iter().filter(|p| p.is_grantable()).count()
    );

    let members = member::list_all_members(
        client,
        &MemberQuery {
            limit: Some(100),
            ..Default::default()
        },
    )
    .await?;

    let overview = member_overview(&members, Utc::now());
    info!(
        "Members: {} total, {} active, {} inactive, {} expired, {} expiring within a week",
        overview.total, overview.active, overview.inactive, overview.expired, overview.expiring_soon
    );
    Ok(())
}
