use common::{
    error::{AppError, Res},
    http::ApiRequest,
};
use log::{info, warn};

use crate::{
    client::{ACCEPT_INVITE_PATH, ApiClient, LOGIN_PATH, REGISTER_PATH},
    dtos::auth::{AcceptInviteRequest, AdminUser, AuthResponse, LoginRequest, RegisterRequest},
};

pub const PROFILE_PATH: &str = "/auth/profile";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Signs an administrator in and stores the issued access token.
/// Bad credentials come back as `AppError::Unauthorized`, never refreshed.
pub async fn login(client: &ApiClient, login_data: &LoginRequest) -> Res<AuthResponse> {
    let request = ApiRequest::post(LOGIN_PATH).json(login_data)?;
    let auth = client.send_json::<AuthResponse>(request).await?;
    store_token(client, &auth)?;
    info!("Signed in as {}", login_data.email);
    Ok(auth)
}

/// Registers a new organization owner.
/// When the backend signs the new account in straight away, the token is kept.
pub async fn register(client: &ApiClient, register_data: &RegisterRequest) -> Res<AuthResponse> {
    let request = ApiRequest::post(REGISTER_PATH).json(register_data)?;
    let auth = client.send_json::<AuthResponse>(request).await?;
    if auth.access_token.is_some() {
        store_token(client, &auth)?;
    }
    Ok(auth)
}

/// Completes a team invitation.
pub async fn accept_invite(client: &ApiClient, invite: &AcceptInviteRequest) -> Res<AuthResponse> {
    let request = ApiRequest::post(ACCEPT_INVITE_PATH).json(invite)?;
    let auth = client.send_json::<AuthResponse>(request).await?;
    if auth.access_token.is_some() {
        store_token(client, &auth)?;
    }
    Ok(auth)
}

/// Gets the signed-in administrator.
pub async fn profile(client: &ApiClient) -> Res<AdminUser> {
    client.send_json(ApiRequest::get(PROFILE_PATH)).await
}

/// Ends the session on the backend and always drops local credentials.
/// An already dead session is not an error here.
pub async fn logout(client: &ApiClient) -> Res<()> {
    let result = client.send(ApiRequest::post(LOGOUT_PATH)).await;
    client.session().clear();
    match result {
        Ok(_) => Ok(()),
        Err(error) if error.is_auth_failure() => {
            warn!("Logout with an expired session: {}", error);
            Ok(())
        }
        Err(error) => Err(error),
    }
}

fn store_token(client: &ApiClient, auth: &AuthResponse) -> Res<()> {
    let token = auth
        .access_token
        .clone()
        .ok_or_else(|| AppError::Internal("Sign-in response carried no token".to_string()))?;
    client.session().set_access_token(token);
    Ok(())
}
