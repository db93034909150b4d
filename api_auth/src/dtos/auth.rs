use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteRequest {
    pub token: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl AdminUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Body returned by login, registration, invite acceptance and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default, alias = "accessToken", alias = "token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<AdminUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_accepts_backend_spellings() {
        let camel: AuthResponse =
            serde_json::from_str(r#"{"accessToken":"a1","user":{"_id":"u1","email":"x@y.z"}}"#)
                .unwrap();
        assert_eq!(camel.access_token.as_deref(), Some("a1"));
        assert_eq!(camel.user.unwrap().id, "u1");

        let short: AuthResponse = serde_json::from_str(r#"{"token":"a2"}"#).unwrap();
        assert_eq!(short.access_token.as_deref(), Some("a2"));
        assert!(short.user.is_none());
    }

    #[test]
    fn register_request_is_camel_case() {
        let body = serde_json::to_value(RegisterRequest {
            email: "owner@gym.io".to_string(),
            password: "secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            organization_name: Some("Gym".to_string()),
        })
        .unwrap();
        assert_eq!(body["firstName"], "Ada");
        assert_eq!(body["organizationName"], "Gym");
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let user = AdminUser {
            id: "1".to_string(),
            email: "a@b.c".to_string(),
            first_name: "Ada".to_string(),
            last_name: String::new(),
            role: None,
        };
        assert_eq!(user.full_name(), "Ada");
    }
}
