use serde::{Deserialize, Serialize};

/// Identity record returned by `/auth/me`, `/auth/login` and `/auth/signup`.
///
/// The login and signup responses name the id `user_id`, `/auth/me` names it `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "user_id")]
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub github_username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful login/signup payload: the identity plus a fresh bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthGrant {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubLogin {
    pub auth_url: String,
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
