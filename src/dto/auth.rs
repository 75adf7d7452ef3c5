use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::PublicUser;

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "displayName", alias = "nome_completo")]
    pub display_name: Option<String>,
}

/// `identifier` is matched against both username and email.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    pub identifier: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}
