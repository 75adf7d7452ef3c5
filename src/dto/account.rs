use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PublicUser, Purchase};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountOverview {
    pub user: PublicUser,
    pub purchases: Vec<Purchase>,
}
