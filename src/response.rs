use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Meta {
    pub count: Option<i64>,
    pub limit: Option<i64>,
}

impl Meta {
    pub fn listing(count: usize, limit: Option<i64>) -> Self {
        Self {
            count: Some(count as i64),
            limit,
        }
    }

    pub fn empty() -> Self {
        Self {
            count: None,
            limit: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}
