use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

/// Serialized as a bare JSON array.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductList(pub Vec<Product>);

/// Shape returned by the metadata details proxy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GameDetails {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub rating: Option<f64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PopularGame {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub rating: f64,
    pub released: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExternalGame {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub platforms: Vec<String>,
    pub image: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExternalGameList {
    pub count: i64,
    pub results: Vec<ExternalGame>,
}

/// One entry of the aggregated game news feed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub url: String,
    pub published_at: Option<String>,
    /// `rawg_news` for upstream articles, `rawg_fallback` for ones built from game metadata.
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsList {
    pub count: usize,
    pub results: Vec<NewsArticle>,
}
