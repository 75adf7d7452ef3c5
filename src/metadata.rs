//! Client for the third-party game metadata API (RAWG-compatible).
//!
//! Responses are reshaped into the storefront's own types. There is no caching
//! and no retry; every call has the configured timeout, and non-2xx upstream
//! answers are surfaced with their status and body.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    config::MetadataConfig,
    error::AppError,
    dto::products::{
        ExternalGame, ExternalGameList, GameDetails, NewsArticle, NewsList, PopularGame,
    },
};

const POPULAR_PAGE_SIZE: usize = 10;
const NEWS_DEFAULT_PAGE_SIZE: u32 = 5;
const GAME_PAGE_BASE: &str = "https://rawg.io/games";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata API returned {status}: {body}")]
    Api { status: u16, body: String },
}

impl MetadataError {
    fn parts(self) -> (u16, String) {
        match self {
            MetadataError::Api { status, body } => (status, body),
            MetadataError::Http(err) => {
                let status = err.status().map(|s| s.as_u16()).unwrap_or(502);
                (status, err.to_string())
            }
        }
    }

    /// Answers with the upstream's own status instead of 502.
    pub fn pass_through(self) -> AppError {
        let (status, details) = self.parts();
        AppError::UpstreamStatus { status, details }
    }
}

impl From<MetadataError> for AppError {
    fn from(err: MetadataError) -> Self {
        let (status, details) = err.parts();
        AppError::Upstream { status, details }
    }
}

#[derive(Clone)]
pub struct MetadataClient {
    inner: Arc<MetadataClientInner>,
}

struct MetadataClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlatformEntry {
    platform: Option<RawNamed>,
    name: Option<String>,
}

impl RawPlatformEntry {
    fn into_name(self) -> Option<String> {
        self.platform.and_then(|p| p.name).or(self.name)
    }
}

#[derive(Debug, Deserialize)]
struct RawGameDetails {
    id: i64,
    name: Option<String>,
    description_raw: Option<String>,
    description: Option<String>,
    #[serde(default)]
    genres: Option<Vec<RawNamed>>,
    #[serde(default)]
    platforms: Option<Vec<RawPlatformEntry>>,
    rating: Option<f64>,
    background_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGameSummary {
    id: i64,
    name: Option<String>,
    slug: Option<String>,
    rating: Option<f64>,
    released: Option<String>,
    updated: Option<String>,
    background_image: Option<String>,
    #[serde(default)]
    platforms: Option<Vec<RawPlatformEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    excerpt: Option<String>,
    description: Option<String>,
    image: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    date: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArticlePage {
    #[serde(default)]
    results: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawGamePage {
    count: Option<i64>,
    #[serde(default)]
    results: Vec<RawGameSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct ExternalSearch {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl MetadataClient {
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            inner: Arc::new(MetadataClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    pub async fn game_details(&self, id: i64) -> Result<GameDetails, MetadataError> {
        let raw: RawGameDetails = self.get(&format!("/games/{id}"), &[]).await?;
        Ok(GameDetails {
            id: raw.id,
            name: raw.name,
            description: raw.description_raw.or(raw.description),
            genres: raw
                .genres
                .unwrap_or_default()
                .into_iter()
                .filter_map(|g| g.name)
                .collect(),
            platforms: platform_names(raw.platforms),
            rating: raw.rating,
            image: raw.background_image.filter(|s| !s.is_empty()),
        })
    }

    /// Most-added games, as a popularity proxy.
    pub async fn popular(&self) -> Result<Vec<PopularGame>, MetadataError> {
        let page_size = POPULAR_PAGE_SIZE.to_string();
        let raw: RawGamePage = self
            .get(
                "/games",
                &[("page_size", page_size.as_str()), ("ordering", "-added")],
            )
            .await?;

        Ok(raw
            .results
            .into_iter()
            .take(POPULAR_PAGE_SIZE)
            .map(|g| PopularGame {
                id: g.id,
                name: g.name.unwrap_or_default(),
                image: g.background_image.unwrap_or_default(),
                rating: g.rating.unwrap_or(0.0),
                released: g.released,
            })
            .collect())
    }

    pub async fn search(&self, query: &ExternalSearch) -> Result<ExternalGameList, MetadataError> {
        let page = query.page.unwrap_or(1).max(1).to_string();
        let page_size = query.page_size.unwrap_or(10).clamp(1, 40).to_string();
        let mut params = vec![("page_size", page_size.as_str()), ("page", page.as_str())];
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("search", search));
        }

        let raw: RawGamePage = self.get("/games", &params).await?;
        let results: Vec<ExternalGame> = raw
            .results
            .into_iter()
            .map(|g| ExternalGame {
                id: g.id,
                title: g.name.unwrap_or_default(),
                price: synthesized_price(g.rating.unwrap_or(0.0)),
                platforms: platform_names(g.platforms),
                image: g.background_image.unwrap_or_default(),
                slug: g.slug,
            })
            .collect();

        Ok(ExternalGameList {
            count: raw.count.unwrap_or(results.len() as i64),
            results,
        })
    }

    /// Games matching the search, each with its news articles. A game whose news cannot
    /// be fetched gets one article built from its own metadata. Newest first.
    pub async fn news(&self, query: &ExternalSearch) -> Result<NewsList, MetadataError> {
        let page = query.page.unwrap_or(1).max(1).to_string();
        let page_size = query
            .page_size
            .unwrap_or(NEWS_DEFAULT_PAGE_SIZE)
            .clamp(1, 40)
            .to_string();
        let mut params = vec![("page_size", page_size.as_str()), ("page", page.as_str())];
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("search", search));
        }

        let raw: RawGamePage = self.get("/games", &params).await?;
        let mut articles = Vec::new();
        for game in raw.results {
            let slug = game.slug.clone().unwrap_or_else(|| game.id.to_string());
            match self
                .get::<RawArticlePage>(&format!("/games/{slug}/news"), &[])
                .await
            {
                Ok(page) if !page.results.is_empty() => {
                    articles.extend(
                        page.results
                            .into_iter()
                            .map(|art| article_from_news(art, &game, &slug)),
                    );
                    continue;
                }
                Ok(_) => {}
                Err(err) => tracing::debug!(slug = %slug, error = %err, "no news for game"),
            }
            articles.push(fallback_article(&game, &slug));
        }

        articles.sort_by_key(|a| std::cmp::Reverse(published_millis(a.published_at.as_deref())));
        Ok(NewsList {
            count: articles.len(),
            results: articles,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MetadataError> {
        let url = format!("{}{path}", self.inner.base_url);
        let mut request = self.inner.client.get(&url).query(params);
        if let Some(key) = &self.inner.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            tracing::warn!(status = %status, path, "metadata API request failed");
            return Err(MetadataError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

fn platform_names(platforms: Option<Vec<RawPlatformEntry>>) -> Vec<String> {
    platforms
        .unwrap_or_default()
        .into_iter()
        .filter_map(RawPlatformEntry::into_name)
        .collect()
}

fn article_from_news(art: RawArticle, game: &RawGameSummary, slug: &str) -> NewsArticle {
    let name = game.name.as_deref().unwrap_or(slug);
    NewsArticle {
        title: art.title.unwrap_or_else(|| format!("{name} news")),
        excerpt: art.excerpt.or(art.description).unwrap_or_default(),
        image: art
            .image
            .or_else(|| game.background_image.clone())
            .unwrap_or_default(),
        url: art.url.unwrap_or_else(|| format!("{GAME_PAGE_BASE}/{slug}")),
        published_at: art.published_at.or(art.date),
        source: art.source.unwrap_or_else(|| "rawg_news".to_string()),
    }
}

fn fallback_article(game: &RawGameSummary, slug: &str) -> NewsArticle {
    let name = game.name.as_deref().unwrap_or(slug);
    NewsArticle {
        title: format!("{name} is in the spotlight"),
        excerpt: match &game.released {
            Some(released) => format!("Released on {released}"),
            None => "Visit the game page for more details.".to_string(),
        },
        image: game.background_image.clone().unwrap_or_default(),
        url: format!("{GAME_PAGE_BASE}/{slug}"),
        published_at: game.updated.clone().or_else(|| game.released.clone()),
        source: "rawg_fallback".to_string(),
    }
}

/// Unparseable or missing dates sort last.
fn published_millis(value: Option<&str>) -> i64 {
    let Some(value) = value else {
        return 0;
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return dt.and_utc().timestamp_millis();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// The metadata API has no prices; external listings get a placeholder derived from the rating.
pub fn synthesized_price(rating: f64) -> f64 {
    ((10.0 + rating * 7.0) * 100.0).round() / 100.0
}
