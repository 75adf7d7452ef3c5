use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::products::{ExternalGameList, GameDetails, NewsList, PopularGame, ProductList},
    error::AppResult,
    metadata::ExternalSearch,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ExternalQuery, SearchQuery, TopQuery},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/top", get(top_products))
        .route("/subscriptions", get(subscription_products))
        .route("/recommended", get(recommended_product))
        .route("/popular", get(popular_games))
        .route("/external", get(external_games))
        .route("/news", get(game_news))
        .route("/{id}", get(get_product))
        .route("/{id}/details", get(game_details))
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    responses(
        (status = 200, description = "All products ordered by id", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::list_products(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Products whose title matches, most popular first", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::search_products(&state.pool, &query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/top",
    params(TopQuery),
    responses(
        (status = 200, description = "Most popular products", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn top_products(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::top_products(&state.pool, &query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/subscriptions",
    responses(
        (status = 200, description = "Subscription products", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn subscription_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::subscription_products(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/recommended",
    responses(
        (status = 200, description = "One random product", body = ApiResponse<Product>),
        (status = 404, description = "Catalog is empty")
    ),
    tag = "Catalog"
)]
pub async fn recommended_product(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = catalog_service::recommended_product(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = catalog_service::get_product(&state.pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{id}/details",
    params(("id" = i64, Path, description = "Game id in the metadata service")),
    responses(
        (status = 200, description = "Game metadata", body = ApiResponse<GameDetails>),
        (status = 502, description = "Metadata service failed")
    ),
    tag = "Metadata"
)]
pub async fn game_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<GameDetails>>> {
    let details = state.metadata.game_details(id).await?;
    Ok(Json(ApiResponse::success("Game details", details, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/catalog/popular",
    responses(
        (status = 200, description = "Popular games from the metadata service", body = ApiResponse<Vec<PopularGame>>),
        (status = 502, description = "Metadata service failed")
    ),
    tag = "Metadata"
)]
pub async fn popular_games(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PopularGame>>>> {
    let games = state.metadata.popular().await?;
    let meta = Meta::listing(games.len(), None);
    Ok(Json(ApiResponse::success("Popular games", games, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/catalog/external",
    params(ExternalQuery),
    responses(
        (status = 200, description = "External game search with placeholder prices", body = ApiResponse<ExternalGameList>)
    ),
    tag = "Metadata"
)]
pub async fn external_games(
    State(state): State<AppState>,
    Query(query): Query<ExternalQuery>,
) -> AppResult<Json<ApiResponse<ExternalGameList>>> {
    let search = ExternalSearch::from(query);
    let list = state
        .metadata
        .search(&search)
        .await
        .map_err(|err| err.pass_through())?;
    let meta = Meta::listing(list.results.len(), None);
    Ok(Json(ApiResponse::success("External games", list, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/catalog/news",
    params(ExternalQuery),
    responses(
        (status = 200, description = "News for matching games, newest first", body = ApiResponse<NewsList>)
    ),
    tag = "Metadata"
)]
pub async fn game_news(
    State(state): State<AppState>,
    Query(query): Query<ExternalQuery>,
) -> AppResult<Json<ApiResponse<NewsList>>> {
    let search = ExternalSearch::from(query);
    let news = state
        .metadata
        .news(&search)
        .await
        .map_err(|err| err.pass_through())?;
    let meta = Meta::listing(news.count, None);
    Ok(Json(ApiResponse::success("Game news", news, Some(meta))))
}
