use crate::{
    db::DbPool,
    dto::products::ProductList,
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{SearchQuery, TopQuery},
};

const PRODUCT_COLUMNS: &str = "id, title, price, platforms, image, popularity, is_subscription";

pub async fn list_products(pool: &DbPool) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> =
        sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(pool)
            .await?;

    let meta = Meta::listing(items.len(), None);
    Ok(ApiResponse::success("Products", ProductList(items), Some(meta)))
}

/// Typeahead search on the title. A blank term answers with an empty list without querying.
pub async fn search_products(
    pool: &DbPool,
    query: &SearchQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let limit = query.limit();
    let Some(term) = query.term() else {
        return Ok(ApiResponse::success(
            "Search results",
            ProductList(Vec::new()),
            Some(Meta::listing(0, Some(limit))),
        ));
    };

    let pattern = format!("%{}%", escape_like(term));
    let items: Vec<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE title ILIKE $1 \
         ORDER BY popularity DESC NULLS LAST, id ASC \
         LIMIT $2"
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let meta = Meta::listing(items.len(), Some(limit));
    Ok(ApiResponse::success("Search results", ProductList(items), Some(meta)))
}

pub async fn top_products(pool: &DbPool, query: &TopQuery) -> AppResult<ApiResponse<ProductList>> {
    let limit = query.limit();
    let items: Vec<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         ORDER BY popularity DESC NULLS LAST, id ASC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let meta = Meta::listing(items.len(), Some(limit));
    Ok(ApiResponse::success("Top products", ProductList(items), Some(meta)))
}

pub async fn subscription_products(pool: &DbPool) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_subscription ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    let meta = Meta::listing(items.len(), None);
    Ok(ApiResponse::success("Subscriptions", ProductList(items), Some(meta)))
}

pub async fn random_product(pool: &DbPool) -> AppResult<Option<Product>> {
    let product = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY RANDOM() LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

pub async fn recommended_product(pool: &DbPool) -> AppResult<ApiResponse<Product>> {
    let product = random_product(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Catalog is empty"))?;
    Ok(ApiResponse::success("Recommendation", product, Some(Meta::empty())))
}

pub async fn get_product(pool: &DbPool, id: i64) -> AppResult<ApiResponse<Product>> {
    let product: Product =
        sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(ApiResponse::success("Product", product, Some(Meta::empty())))
}

/// `%` and `_` typed by the user match themselves.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
