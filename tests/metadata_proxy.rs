mod common;

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use common::{get as get_req, lazy_state, send};
use serde_json::json;

async fn game(Path(id): Path<i64>, Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("key").map(String::as_str) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, "missing key").into_response();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#).into_response();
    }
    Json(json!({
        "id": id,
        "name": "Portal 2",
        "description": "<p>Puzzles</p>",
        "description_raw": "Puzzles",
        "genres": [{ "name": "Puzzle" }, { "name": "Shooter" }],
        "platforms": [{ "platform": { "name": "PC" } }, { "platform": { "name": "Xbox 360" } }],
        "rating": 4.61,
        "background_image": "https://media.example/portal2.jpg"
    }))
    .into_response()
}

async fn games(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("search").map(String::as_str) == Some("throttle") {
        return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
    }
    let ordered = params.get("ordering").map(String::as_str) == Some("-added");
    let page_size = params
        .get("page_size")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(12);
    let results: Vec<_> = (1..=12)
        .take(page_size)
        .map(|i| {
            let mut game = json!({
                "id": i,
                "name": if ordered { format!("Popular {i}") } else { format!("Game {i}") },
                "slug": format!("game-{i}"),
                "rating": 4.0,
                "released": "2020-01-01",
                "background_image": format!("https://media.example/{i}.jpg"),
                "platforms": [{ "platform": { "name": "PC" } }]
            });
            if i == 3 {
                game["updated"] = json!("2022-03-01T08:00:00");
            }
            game
        })
        .collect();
    Json(json!({ "count": 1234, "results": results })).into_response()
}

async fn game_news(Path(slug): Path<String>) -> Response {
    match slug.as_str() {
        "game-1" => Json(json!({
            "results": [
                {
                    "title": "Patch notes",
                    "excerpt": "Balance changes",
                    "url": "https://news.example/patch",
                    "published_at": "2021-06-01T10:00:00Z",
                    "source": "example_press"
                },
                { "date": "2019-05-05", "description": "Launch trailer" }
            ]
        }))
        .into_response(),
        "game-2" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(json!({ "results": [] })).into_response(),
    }
}

async fn spawn_upstream() -> anyhow::Result<String> {
    let upstream = Router::new()
        .route("/games", get(games))
        .route("/games/{id}", get(game))
        .route("/games/{id}/news", get(game_news));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn details_are_reshaped() -> anyhow::Result<()> {
    let upstream = spawn_upstream().await?;
    let app = common::app(lazy_state(&upstream)?);

    let (status, body) = send(&app, get_req("/api/catalog/4200/details", None)).await?;

    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["id"], 4200);
    assert_eq!(data["name"], "Portal 2");
    assert_eq!(data["description"], "Puzzles");
    assert_eq!(data["genres"], json!(["Puzzle", "Shooter"]));
    assert_eq!(data["platforms"], json!(["PC", "Xbox 360"]));
    assert_eq!(data["image"], "https://media.example/portal2.jpg");
    Ok(())
}

#[tokio::test]
async fn upstream_failure_on_details_is_502_with_body() -> anyhow::Result<()> {
    let upstream = spawn_upstream().await?;
    let app = common::app(lazy_state(&upstream)?);

    let (status, body) = send(&app, get_req("/api/catalog/404/details", None)).await?;

    assert_eq!(status, 502);
    assert!(
        body["data"]["details"]
            .as_str()
            .unwrap_or_default()
            .contains("Not found.")
    );
    Ok(())
}

#[tokio::test]
async fn popular_asks_for_most_added_and_keeps_ten() -> anyhow::Result<()> {
    let upstream = spawn_upstream().await?;
    let app = common::app(lazy_state(&upstream)?);

    let (status, body) = send(&app, get_req("/api/catalog/popular", None)).await?;

    assert_eq!(status, 200);
    let games = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(games.len(), 10);
    assert_eq!(games[0]["name"], "Popular 1");
    assert_eq!(games[0]["released"], "2020-01-01");
    Ok(())
}

#[tokio::test]
async fn external_search_synthesizes_prices() -> anyhow::Result<()> {
    let upstream = spawn_upstream().await?;
    let app = common::app(lazy_state(&upstream)?);

    let (status, body) = send(
        &app,
        get_req("/api/catalog/external?search=zelda&page=2&page_size=5", None),
    )
    .await?;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["count"], 1234);
    let first = &body["data"]["results"][0];
    assert_eq!(first["title"], "Game 1");
    assert_eq!(first["price"], 38.0);
    assert_eq!(first["slug"], "game-1");
    assert_eq!(first["platforms"], json!(["PC"]));
    Ok(())
}

#[tokio::test]
async fn external_search_passes_upstream_status_through() -> anyhow::Result<()> {
    let upstream = spawn_upstream().await?;
    let app = common::app(lazy_state(&upstream)?);

    let (status, body) = send(&app, get_req("/api/catalog/external?search=throttle", None)).await?;

    assert_eq!(status, 429);
    assert_eq!(body["data"]["details"], "slow down");
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_a_bad_gateway() -> anyhow::Result<()> {
    let app = common::app(lazy_state("http://127.0.0.1:1")?);

    let (status, body) = send(&app, get_req("/api/catalog/popular", None)).await?;

    assert_eq!(status, 502);
    assert_eq!(body["data"]["error"], "Upstream Error");
    Ok(())
}

#[tokio::test]
async fn news_merges_articles_and_fallbacks_newest_first() -> anyhow::Result<()> {
    let upstream = spawn_upstream().await?;
    let app = common::app(lazy_state(&upstream)?);

    let (status, body) = send(&app, get_req("/api/catalog/news?search=news&page_size=3", None)).await?;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["count"], 4);
    let results = body["data"]["results"].as_array().cloned().unwrap_or_default();
    let titles: Vec<&str> = results
        .iter()
        .map(|a| a["title"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Game 3 is in the spotlight",
            "Patch notes",
            "Game 2 is in the spotlight",
            "Game 1 news",
        ]
    );

    assert_eq!(results[0]["source"], "rawg_fallback");
    assert_eq!(results[0]["url"], "https://rawg.io/games/game-3");
    assert_eq!(results[1]["source"], "example_press");
    assert_eq!(results[2]["excerpt"], "Released on 2020-01-01");
    assert_eq!(results[3]["excerpt"], "Launch trailer");
    assert_eq!(results[3]["image"], "https://media.example/1.jpg");
    assert_eq!(results[3]["source"], "rawg_news");
    Ok(())
}

#[tokio::test]
async fn news_passes_search_failure_status_through() -> anyhow::Result<()> {
    let upstream = spawn_upstream().await?;
    let app = common::app(lazy_state(&upstream)?);

    let (status, body) = send(&app, get_req("/api/catalog/news?search=throttle", None)).await?;

    assert_eq!(status, 429);
    assert_eq!(body["data"]["details"], "slow down");
    Ok(())
}
