//! Movie CRUD through the full pipeline, including the optimistic
//! concurrency contract on updates.

mod common;

use axum::http::{StatusCode, header};
use common::*;
use reelvault_core::permissions;
use serde_json::json;
use uuid::Uuid;

fn editor(app: &TestApp) -> String {
    let user = app.seed_user(
        "editor@example.com",
        "pa55word1",
        true,
        &[permissions::MOVIES_READ, permissions::MOVIES_WRITE],
    );
    app.issue_token(user.id)
}

fn valid_movie() -> serde_json::Value {
    json!({
        "title": "Casablanca",
        "year": 1942,
        "runtime": "102 mins",
        "genres": ["drama", "romance"],
    })
}

// Create ----------------------------------------------------------------------

#[tokio::test]
async fn create_movie_returns_201_with_location() {
    let app = test_app();
    let token = editor(&app);

    let response = send(
        app.router(),
        post_json_with_token("/v1/movies", &valid_movie(), &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    assert!(location.starts_with("/v1/movies/"));

    let body = body_json(response).await;
    assert_eq!(body["title"], "Casablanca");
    assert_eq!(body["runtime"], "102 mins");
    assert_eq!(body["version"], 1);
    assert!(body.get("created_at").is_none());
}

#[tokio::test]
async fn create_movie_with_empty_title_is_422() {
    let app = test_app();
    let token = editor(&app);

    let mut movie = valid_movie();
    movie["title"] = json!("");

    let response = send(
        app.router(),
        post_json_with_token("/v1/movies", &movie, &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["title"], "must be between 1 and 500 characters");
}

#[tokio::test]
async fn create_movie_with_ancient_year_is_422() {
    let app = test_app();
    let token = editor(&app);

    let mut movie = valid_movie();
    movie["year"] = json!(1500);

    let response = send(
        app.router(),
        post_json_with_token("/v1/movies", &movie, &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_movie_with_garbage_body_is_400() {
    let app = test_app();
    let token = editor(&app);

    let request = axum::http::Request::post("/v1/movies")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(axum::body::Body::from("{\"title\": \"x\"a"))
        .unwrap();
    let response = send(app.router(), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// Show ------------------------------------------------------------------------

#[tokio::test]
async fn show_movie_returns_the_record() {
    let app = test_app();
    let token = editor(&app);
    let movie = app.seed_movie("Alien", 1979, 117, &["horror", "sci-fi"]);

    let response = send(
        app.router(),
        get_with_token(&format!("/v1/movies/{}", movie.id), &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Alien");
    assert_eq!(body["runtime"], "117 mins");
}

#[tokio::test]
async fn show_unknown_movie_is_404() {
    let app = test_app();
    let token = editor(&app);

    let response = send(
        app.router(),
        get_with_token(&format!("/v1/movies/{}", Uuid::new_v4()), &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "the requested resource could not be found");
}

#[tokio::test]
async fn unparseable_ids_read_as_not_found() {
    let app = test_app();
    let token = editor(&app);
    let router = app.router();

    for id in ["foo", "-1", "1.23", "cupcake1"] {
        let response = send(
            router.clone(),
            get_with_token(&format!("/v1/movies/{id}"), &token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "id {id}");
    }
}

// Update ----------------------------------------------------------------------

#[tokio::test]
async fn partial_update_merges_and_bumps_version() {
    let app = test_app();
    let token = editor(&app);
    let movie = app.seed_movie("Alien", 1979, 117, &["horror"]);

    let response = send(
        app.router(),
        patch_json_with_token(
            &format!("/v1/movies/{}", movie.id),
            r#"{"title":"Aliens"}"#,
            &token,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Aliens");
    assert_eq!(body["year"], 1979);
    assert_eq!(body["version"], 2);

    let stored = app.movies.stored(movie.id).unwrap();
    assert_eq!(stored.title, "Aliens");
    assert_eq!(stored.version, 2);
}

#[tokio::test]
async fn stale_version_is_a_409_and_leaves_the_record_unchanged() {
    let app = test_app();
    let token = editor(&app);
    let movie = app.seed_movie("Alien", 1979, 117, &["horror"]);
    app.movies.mark_conflict(movie.id);

    let response = send(
        app.router(),
        patch_json_with_token(
            &format!("/v1/movies/{}", movie.id),
            r#"{"title":"Aliens"}"#,
            &token,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "unable to update the record due to an edit conflict, please try again"
    );

    let stored = app.movies.stored(movie.id).unwrap();
    assert_eq!(stored.title, "Alien");
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn update_with_invalid_body_is_400() {
    let app = test_app();
    let token = editor(&app);
    let movie = app.seed_movie("Alien", 1979, 117, &["horror"]);

    let response = send(
        app.router(),
        patch_json_with_token(&format!("/v1/movies/{}", movie.id), "invalid json", &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_failing_validation_is_422() {
    let app = test_app();
    let token = editor(&app);
    let movie = app.seed_movie("Alien", 1979, 117, &["horror"]);

    let response = send(
        app.router(),
        patch_json_with_token(
            &format!("/v1/movies/{}", movie.id),
            r#"{"title":"","year":1337,"runtime":"-5 mins","genres":["c","c"]}"#,
            &token,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_with_bad_id_is_404_even_with_a_bad_body() {
    let app = test_app();
    let token = editor(&app);

    let response = send(
        app.router(),
        patch_json_with_token("/v1/movies/cupcake1", "invalid json", &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_of_missing_movie_is_404() {
    let app = test_app();
    let token = editor(&app);

    let response = send(
        app.router(),
        patch_json_with_token(
            &format!("/v1/movies/{}", Uuid::new_v4()),
            r#"{"title":"Aliens"}"#,
            &token,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Delete ----------------------------------------------------------------------

#[tokio::test]
async fn delete_movie_then_404_on_repeat() {
    let app = test_app();
    let token = editor(&app);
    let movie = app.seed_movie("Alien", 1979, 117, &["horror"]);
    let uri = format!("/v1/movies/{}", movie.id);

    let first = send(app.router(), delete_with_token(&uri, &token)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = body_json(first).await;
    assert_eq!(body["message"], "movie successfully deleted");
    assert!(app.movies.stored(movie.id).is_none());

    let second = send(app.router(), delete_with_token(&uri, &token)).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

// List ------------------------------------------------------------------------

#[tokio::test]
async fn list_movies_returns_records_and_metadata() {
    let app = test_app();
    let token = editor(&app);
    app.seed_movie("Alien", 1979, 117, &["horror"]);
    app.seed_movie("Heat", 1995, 170, &["crime"]);
    app.seed_movie("Casablanca", 1942, 102, &["drama"]);

    let response = send(app.router(), get_with_token("/v1/movies", &token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["movies"].as_array().unwrap().len(), 3);
    assert_eq!(body["metadata"]["total_records"], 3);
    assert_eq!(body["metadata"]["current_page"], 1);
    assert_eq!(body["metadata"]["page_size"], 20);
}

#[tokio::test]
async fn list_with_non_numeric_page_size_is_422() {
    let app = test_app();
    let token = editor(&app);

    let response = send(
        app.router(),
        get_with_token("/v1/movies?page_size=haha", &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["page_size"], "must be an integer value");
}

#[tokio::test]
async fn list_with_bad_filters_collects_all_errors() {
    let app = test_app();
    let token = editor(&app);

    let response = send(
        app.router(),
        get_with_token("/v1/movies?page_size=5000&sort=cake", &token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["page_size"], "must be between 1 and 100");
    assert_eq!(body["error"]["sort"], "invalid sort value");
}
