use rocket::http::Status;
use rocket::local::asynchronous::{Client, LocalResponse};
use rocket::serde::json::{json, Value};

use crate::database::ScoreStore;

/// Spawns a client over a fresh in-memory store, so every test starts empty.
async fn spawn_client() -> Client {
    let store = ScoreStore::connect("sqlite::memory:")
        .await
        .expect("valid in-memory database");
    store.init().await.expect("schema initialization");

    Client::tracked(crate::build_rocket(store, crate::DEFAULT_PORT))
        .await
        .expect("valid rocket instance")
}

async fn deserialize_response<'a, T: rocket::serde::DeserializeOwned>(
    response: LocalResponse<'a>,
) -> rocket::serde::json::serde_json::Result<T> {
    let string = response.into_string().await.unwrap();
    rocket::serde::json::serde_json::from_str(&string)
}

/// Submits a score and returns the response.
async fn submit_score<'a>(client: &'a Client, body: &Value) -> LocalResponse<'a> {
    client.post("/api/scores").json(body).dispatch().await
}

/// Submits a score that is expected to be accepted and returns its new id.
async fn submit_score_ok(client: &Client, body: &Value) -> i64 {
    let response = submit_score(client, body).await;
    assert_eq!(response.status(), Status::Created);

    let body: Value = deserialize_response(response).await.unwrap();
    assert_eq!(body["success"], json!(true));
    body["id"].as_i64().expect("generated id")
}

/// Fetches a JSON endpoint and returns the deserialized body.
async fn get_json(client: &Client, uri: &str) -> Value {
    let response = client.get(uri).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    deserialize_response(response).await.unwrap()
}

fn alpha() -> Value {
    json!({ "teamName": "Alpha", "score": 100, "landmarksSaved": 5, "difficulty": "easy" })
}

fn beta() -> Value {
    json!({ "teamName": "Beta", "score": 200, "landmarksSaved": 8, "difficulty": "hard" })
}

/// Submits two scores and checks ids, ordering, and stored fields
#[rocket::async_test]
async fn submit_and_list_scores() {
    let client = spawn_client().await;

    assert_eq!(submit_score_ok(&client, &alpha()).await, 1);
    assert_eq!(submit_score_ok(&client, &beta()).await, 2);

    let body = get_json(&client, "/api/scores").await;
    let scores = body["scores"].as_array().unwrap();
    assert_eq!(scores.len(), 2);

    // Ordered by score descending
    assert_eq!(scores[0]["teamName"], json!("Beta"));
    assert_eq!(scores[0]["score"], json!(200));
    assert_eq!(scores[0]["id"], json!(2));
    assert_eq!(scores[1]["teamName"], json!("Alpha"));
    assert_eq!(scores[1]["gameDuration"], json!(60));
    assert!(scores[1]["timestamp"].as_str().is_some());
}

/// Generated ids keep increasing across submissions
#[rocket::async_test]
async fn ids_are_monotonic() {
    let client = spawn_client().await;

    let mut last_id = 0;
    for score in [30, 10, 20] {
        let body = json!({ "teamName": "Team", "score": score, "landmarksSaved": 1 });
        let id = submit_score_ok(&client, &body).await;
        assert!(id > last_id);
        last_id = id;
    }
}

/// Missing required fields are rejected with the field name, and nothing is
/// inserted
#[rocket::async_test]
async fn missing_fields_are_client_errors() {
    let client = spawn_client().await;

    for field in ["teamName", "score", "landmarksSaved"] {
        let mut body = alpha();
        body.as_object_mut().unwrap().remove(field);

        let response = submit_score(&client, &body).await;
        assert_eq!(response.status(), Status::BadRequest);

        let error: Value = deserialize_response(response).await.unwrap();
        assert_eq!(
            error["error"],
            json!(format!("Missing required field: {}", field))
        );
    }

    let body = get_json(&client, "/api/scores").await;
    assert_eq!(body["scores"].as_array().unwrap().len(), 0);
}

/// Non-numeric score fields fail validation instead of reaching storage
#[rocket::async_test]
async fn malformed_fields_are_client_errors() {
    let client = spawn_client().await;

    let cases = [
        json!({ "teamName": "Alpha", "score": "not a number", "landmarksSaved": 5 }),
        json!({ "teamName": "Alpha", "score": 100, "landmarksSaved": [5] }),
        json!({ "teamName": "", "score": 100, "landmarksSaved": 5 }),
        json!({ "teamName": "Alpha", "score": 100, "landmarksSaved": 5, "gameDuration": "soon" }),
        json!({ "teamName": "Alpha", "score": 100, "landmarksSaved": 5, "difficulty": 3 }),
    ];
    let fields = ["score", "landmarksSaved", "teamName", "gameDuration", "difficulty"];

    for (body, field) in cases.iter().zip(fields) {
        let response = submit_score(&client, body).await;
        assert_eq!(response.status(), Status::BadRequest);

        let error: Value = deserialize_response(response).await.unwrap();
        assert_eq!(
            error["error"],
            json!(format!("Invalid value for field: {}", field))
        );
    }
}

/// Numeric strings coerce to integers
#[rocket::async_test]
async fn numeric_strings_coerce() {
    let client = spawn_client().await;

    let body = json!({ "teamName": "Gamma", "score": "250", "landmarksSaved": "7" });
    submit_score_ok(&client, &body).await;

    let scores = get_json(&client, "/api/scores").await;
    assert_eq!(scores["scores"][0]["score"], json!(250));
    assert_eq!(scores["scores"][0]["landmarksSaved"], json!(7));
}

/// Omitted optional fields fall back to their documented defaults
#[rocket::async_test]
async fn optional_fields_default() {
    let client = spawn_client().await;

    let body = json!({ "teamName": "Delta", "score": 40, "landmarksSaved": 2 });
    submit_score_ok(&client, &body).await;

    let scores = get_json(&client, "/api/scores").await;
    assert_eq!(scores["scores"][0]["difficulty"], json!("medium"));
    assert_eq!(scores["scores"][0]["gameDuration"], json!(60));
}

/// The leaderboard ranks by score and honors the difficulty filter
#[rocket::async_test]
async fn leaderboard_ranks_and_filters() {
    let client = spawn_client().await;

    submit_score_ok(&client, &alpha()).await;
    submit_score_ok(&client, &beta()).await;

    let body = get_json(&client, "/api/leaderboard?difficulty=all&limit=10").await;
    let leaderboard = body["leaderboard"].as_array().unwrap();
    assert_eq!(leaderboard.len(), 2);
    assert_eq!(leaderboard[0]["rank"], json!(1));
    assert_eq!(leaderboard[0]["teamName"], json!("Beta"));
    assert_eq!(leaderboard[0]["score"], json!(200));
    assert_eq!(leaderboard[1]["rank"], json!(2));
    assert_eq!(leaderboard[1]["teamName"], json!("Alpha"));

    // Filtered to one difficulty, ranks restart from 1
    let body = get_json(&client, "/api/leaderboard?difficulty=easy").await;
    let leaderboard = body["leaderboard"].as_array().unwrap();
    assert_eq!(leaderboard.len(), 1);
    assert_eq!(leaderboard[0]["rank"], json!(1));
    assert_eq!(leaderboard[0]["teamName"], json!("Alpha"));
}

/// A difficulty with no rows yields an empty list, not an error
#[rocket::async_test]
async fn unknown_difficulty_is_empty() {
    let client = spawn_client().await;

    submit_score_ok(&client, &alpha()).await;

    let body = get_json(&client, "/api/leaderboard?difficulty=nightmare").await;
    assert_eq!(body["leaderboard"].as_array().unwrap().len(), 0);

    let body = get_json(&client, "/api/scores?difficulty=nightmare").await;
    assert_eq!(body["scores"].as_array().unwrap().len(), 0);
}

/// The limit parameter caps both listings
#[rocket::async_test]
async fn limit_caps_results() {
    let client = spawn_client().await;

    for score in 1..=5 {
        let body = json!({ "teamName": "Team", "score": score, "landmarksSaved": 0 });
        submit_score_ok(&client, &body).await;
    }

    let body = get_json(&client, "/api/scores?limit=3").await;
    assert_eq!(body["scores"].as_array().unwrap().len(), 3);

    let body = get_json(&client, "/api/leaderboard?limit=2").await;
    let leaderboard = body["leaderboard"].as_array().unwrap();
    assert_eq!(leaderboard.len(), 2);
    assert_eq!(leaderboard[0]["score"], json!(5));
}

/// Stats on an empty store are all zeroes with an empty difficulty map
#[rocket::async_test]
async fn stats_on_empty_store() {
    let client = spawn_client().await;

    let stats = get_json(&client, "/api/stats").await;
    assert_eq!(stats["totalGames"], json!(0));
    assert_eq!(stats["averageScore"], json!(0.0));
    assert_eq!(stats["highestScore"], json!(0));
    assert_eq!(stats["totalLandmarksSaved"], json!(0));
    assert_eq!(stats["gamesByDifficulty"], json!({}));
}

/// Stats aggregate counts, mean, max, and per-difficulty tallies
#[rocket::async_test]
async fn stats_aggregate_submissions() {
    let client = spawn_client().await;

    submit_score_ok(&client, &alpha()).await;
    submit_score_ok(&client, &beta()).await;

    let stats = get_json(&client, "/api/stats").await;
    assert_eq!(stats["totalGames"], json!(2));
    assert_eq!(stats["averageScore"], json!(150.0));
    assert_eq!(stats["highestScore"], json!(200));
    assert_eq!(stats["totalLandmarksSaved"], json!(13));
    assert_eq!(stats["gamesByDifficulty"], json!({ "easy": 1, "hard": 1 }));
}

/// The mean is rounded to one decimal place
#[rocket::async_test]
async fn stats_round_average() {
    let client = spawn_client().await;

    for score in [1, 2] {
        let body = json!({ "teamName": "Team", "score": score, "landmarksSaved": 0 });
        submit_score_ok(&client, &body).await;
    }

    let stats = get_json(&client, "/api/stats").await;
    assert_eq!(stats["averageScore"], json!(1.5));
}

/// Equal scores list most recent first in the full scores view
#[rocket::async_test]
async fn tied_scores_list_recent_first() {
    let client = spawn_client().await;

    let first = json!({ "teamName": "Early", "score": 50, "landmarksSaved": 1 });
    let second = json!({ "teamName": "Late", "score": 50, "landmarksSaved": 1 });
    submit_score_ok(&client, &first).await;
    // Timestamps carry microsecond precision; a short pause keeps them distinct
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    submit_score_ok(&client, &second).await;

    let body = get_json(&client, "/api/scores").await;
    let scores = body["scores"].as_array().unwrap();
    assert_eq!(scores[0]["teamName"], json!("Late"));
    assert_eq!(scores[1]["teamName"], json!("Early"));
}

/// The leaderboard page is served as HTML
#[rocket::async_test]
async fn leaderboard_page_is_html() {
    let client = spawn_client().await;

    let response = client.get("/leaderboard").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().await.unwrap();
    assert!(body.contains("Leaderboard"));
}

/// Schema initialization is idempotent and preserves existing rows
#[rocket::async_test]
async fn init_is_idempotent() {
    let store = ScoreStore::connect("sqlite::memory:")
        .await
        .expect("valid in-memory database");
    store.init().await.expect("first initialization");

    let id = store
        .insert(&crate::database::NewScore {
            team_name: "Keeper".to_owned(),
            score: 10,
            landmarks_saved: 1,
            difficulty: "medium".to_owned(),
            game_duration: 60,
        })
        .await
        .expect("insert");
    assert_eq!(id, 1);

    store.init().await.expect("second initialization");

    let scores = store.query_all(None, 50).await.expect("query");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].team_name, "Keeper");
}
