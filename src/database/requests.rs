use rocket::serde::json::{Json, Value};
use rocket::serde::Serialize;
use rocket::*;

use super::*;

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: ScoreId,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoresResponse {
    pub scores: Vec<ScoreRecord>,
}

#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// One leaderboard line: the stored row plus its 1-based position.
#[derive(Serialize, Debug)]
#[serde(crate = "rocket::serde")]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: LeaderboardRow,
}

/// Validates a submitted game result and appends it to the store.
/// Returns the generated id on success.
#[post("/scores", format = "json", data = "<data>")]
pub async fn submit_score(
    data: Json<Value>,
    store: &State<ScoreStore>,
) -> RequestResult<(http::Status, Json<SubmitResponse>)> {
    // Validate into a typed record before touching storage
    let new_score = NewScore::from_json(&data)?;

    let id = store.insert(&new_score).await?;

    Ok((
        http::Status::Created,
        Json(SubmitResponse {
            success: true,
            message: "Score saved successfully",
            id,
        }),
    ))
}

/// Fetches stored scores, best first, optionally filtered by difficulty.
#[get("/scores?<difficulty>&<limit>", format = "json")]
pub async fn get_scores(
    difficulty: Option<String>,
    limit: Option<i64>,
    store: &State<ScoreStore>,
) -> RequestResult<Json<ScoresResponse>> {
    let scores = store
        .query_all(difficulty.as_deref(), limit.unwrap_or(50))
        .await?;

    Ok(Json(ScoresResponse { scores }))
}

/// Fetches the ranked leaderboard. `difficulty=all` (the default) means no
/// filter; any other value restricts the board to that difficulty.
#[get("/leaderboard?<difficulty>&<limit>", format = "json")]
pub async fn get_leaderboard(
    difficulty: Option<String>,
    limit: Option<i64>,
    store: &State<ScoreStore>,
) -> RequestResult<Json<LeaderboardResponse>> {
    let difficulty = difficulty.unwrap_or_else(|| "all".to_owned());
    let filter = match difficulty.as_str() {
        "all" => None,
        other => Some(other),
    };

    let rows = store.query_top(filter, limit.unwrap_or(10)).await?;

    let leaderboard = rows
        .into_iter()
        .enumerate()
        .map(|(index, entry)| LeaderboardEntry {
            rank: index + 1,
            entry,
        })
        .collect();

    Ok(Json(LeaderboardResponse { leaderboard }))
}

/// Fetches aggregate statistics over all recorded games.
#[get("/stats", format = "json")]
pub async fn get_stats(store: &State<ScoreStore>) -> RequestResult<Json<GameStats>> {
    let stats = store.aggregate_stats().await?;
    Ok(Json(stats))
}
