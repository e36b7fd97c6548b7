use std::collections::HashMap;

use rocket::serde::json::Value;
use rocket::serde::{Deserialize, Serialize};

use super::{RequestError, ScoreId};

pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const DEFAULT_GAME_DURATION: i64 = 60;

/// One persisted game session result.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: ScoreId,
    pub team_name: String,
    pub score: i64,
    pub landmarks_saved: i64,
    pub difficulty: String,
    pub timestamp: String,
    pub game_duration: i64,
}

/// A fully validated submission, ready for insertion. The timestamp is
/// stamped by the store, not carried here.
#[derive(Clone, PartialEq, Debug)]
pub struct NewScore {
    pub team_name: String,
    pub score: i64,
    pub landmarks_saved: i64,
    pub difficulty: String,
    pub game_duration: i64,
}

impl NewScore {
    /// Validates a raw JSON submission body into a typed record.
    ///
    /// Every malformed input is rejected here, before anything reaches
    /// storage: missing required fields, non-string team names, and values
    /// that cannot be read as integers all name the offending field.
    pub fn from_json(data: &Value) -> Result<Self, RequestError> {
        let team_name = match data.get("teamName") {
            None => return Err(RequestError::MissingField { field: "teamName" }),
            Some(value) => value
                .as_str()
                .filter(|name| !name.is_empty())
                .ok_or(RequestError::InvalidField { field: "teamName" })?
                .to_owned(),
        };

        let score = required_int(data, "score")?;
        let landmarks_saved = required_int(data, "landmarksSaved")?;
        let difficulty = optional_string(data, "difficulty", DEFAULT_DIFFICULTY)?;
        let game_duration = optional_int(data, "gameDuration", DEFAULT_GAME_DURATION)?;

        Ok(Self {
            team_name,
            score,
            landmarks_saved,
            difficulty,
            game_duration,
        })
    }
}

/// A leaderboard row as stored; rank is attached by the request layer.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub team_name: String,
    pub score: i64,
    pub landmarks_saved: i64,
    pub difficulty: String,
    pub timestamp: String,
}

/// Summary metrics computed over all stored results at query time.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct GameStats {
    pub total_games: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub total_landmarks_saved: i64,
    pub games_by_difficulty: HashMap<String, i64>,
}

fn required_int(data: &Value, field: &'static str) -> Result<i64, RequestError> {
    let value = data
        .get(field)
        .ok_or(RequestError::MissingField { field })?;
    coerce_int(value).ok_or(RequestError::InvalidField { field })
}

fn optional_int(data: &Value, field: &'static str, default: i64) -> Result<i64, RequestError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => coerce_int(value).ok_or(RequestError::InvalidField { field }),
    }
}

fn optional_string(
    data: &Value,
    field: &'static str,
    default: &str,
) -> Result<String, RequestError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(default.to_owned()),
        Some(value) => value
            .as_str()
            .map(str::to_owned)
            .ok_or(RequestError::InvalidField { field }),
    }
}

/// Reads a JSON value as an integer: numbers directly (floats truncate),
/// numeric strings via parsing.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
