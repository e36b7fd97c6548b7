use std::collections::HashMap;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

mod request_error;
pub mod requests;
mod score;

pub use request_error::{RequestError, RequestResult};
pub use score::{GameStats, LeaderboardRow, NewScore, ScoreRecord};

pub type ScoreId = i64;

/// Append-only storage for game session results.
///
/// The database URL is supplied at construction, so every caller (the server,
/// each test) owns a distinct store instance.
pub struct ScoreStore {
    pool: SqlitePool,
}

impl ScoreStore {
    /// Opens the SQLite database at `database_url`, creating the file if it
    /// does not exist yet.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // SQLite permits a single writer; one pooled connection keeps writes
        // serialized and makes in-memory databases usable from tests.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Ensures the `scores` table exists. Idempotent: existing rows survive
    /// repeated calls.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                team_name TEXT NOT NULL,
                score INTEGER NOT NULL,
                landmarks_saved INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                game_duration INTEGER DEFAULT 60
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts one result row, stamping the server-side timestamp, and
    /// returns the generated id.
    pub async fn insert(&self, new_score: &NewScore) -> Result<ScoreId, sqlx::Error> {
        let timestamp = current_timestamp();

        let result = sqlx::query(
            "INSERT INTO scores (team_name, score, landmarks_saved, difficulty, timestamp, game_duration)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_score.team_name)
        .bind(new_score.score)
        .bind(new_score.landmarks_saved)
        .bind(&new_score.difficulty)
        .bind(&timestamp)
        .bind(new_score.game_duration)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetches stored results ordered by score, most recent first among ties,
    /// optionally restricted to a single difficulty.
    pub async fn query_all(
        &self,
        difficulty: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ScoreRecord>, sqlx::Error> {
        let rows = match difficulty {
            Some(difficulty) => {
                sqlx::query(
                    "SELECT id, team_name, score, landmarks_saved, difficulty, timestamp, game_duration
                     FROM scores
                     WHERE difficulty = ?
                     ORDER BY score DESC, timestamp DESC
                     LIMIT ?",
                )
                .bind(difficulty)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, team_name, score, landmarks_saved, difficulty, timestamp, game_duration
                     FROM scores
                     ORDER BY score DESC, timestamp DESC
                     LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(score_record_from_row).collect()
    }

    /// Fetches the top results by score for leaderboard display. Rank is
    /// assigned positionally by the caller.
    pub async fn query_top(
        &self,
        difficulty: Option<&str>,
        limit: i64,
    ) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
        let rows = match difficulty {
            Some(difficulty) => {
                sqlx::query(
                    "SELECT team_name, score, landmarks_saved, difficulty, timestamp
                     FROM scores
                     WHERE difficulty = ?
                     ORDER BY score DESC
                     LIMIT ?",
                )
                .bind(difficulty)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT team_name, score, landmarks_saved, difficulty, timestamp
                     FROM scores
                     ORDER BY score DESC
                     LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(leaderboard_row_from_row).collect()
    }

    /// Computes summary statistics over the whole table.
    pub async fn aggregate_stats(&self) -> Result<GameStats, sqlx::Error> {
        let totals = sqlx::query(
            "SELECT COUNT(*) AS total_games,
                    AVG(score) AS average_score,
                    MAX(score) AS highest_score,
                    SUM(landmarks_saved) AS total_landmarks
             FROM scores",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_games = totals.try_get::<i64, _>("total_games")?;
        let average_score = totals
            .try_get::<Option<f64>, _>("average_score")?
            .unwrap_or(0.0);
        let highest_score = totals
            .try_get::<Option<i64>, _>("highest_score")?
            .unwrap_or(0);
        let total_landmarks_saved = totals
            .try_get::<Option<i64>, _>("total_landmarks")?
            .unwrap_or(0);

        let by_difficulty = sqlx::query(
            "SELECT difficulty, COUNT(*) AS count
             FROM scores
             GROUP BY difficulty",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut games_by_difficulty = HashMap::new();
        for row in &by_difficulty {
            games_by_difficulty.insert(
                row.try_get::<String, _>("difficulty")?,
                row.try_get::<i64, _>("count")?,
            );
        }

        Ok(GameStats {
            total_games,
            average_score: (average_score * 10.0).round() / 10.0,
            highest_score,
            total_landmarks_saved,
            games_by_difficulty,
        })
    }
}

/// Server receipt time as an ISO-8601 string; client-supplied times are
/// never stored.
fn current_timestamp() -> String {
    chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn score_record_from_row(row: &SqliteRow) -> Result<ScoreRecord, sqlx::Error> {
    Ok(ScoreRecord {
        id: row.try_get("id")?,
        team_name: row.try_get("team_name")?,
        score: row.try_get("score")?,
        landmarks_saved: row.try_get("landmarks_saved")?,
        difficulty: row.try_get("difficulty")?,
        timestamp: row.try_get("timestamp")?,
        game_duration: row.try_get("game_duration")?,
    })
}

fn leaderboard_row_from_row(row: &SqliteRow) -> Result<LeaderboardRow, sqlx::Error> {
    Ok(LeaderboardRow {
        team_name: row.try_get("team_name")?,
        score: row.try_get("score")?,
        landmarks_saved: row.try_get("landmarks_saved")?,
        difficulty: row.try_get("difficulty")?,
        timestamp: row.try_get("timestamp")?,
    })
}
