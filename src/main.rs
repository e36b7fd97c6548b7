use rocket::fs::{relative, FileServer};
use rocket::*;

use database::ScoreStore;

mod cors;
mod database;
mod pages;
#[cfg(test)]
mod tests;

const DEFAULT_DATABASE_URL: &str = "sqlite:game_scores.db";
const DEFAULT_PORT: u16 = 8002;

#[launch]
async fn rocket() -> _ {
    // Connect to the score database
    dotenv::dotenv().ok();
    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

    let store = ScoreStore::connect(&database_url)
        .await
        .expect("failed to connect to the score database");
    store
        .init()
        .await
        .expect("failed to initialize the scores table");
    ::log::info!("score store ready at {}", database_url);

    let port = dotenv::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    build_rocket(store, port)
}

/// Builds the rocket around an already-connected score store.
fn build_rocket(store: ScoreStore, port: u16) -> Rocket<Build> {
    let figment = Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .mount(
            "/api",
            routes![
                database::requests::submit_score,
                database::requests::get_scores,
                database::requests::get_leaderboard,
                database::requests::get_stats,
            ],
        )
        .mount("/", routes![pages::leaderboard_page, cors::preflight])
        .mount("/", FileServer::from(relative!("static")))
        .attach(cors::Cors)
        .manage(store)
}
