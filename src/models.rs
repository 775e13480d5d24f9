use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::orchestrator::Orchestrator;
use crate::services::provider::StockSearchClient;
use crate::services::round::{Difficulty, GuessRecord, Phase, Session};
use crate::utils::format_clock;

/// Application state shared across all handlers: the orchestrator wired to
/// the live image-search client.
pub type AppState = Orchestrator<StockSearchClient>;

/// Everything that can go wrong while putting a round on screen. All four
/// kinds are non-fatal: they are reported to the display and leave the
/// session Idle, awaiting a manual new-round trigger.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("image search request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("no images returned for query '{0}'")]
    EmptyResult(String),
    #[error("image {0} has no asset url in any recognized size")]
    NoUsableAsset(String),
    #[error("the display reported an image that failed to load")]
    ImageLoadFailure,
}

/// The image shown alongside the masked title.
#[derive(Debug, Clone, Serialize)]
pub struct ImageCard {
    pub id: String,
    pub url: String,
    /// Alt text for the display; the full title, like the original page used.
    pub alt: String,
    pub contributor: String,
}

/// The full display view of the session, rendered for every state request
/// and after every command.
#[derive(Debug, Serialize)]
pub struct GameView {
    /// "idle", "active", "complete" or "forfeited".
    pub state: &'static str,
    pub score: u32,
    pub difficulty: Difficulty,
    /// Masked while the round is active, fully revealed once it is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageCard>,
    /// Time remaining formatted as M:SS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<String>,
    pub guesses: Vec<GuessRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u32>,
}

impl GameView {
    pub fn from_session(session: &Session) -> GameView {
        let Some(round) = session.round() else {
            return GameView {
                state: "idle",
                score: session.score(),
                difficulty: session.last_difficulty(),
                title: None,
                image: None,
                time_remaining: None,
                guesses: Vec::new(),
                final_score: None,
            };
        };

        let state = match round.phase() {
            Phase::Active => "active",
            Phase::Complete => "complete",
            Phase::Forfeited => "forfeited",
        };
        let terminal = round.phase() != Phase::Active;
        GameView {
            state,
            score: session.score(),
            difficulty: round.difficulty(),
            title: Some(if terminal {
                round.title().to_string()
            } else {
                round.masked_title()
            }),
            image: Some(round.card().clone()),
            time_remaining: Some(format_clock(round.remaining_secs())),
            guesses: round.history().to_vec(),
            final_score: terminal.then(|| session.score()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub word: String,
}

#[derive(Debug, Serialize)]
pub struct GuessResponse {
    /// "found", "not_found", "empty", "too_short", "already_guessed".
    pub result: &'static str,
    /// Feedback line for the player.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    pub game: GameView,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
