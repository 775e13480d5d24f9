use actix_web::{get, post, web, HttpResponse, Responder};
use log::warn;

use crate::models::{AppState, ErrorResponse, GameError, GuessRequest, GuessResponse};
use crate::services::round::{Difficulty, GuessOutcome};

fn game_error_response(err: &GameError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err {
        GameError::Network(_) => HttpResponse::BadGateway().json(body),
        GameError::EmptyResult(_) | GameError::NoUsableAsset(_) => {
            HttpResponse::NotFound().json(body)
        }
        GameError::ImageLoadFailure => HttpResponse::BadRequest().json(body),
    }
}

#[post("/game/start/{difficulty}")]
pub async fn start_game(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let raw = path.into_inner();
    let difficulty = match Difficulty::from_param(&raw) {
        Some(difficulty) => difficulty,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: format!("Unknown difficulty '{}'", raw),
            })
        }
    };

    match data.start_round(difficulty).await {
        Ok(()) => HttpResponse::Ok().json(data.view()),
        Err(err) => {
            warn!("failed to start round: {}", err);
            game_error_response(&err)
        }
    }
}

/// Start another round with the last selected difficulty.
#[post("/game/new")]
pub async fn new_game(data: web::Data<AppState>) -> impl Responder {
    match data.new_round().await {
        Ok(()) => HttpResponse::Ok().json(data.view()),
        Err(err) => {
            warn!("failed to start round: {}", err);
            game_error_response(&err)
        }
    }
}

#[post("/game/guess")]
pub async fn submit_guess(
    data: web::Data<AppState>,
    body: web::Json<GuessRequest>,
) -> impl Responder {
    let outcome = data.submit_guess(&body.word);
    let (result, message, points) = match &outcome {
        GuessOutcome::Inactive => {
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "No round is accepting guesses".to_string(),
            });
        }
        GuessOutcome::Empty => ("empty", "Please enter a word to guess!".to_string(), None),
        GuessOutcome::TooShort => (
            "too_short",
            "Word must be at least 3 characters long!".to_string(),
            None,
        ),
        GuessOutcome::AlreadyGuessed => (
            "already_guessed",
            "You already guessed this word!".to_string(),
            None,
        ),
        GuessOutcome::NotFound { word } => (
            "not_found",
            format!("\"{}\" is not in the title. Try again!", word),
            None,
        ),
        GuessOutcome::Found {
            word,
            occurrences,
            points,
            completed,
        } => {
            let mut message = format!(
                "Great! Found \"{}\" ({} time{})! +{} points",
                word,
                occurrences,
                if *occurrences > 1 { "s" } else { "" },
                points
            );
            if *completed {
                message.push_str(" Perfect! All words found! +100 completion bonus!");
            }
            ("found", message, Some(*points))
        }
    };

    HttpResponse::Ok().json(GuessResponse {
        result,
        message,
        points,
        game: data.view(),
    })
}

#[post("/game/forfeit")]
pub async fn forfeit_game(data: web::Data<AppState>) -> impl Responder {
    if data.forfeit() {
        HttpResponse::Ok().json(data.view())
    } else {
        HttpResponse::Conflict().json(ErrorResponse {
            error: "No active round to forfeit".to_string(),
        })
    }
}

/// The display reports that the image URL failed to render.
#[post("/game/image-error")]
pub async fn report_image_error(data: web::Data<AppState>) -> impl Responder {
    data.report_image_failure();
    HttpResponse::Ok().json(data.view())
}

#[get("/game")]
pub async fn game_state(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.view())
}
