use actix_web::{web, App, HttpServer};
use clap::{Arg, Command};
use log::info;
use std::fs::OpenOptions;

mod handlers;
mod models;
mod services;
mod utils;

use handlers::game;
use services::orchestrator::Orchestrator;
use services::provider::StockSearchClient;

fn init_logging(log_file: Option<&String>) {
    if let Some(file) = log_file {
        let log_output = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .expect("Failed to open log file");

        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(log_output)))
            .init();
    } else {
        env_logger::init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let matches = Command::new("photoguessd")
        .version("0.1")
        .about("Stock-photo title guessing game service")
        .arg(
            Arg::new("listen-host")
                .long("listen-host")
                .num_args(1)
                .default_value("0.0.0.0:8350")
                .help("Specify the listen address (e.g., 0.0.0.0:8350)"),
        )
        .arg(
            Arg::new("api-base-url")
                .long("api-base-url")
                .num_args(1)
                .default_value("https://api.shutterstock.com/v2")
                .help("Base URL of the image search API"),
        )
        .arg(
            Arg::new("api-token")
                .long("api-token")
                .num_args(1)
                .help("Bearer token for the image search API (falls back to the IMAGE_API_TOKEN environment variable)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .num_args(1)
                .help("Specify a log file path (if omitted, logs to stderr)"),
        )
        .get_matches();

    let listen_host = matches
        .get_one::<String>("listen-host")
        .expect("listen-host argument must always have a default value")
        .clone();
    let base_url = matches
        .get_one::<String>("api-base-url")
        .expect("api-base-url argument must always have a default value")
        .clone();
    let log_file = matches.get_one::<String>("log-file");
    let api_token = matches
        .get_one::<String>("api-token")
        .cloned()
        .or_else(|| std::env::var("IMAGE_API_TOKEN").ok())
        .expect("An API token must be provided via --api-token or IMAGE_API_TOKEN");

    init_logging(log_file);

    info!("Using image search API at {}", base_url);
    let provider = StockSearchClient::new(base_url, api_token);
    let orchestrator = web::Data::new(Orchestrator::new(provider));

    info!("Listening on {}", listen_host);
    HttpServer::new(move || {
        App::new()
            .app_data(orchestrator.clone())
            .service(game::start_game)
            .service(game::new_game)
            .service(game::submit_guess)
            .service(game::forfeit_game)
            .service(game::report_image_error)
            .service(game::game_state)
    })
    .bind(&listen_host)?
    .run()
    .await
}
