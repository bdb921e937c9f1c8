//! Prints the newest readings from a sensor API, normalized, one JSON object per line.
//!
//! Usage: `client [limit]`. The server is taken from `API_BASE_URL`.
use std::env;
use std::process::ExitCode;

use awc::Client;
use log::error;

use library::{api_client, Config};

#[actix_web::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let limit = match env::args().nth(1).map(|s| s.parse::<i64>()) {
        None => None,
        Some(Ok(n)) => Some(n),
        Some(Err(_)) => {
            error!("usage: client [limit]");
            return ExitCode::from(2);
        }
    };

    let client = Client::default();
    match api_client::fetch_latest(&client, &cfg.api_base_url, limit).await {
        Ok(readings) => {
            for rd in readings {
                match serde_json::to_string(&rd) {
                    Ok(line) => println!("{}", line),
                    Err(e) => {
                        error!("could not encode reading {}: {}", rd.id, e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("fetching from {} failed: {}", cfg.api_base_url, e);
            ExitCode::FAILURE
        }
    }
}
