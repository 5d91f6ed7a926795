//! `fleetdesk-console` -- headless listing inspector.
//!
//! Loads one listing through the owner API, binds its trip destination list,
//! places it on a logged map, and prints the resulting report as JSON.
//!
//! # Environment variables
//!
//! | Variable                         | Required | Default                 | Description                          |
//! |----------------------------------|----------|-------------------------|--------------------------------------|
//! | `FLEETDESK_BASE_URL`             | no       | `http://localhost:5000` | Backend origin                       |
//! | `FLEETDESK_LISTING_URL`          | yes      | --                      | Listing detail URL, e.g. `/owner/cars/7/data` |
//! | `FLEETDESK_CITIES_FILE`          | no       | --                      | JSON array of cities for geocoding   |
//! | `FLEETDESK_DESTINATIONS`         | no       | `[]`                    | JSON array of destination seeds      |
//! | `FLEETDESK_REQUEST_TIMEOUT_SECS` | no       | `30`                    | HTTP request timeout                 |

use fleetdesk_console::config::ConsoleConfig;
use fleetdesk_console::inspect;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetdesk_console=info,fleetdesk_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ConsoleConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        base_url = %config.base_url,
        listing_url = %config.listing_url,
        destinations = config.destinations.len(),
        "Starting fleetdesk-console",
    );

    let report = match inspect::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Inspection failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report");
            std::process::exit(1);
        }
    }
}
