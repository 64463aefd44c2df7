use std::path::PathBuf;

use axum::http::{header::ORIGIN, HeaderMap, HeaderValue};
use clap::{Parser, Subcommand};
use serde_json::json;

use cors_gate::config::load_config;
use cors_gate::OriginPolicy;

#[derive(Parser)]
#[command(name = "cors-gate-cli")]
#[command(about = "Offline checks for cors-gate configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a config file and compile its CORS rules
    Validate {
        config: PathBuf,
    },
    /// Show the decision for a route and origin
    Check {
        config: PathBuf,

        #[arg(short, long)]
        route: String,

        /// Origin header value; omit to simulate a same-origin request
        #[arg(short, long)]
        origin: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => {
            let config = load_config(&config)?;
            let rules = config.cors.rules.as_ref().map(Vec::len);
            let summary = json!({
                "valid": true,
                "configured": rules.is_some(),
                "rules": rules.unwrap_or(0),
                "default_route": config.cors.default_route,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Check {
            config,
            route,
            origin,
        } => {
            let config = load_config(&config)?;
            let policy = OriginPolicy::new();
            if let Some(rules) = &config.cors.rules {
                policy.configure(rules)?;
            }

            let mut headers = HeaderMap::new();
            if let Some(origin) = &origin {
                headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
            }

            let decision = policy.handle_request_start(&headers, &route);
            let report = json!({
                "route": route,
                "origin": origin,
                "outcome": decision.outcome(),
                "access_control_allow_origin": decision.header_value(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
