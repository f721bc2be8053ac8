//! CLI for the Warden access decision service.
//!
//! `serve` exposes the registries and the decision endpoint over HTTP;
//! `check` answers a single decision against a store and exits.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Instant;

use warden_core::Decision;
use warden_engine::AuthorizationEngine;

#[derive(Parser, Debug)]
#[command(name = "warden", version, about = "Group-based access decision service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service.
    Serve {
        #[arg(short, long, env = "WARDEN_LISTEN", default_value = "127.0.0.1:8080")]
        listen: String,

        /// "memory://" or "file:///path/to/snapshot.json".
        #[arg(short, long, env = "WARDEN_STORE_URL", default_value = "memory://")]
        store: String,
    },
    /// Decide whether a user may access a named resource.
    Check {
        /// Usually "file:///path/to/snapshot.json"; a memory store is always empty.
        #[arg(short, long, env = "WARDEN_STORE_URL")]
        store: String,

        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        resource: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { listen, store } => {
            tracing::info!(listen = %listen, store = %store, "starting service");

            let store = warden_store::open(&store).await?;
            let engine = AuthorizationEngine::from_store(store);
            let server = warden_api::Server::bind(&listen, engine).await?;
            server.run().await?;

            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            store,
            user,
            resource,
            json,
        } => {
            let t0 = Instant::now();

            let store = warden_store::open(&store).await?;
            let engine = AuthorizationEngine::from_store(store);
            let decision = engine.is_authorized(&user, &resource).await?;

            tracing::info!(
                user = %user,
                resource = %resource,
                ?decision,
                elapsed_us = t0.elapsed().as_micros(),
                "decision made"
            );

            if json {
                let out = serde_json::json!({
                    "userId": user,
                    "resourceName": resource,
                    "decision": decision,
                    "authorized": decision.is_authorized(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", render(decision));
            }

            Ok(if decision.is_authorized() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn render(decision: Decision) -> &'static str {
    match decision {
        Decision::Authorized => "authorized",
        Decision::Denied => "denied",
        Decision::ResourceNotFound => "denied (no such resource)",
    }
}
