//! Appspec Server CLI
//!
//! Starts the HTTP server for requirement generation.

use anyhow::Context;
use appspec_server::{config::ServerConfig, init_tracing, start_server};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        ServerConfig::from_file(config_path)
            .with_context(|| format!("loading {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        ServerConfig::default()
    };

    let config = config.with_env()?;
    config.validate()?;

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Appspec Server - Requirements extraction service");
    println!();
    println!("USAGE:");
    println!("    appspec-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT (overrides the config file, .env is read if present):");
    println!("    APPSPEC_BIND_ADDRESS  Address to bind (default: 127.0.0.1)");
    println!("    PORT                  Port to bind (default: 3001)");
    println!("    DATABASE_URL          SQLite file for the failure log");
    println!("    LLM_API_KEY           Provider key; unset runs in template mode");
    println!("    LLM_BASE_URL          OpenAI-compatible endpoint");
    println!("    LLM_MODEL             Model name (default: gpt-4o-mini)");
    println!("    LLM_TIMEOUT_SECS      Provider timeout (default: 30)");
    println!("    RUST_LOG              Log filter (default: info)");
    println!();
}
