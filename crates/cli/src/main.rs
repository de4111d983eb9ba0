//! Livraria interactive shell.
//!
//! One process is one app session: the shell owns the cart and the signed-in
//! user for its whole lifetime, the way the mobile app does between launches.
//!
//! # Usage
//!
//! ```bash
//! # Start the shell (reads SUPABASE_URL / SUPABASE_ANON_KEY from .env)
//! livraria
//!
//! livraria> login maria@example.com SenhaForte1!
//! livraria> books
//! livraria> add 12
//! livraria> checkout
//! livraria> quit
//! ```
//!
//! Type `help` inside the shell for the full command list.

#![cfg_attr(not(test), forbid(unsafe_code))]
// The shell is a terminal UI; stdout is its output channel.
#![allow(clippy::print_stdout)]

use livraria_client::{Config, SupabaseClient};
use tracing_subscriber::EnvFilter;

mod shell;

#[tokio::main]
async fn main() {
    // Diagnostics stay on stderr so they never interleave with shell output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let result = run().await;

    if let Err(e) = result {
        tracing::error!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let client = SupabaseClient::new(&config);
    shell::Shell::new(client).run().await;
    Ok(())
}
