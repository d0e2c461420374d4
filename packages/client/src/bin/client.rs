//! Gambit terminal chess client.
//!
//! Creates or joins a game session, sends typed moves to the server and
//! exchanges confirmed moves with the opponent over the session channel.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin gambit-client
//! cargo run --bin gambit-client -- --session 2f1c9c0e-...
//! cargo run --bin gambit-client -- --single --no-notation
//! cargo run --bin gambit-client -- --single --fen "4k3/P7/8/8/8/8/8/4K3 w - - 0 1"
//! ```

use clap::Parser;
use gambit_client::{ClientConfig, run_client};
use gambit_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "gambit-client")]
#[command(about = "Terminal client for two-player and single-player chess sessions", long_about = None)]
struct Args {
    /// Game server URL
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Join an existing multiplayer session instead of creating one
    #[arg(long)]
    session: Option<String>,

    /// Play against the server engine
    #[arg(long, conflicts_with = "session")]
    single: bool,

    /// Starting position in FEN for a game against the engine (white to move)
    #[arg(long, requires = "single")]
    fen: Option<String>,

    /// Hide rank and file coordinates
    #[arg(long)]
    no_notation: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ClientConfig {
        server: args.server,
        session: args.session,
        single: args.single,
        fen: args.fen,
        notation: !args.no_notation,
    };

    if let Err(e) = run_client(config).await {
        match std::error::Error::source(&e) {
            Some(cause) => tracing::error!("{} ({})", e, cause),
            None => tracing::error!("{}", e),
        }
        std::process::exit(1);
    }
}
