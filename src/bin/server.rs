//! Session Server Binary
//!
//! Serves the lobby, per-match actions and live WebSocket feeds.
//! Binds to `--bind` or `BIND_ADDR`.

use bankgame::*;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log()?;
    hosting::Server::run(Args::parse()).await
}
