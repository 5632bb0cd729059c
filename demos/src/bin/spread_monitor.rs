//! Demo 2: Real-time Spread Monitor
//!
//! Showcases: background stream handle, shared latest state, reconnection
//!
//! Run: LUNO_API_KEY_ID=... LUNO_API_KEY_SECRET=... cargo run --bin spread_monitor -- XBTZAR

use colored::*;
use luno_stream::{Credentials, MarketHandle, ReconnectConfig, StreamConfig};
use std::io::Write;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "luno_stream=warn".into()),
        )
        .init();

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "XBTZAR".to_string());

    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  REAL-TIME SPREAD MONITOR".cyan().bold());
    println!("{}", format!("  Luno {} stream", symbol).cyan());
    println!("{}", "═".repeat(60).cyan());
    println!();

    let config = StreamConfig::new().with_reconnect(ReconnectConfig::enabled().with_max_attempts(5));
    let mut handle = MarketHandle::spawn(&symbol, Credentials::from_env()?, config)?;
    let mut events = handle
        .take_event_receiver()
        .ok_or("event receiver already taken")?;

    println!("{} Streaming {} order book...\n", "✓".green(), handle.pair());

    let start = Instant::now();
    let mut update_count = 0u64;

    while let Some(event) = events.recv().await {
        if event.is_snapshot() {
            println!(
                "\n{} Snapshot at sequence {}",
                "↻".yellow(),
                event.state.sequence
            );
            continue;
        }
        update_count += 1;

        let (Some(bid), Some(ask), Some(spread)) = (
            event.state.best_bid(),
            event.state.best_ask(),
            event.state.spread(),
        ) else {
            continue;
        };

        let elapsed = start.elapsed().as_secs();
        print!("\r\x1B[K");
        print!(
            "  {} {}  {} {}  {} {}  ",
            "BID:".yellow(),
            bid.price,
            "ASK:".yellow(),
            ask.price,
            "SPREAD:".green(),
            spread
        );
        print!(
            "│ {} {}  │ {} {}/s",
            "Seq:".dimmed(),
            event.state.sequence,
            "Rate:".dimmed(),
            if elapsed > 0 { update_count / elapsed } else { 0 }
        );
        std::io::stdout().flush()?;

        if start.elapsed() > Duration::from_secs(60) {
            break;
        }
    }

    println!();
    println!("\n{} Processed {} updates", "✓".green(), update_count);
    handle.abort();

    Ok(())
}
