//! Demo 3: ASCII Depth Chart
//!
//! Showcases: per-order book snapshots, depth aggregation
//!
//! Run: LUNO_API_KEY_ID=... LUNO_API_KEY_SECRET=... cargo run --bin depth_monitor -- XBTZAR

use colored::*;
use luno_book::{MarketState, Order};
use luno_stream::{Credentials, MarketHandle, StreamConfig};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;

const ORDERS_TO_SHOW: usize = 10;
const HALF_WIDTH: usize = 25;

fn bar_len(volume: Decimal, max_volume: Decimal) -> usize {
    if max_volume.is_zero() {
        return 0;
    }
    ((volume / max_volume) * Decimal::from(HALF_WIDTH))
        .to_usize()
        .unwrap_or(0)
        .min(HALF_WIDTH)
}

fn draw_row(order: &Order, max_volume: Decimal, colour: fn(String) -> ColoredString) {
    let len = bar_len(order.volume, max_volume);
    println!(
        "  {:>12} │{}{}│ {}",
        order.volume,
        " ".repeat(HALF_WIDTH - len),
        colour("█".repeat(len)),
        order.price
    );
}

fn draw_depth_chart(state: &MarketState) {
    let asks: Vec<_> = state.asks.iter().take(ORDERS_TO_SHOW).collect();
    let bids: Vec<_> = state.bids.iter().take(ORDERS_TO_SHOW).collect();
    let max_volume = asks
        .iter()
        .chain(bids.iter())
        .map(|o| o.volume)
        .max()
        .unwrap_or(Decimal::ONE);

    print!("\x1B[2J\x1B[H");
    println!("{}", format!("  [{}] {}", state.sequence, state.status).cyan().bold());

    for order in asks.iter().rev() {
        draw_row(order, max_volume, |s| s.red());
    }

    match state.spread() {
        Some(spread) => println!("  {:>12} ├{}┤ spread {}", "", "─".repeat(HALF_WIDTH), spread),
        None => println!("  {:>12} ├{}┤", "", "─".repeat(HALF_WIDTH)),
    }

    for order in &bids {
        draw_row(order, max_volume, |s| s.green());
    }

    println!();
    println!(
        "  {} {} ({} orders)   {} {} ({} orders)",
        "Bid depth:".dimmed(),
        state.bid_depth(),
        state.bids.len(),
        "Ask depth:".dimmed(),
        state.ask_depth(),
        state.asks.len()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "luno_stream=warn".into()),
        )
        .init();

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "XBTZAR".to_string());
    let handle = MarketHandle::spawn(&symbol, Credentials::from_env()?, StreamConfig::default())?;

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    while !handle.is_finished() {
        ticker.tick().await;
        if let Some(state) = handle.latest() {
            draw_depth_chart(&state);
        }
    }

    handle.join().await?;
    Ok(())
}
