//! Demo 1: Stream a market and print every book change
//!
//! Showcases: callback driver, state summaries
//!
//! Run: LUNO_API_KEY_ID=... LUNO_API_KEY_SECRET=... cargo run --bin stream_market -- XBTZAR

use luno_stream::{stream_market, Credentials};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "luno_stream=info".into()),
        )
        .init();

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "XBTZAR".to_string());
    let credentials = Credentials::from_env()?;

    stream_market(&symbol, credentials, |pair, state, update| {
        println!("{}", state.summary(pair));
        if let Some(update) = update {
            println!("{:?}", update);
        }
    })
    .await?;

    Ok(())
}
