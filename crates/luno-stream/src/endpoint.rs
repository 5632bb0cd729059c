//! Stream endpoint URLs

use luno_types::Pair;

/// Production stream host
pub const DEFAULT_URL: &str = "wss://ws.luno.com";

/// Path prefix of the per-market stream
const STREAM_PATH: &str = "/api/1/stream/";

/// Build the stream URL for a market, e.g. `wss://ws.luno.com/api/1/stream/XBTZAR`
pub fn stream_url(base_url: &str, pair: &Pair) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        STREAM_PATH,
        pair.symbol()
    )
}
