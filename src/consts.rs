//! Fixed configuration constants for the order book.
use std::time::Duration;

/// Default number of fractional digits carried by [`crate::decimal::Price`]
/// and [`crate::decimal::Quantity`] values.
pub const DEFAULT_PRECISION: u32 = 2;

/// Smallest representable price/quantity at the default precision (`10^-precision`).
pub const MIN_VALUE: &str = "0.01";

/// Largest representable price/quantity (`10^11`).
pub const MAX_VALUE: &str = "100000000000";

/// How often the expiry reaper wakes up to cancel expired GTD orders.
pub const REAPER_INTERVAL: Duration = Duration::from_millis(100);

/// Default number of price levels shown per side by `OrderBook::view`.
pub const DEFAULT_LIMITS_VIEW: usize = 10;
