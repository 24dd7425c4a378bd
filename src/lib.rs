//! A single-instrument limit order book and matching engine.
//!
//! Clients submit [`order::OrderParams`] to an [`OrderBook`] and get back a
//! typed [`result::ExecutionResult`]. The book supports FOK/GTC/GTD
//! time-in-force, price-time priority, partial execution, cancellation, and
//! a background reaper that expires GTD orders past their deadline.
//!
//! # Example
//! ```rust
//! use rust_order_book::{OrderBookBuilder, Side, TimeInForce, OrderParams, ExecutionResult};
//! use rust_decimal_macros::dec;
//!
//! let book = OrderBookBuilder::new("BTCUSD").with_autostart(true).build().unwrap();
//!
//! let bid = OrderParams::new(Side::Bid, dec!(100), dec!(10), TimeInForce::GTC, None).unwrap();
//! assert!(matches!(book.process_one(bid), ExecutionResult::Limit(r) if r.success));
//!
//! let ask = OrderParams::new(Side::Ask, dec!(100), dec!(10), TimeInForce::GTC, None).unwrap();
//! assert!(matches!(book.process_one(ask), ExecutionResult::Market(r) if r.success));
//! ```

pub mod book;
pub mod builder;
pub mod consts;
pub mod decimal;
pub mod engine;
pub mod enums;
pub mod error;
pub mod limit;
pub mod order;
pub mod result;
pub mod side;
pub mod utils;

pub use book::{Depth, OrderBook, Snapshot};
pub use builder::OrderBookBuilder;
pub use decimal::{Price, Quantity};
pub use enums::{OrderStatus, Side, TimeInForce};
pub use error::{ErrorType, OrderBookError};
pub use order::{OrderId, OrderParams};
pub use result::{CancelResult, ErrorResult, ExecutionResult, LimitResult, MarketResult};
