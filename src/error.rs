//! Error module for the orderbook.
//!
//! [`ErrorType`] names a category and carries its own numeric code and
//! default message; [`OrderBookError`] is either a `Known` category as-is or
//! a `Custom` message that keeps a code but overrides the text. Both
//! implement `Display` as `"[{code}] {message}"`.
//!
//! ```rust
//! use rust_order_book::error::{Result, OrderBookError, ErrorType};
//!
//! fn demo() -> Result<()> {
//!     let e1: OrderBookError = ErrorType::InvalidParams.into();
//!     assert_eq!(e1.to_string(), "[1102] invalid order price, quantity or expiry");
//!
//!     let e2 = OrderBookError::from(ErrorType::NotRunning).with_message("book is paused");
//!     assert_eq!(e2.to_string(), "[1001] book is paused");
//!
//!     Ok(())
//! }
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ErrorType {
    // 10xx General issues
    Default,
    NotRunning,

    // 11xx Request/parameter issues
    InvalidParams,
    FokNotMatchable,

    // 12xx Order lifecycle issues
    UnknownOrder,
    NotCancelable,

    // 13xx Snapshot/update issues
    MalformedSnapshot,
}

impl ErrorType {
    /// Numeric code for the error type.
    pub fn code(self) -> u32 {
        match self {
            // 10xx General issues
            ErrorType::Default => 1000,
            ErrorType::NotRunning => 1001,

            // 11xx Request/parameter issues
            ErrorType::InvalidParams => 1102,
            ErrorType::FokNotMatchable => 1103,

            // 12xx Order lifecycle issues
            ErrorType::UnknownOrder => 1201,
            ErrorType::NotCancelable => 1202,

            // 13xx Snapshot/update issues
            ErrorType::MalformedSnapshot => 1301,
        }
    }

    /// Default human message for the error type.
    pub const fn message(self) -> &'static str {
        match self {
            // 10xx General issues
            ErrorType::Default => "something went wrong",
            ErrorType::NotRunning => "order book is not running",

            // 11xx Request/parameter issues
            ErrorType::InvalidParams => "invalid order price, quantity or expiry",
            ErrorType::FokNotMatchable => "FOK order not immediately fillable",

            // 12xx Order lifecycle issues
            ErrorType::UnknownOrder => "order not found",
            ErrorType::NotCancelable => "order is not in a cancelable state",

            // 13xx Snapshot/update issues
            ErrorType::MalformedSnapshot => "malformed snapshot or update pair",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

/// The error type returned by every fallible book operation.
///
/// `Known` wraps one of the fixed [`ErrorType`] categories unchanged;
/// `Custom` keeps a code but carries a message built at the call site (e.g.
/// [`reset`](crate::book::OrderBook::reset) explaining *why* the book isn't
/// running rather than just that it isn't).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum OrderBookError {
    #[error("{0}")]
    Known(ErrorType),
    #[error("[{code}] {message}")]
    Custom { code: u32, message: String },
}

impl OrderBookError {
    /// A free-form error under the default code (1000).
    pub fn custom(message: impl Into<String>) -> Self {
        OrderBookError::Custom { code: ErrorType::Default.code(), message: message.into() }
    }

    /// The numeric code, whichever variant this is.
    pub fn code(&self) -> u32 {
        match self {
            OrderBookError::Known(t) => t.code(),
            OrderBookError::Custom { code, .. } => *code,
        }
    }

    /// Keep this error's code but replace its message.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        OrderBookError::Custom { code: self.code(), message: message.into() }
    }
}

impl From<ErrorType> for OrderBookError {
    fn from(t: ErrorType) -> Self {
        OrderBookError::Known(t)
    }
}

/// Result alias for the library.
pub type Result<T> = std::result::Result<T, OrderBookError>;
