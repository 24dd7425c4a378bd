use serde::{Deserialize, Serialize};

/// Which book a resting or incoming order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// The side an incoming order of `self` matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// Time-in-force policy of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Fill-or-kill: must fill entirely and immediately or be rejected.
    FOK,
    /// Good-till-canceled: rests until filled or canceled.
    GTC,
    /// Good-till-date: rests until filled, canceled, or its `expiry` passes.
    GTD,
    /// Internal marker for synthetic depth orders placed by
    /// [`crate::book::OrderBook::from_snapshot`]/`apply_updates`. Never
    /// produced from client-facing [`crate::order::OrderParams`].
    Fake,
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Constructed but not yet placed or matched.
    Created,
    /// Resting in a limit, untouched since enqueue.
    Pending,
    /// Resting in a limit, partially filled.
    Partial,
    /// Fully filled, no longer in any limit.
    Filled,
    /// Canceled explicitly or by expiry.
    Canceled,
    /// Rejected by the book (e.g. FOK pre-check failure).
    Error,
}

impl OrderStatus {
    /// An order is cancelable/matchable iff it's in one of these states.
    pub fn is_valid(self) -> bool {
        matches!(self, OrderStatus::Created | OrderStatus::Pending | OrderStatus::Partial)
    }
}
