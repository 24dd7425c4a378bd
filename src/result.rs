//! Typed outcomes returned by the book's public operations.
//!
//! There is no single `ExecutionResult` enum: each entry point returns the
//! concrete result type its pipeline actually produces, so callers never
//! match on a variant that can't occur for the call they made.

use std::collections::HashMap;

use crate::decimal::{Price, Quantity};
use crate::order::OrderId;

/// Outcome of placing an order that rested without matching (or was
/// rejected before ever touching the book).
#[derive(Debug, Clone, PartialEq)]
pub struct LimitResult {
    pub order_id: Option<OrderId>,
    pub success: bool,
    pub messages: Vec<String>,
}

impl LimitResult {
    pub fn accepted(order_id: OrderId) -> Self {
        LimitResult { order_id: Some(order_id), success: true, messages: Vec::new() }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        LimitResult { order_id: None, success: false, messages: vec![message.into()] }
    }
}

/// Outcome of an order that matched against the opposite side, possibly
/// after which an unfilled residual was placed on its own side.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketResult {
    pub order_id: OrderId,
    pub success: bool,
    pub messages: Vec<String>,
    pub limits_filled: usize,
    pub orders_filled: usize,
    pub exec_volume: HashMap<Price, Quantity>,
}

impl MarketResult {
    pub fn filled(order_id: OrderId, limits_filled: usize, orders_filled: usize, exec_volume: HashMap<Price, Quantity>) -> Self {
        MarketResult { order_id, success: true, messages: Vec::new(), limits_filled, orders_filled, exec_volume }
    }

    pub fn rejected(order_id: OrderId, message: impl Into<String>) -> Self {
        MarketResult {
            order_id,
            success: false,
            messages: vec![message.into()],
            limits_filled: 0,
            orders_filled: 0,
            exec_volume: HashMap::new(),
        }
    }
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelResult {
    pub order_id: OrderId,
    pub success: bool,
    pub messages: Vec<String>,
}

impl CancelResult {
    pub fn canceled(order_id: OrderId) -> Self {
        CancelResult { order_id, success: true, messages: Vec::new() }
    }

    pub fn failed(order_id: OrderId, message: impl Into<String>) -> Self {
        CancelResult { order_id, success: false, messages: vec![message.into()] }
    }
}

/// A parameter or state error that never reached an order id (e.g. the book
/// isn't running, or construction-time validation failed).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResult {
    pub success: bool,
    pub messages: Vec<String>,
}

impl ErrorResult {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResult { success: false, messages: vec![message.into()] }
    }
}

/// The outcome of `process_one`: either the order rested, matched, or was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Limit(LimitResult),
    Market(MarketResult),
    Error(ErrorResult),
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        match self {
            ExecutionResult::Limit(r) => r.success,
            ExecutionResult::Market(r) => r.success,
            ExecutionResult::Error(r) => r.success,
        }
    }
}
