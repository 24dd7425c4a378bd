//! The matching engine: walks one side of the book consuming liquidity for
//! an incoming marketable order.
//!
//! `execute` runs in three monotonic phases against the *opposite* side from
//! the incoming order: whole limits are consumed first (cheapest), then
//! whole orders within the new best limit, then at most one partial fill of
//! a resting order's head. It never touches the incoming order's own side;
//! placing a leftover residual is the caller's job.

use std::collections::HashMap;

use crate::decimal::{zero, Price, Quantity};
use crate::enums::Side as SideKind;
use crate::order::OrderHandle;
use crate::side::BookSide;

/// Per-price executed volume and fill counters produced by one [`execute`] call.
#[derive(Debug, Clone, Default)]
pub struct ExecOutcome {
    pub limits_filled: usize,
    pub orders_filled: usize,
    pub exec_volume: HashMap<Price, Quantity>,
}

/// The best opposite limit is strictly worse than `order_price`, so matching must stop.
fn out_of_price(order_side: SideKind, order_price: Price, limit_price: Price) -> bool {
    match order_side {
        SideKind::Bid => order_price < limit_price,
        SideKind::Ask => order_price > limit_price,
    }
}

/// Consume liquidity from `opposite` for `order` until its quantity is
/// exhausted or the opposite side runs out at an acceptable price.
///
/// Precondition: `order` is marketable against `opposite` (the caller
/// checks this before acquiring the opposite-side lock).
pub fn execute(order: &OrderHandle, opposite: &mut BookSide) -> ExecOutcome {
    let mut outcome = ExecOutcome::default();
    let (order_side, order_price) = {
        let o = order.lock();
        (o.side(), o.price())
    };

    // Phase A: consume whole limits.
    while !order.lock().quantity().is_zero() && !opposite.empty() {
        let limit_price = opposite.best_price().expect("side not empty");
        if out_of_price(order_side, order_price, limit_price) {
            return outcome;
        }

        let limit_volume = opposite.get_limit(limit_price).expect("best price exists").volume();
        if order.lock().quantity() < limit_volume {
            break;
        }

        let valid_orders = opposite.get_limit(limit_price).unwrap().valid_orders();
        opposite.get_limit_mut(limit_price).unwrap().fill_all();
        order.lock().fill(limit_volume);
        opposite.drop_limit(limit_price, limit_volume);

        *outcome.exec_volume.entry(limit_price).or_insert_with(zero) += limit_volume;
        outcome.limits_filled += 1;
        outcome.orders_filled += valid_orders;
    }

    if order.lock().quantity().is_zero() || opposite.empty() {
        return outcome;
    }

    // Phase B: consume whole orders at the current best limit; Phase C
    // (partial fill of the head) happens inline once a whole order no
    // longer fits.
    let limit_price = match opposite.best_price() {
        Some(p) => p,
        None => return outcome,
    };
    if out_of_price(order_side, order_price, limit_price) {
        return outcome;
    }

    loop {
        let remaining = order.lock().quantity();
        if remaining.is_zero() {
            break;
        }
        let Some(head) = opposite.get_limit_mut(limit_price).and_then(|l| l.next_valid()) else {
            break;
        };
        let head_qty = head.lock().quantity();

        if remaining < head_qty {
            // Phase C.
            opposite.get_limit_mut(limit_price).unwrap().fill_next(remaining);
            opposite.consume_volume(remaining);
            *outcome.exec_volume.entry(limit_price).or_insert_with(zero) += remaining;
            order.lock().fill(remaining);
            break;
        }

        opposite.get_limit_mut(limit_price).unwrap().pop_next_valid();
        opposite.consume_volume(head_qty);
        *outcome.exec_volume.entry(limit_price).or_insert_with(zero) += head_qty;
        outcome.orders_filled += 1;
        order.lock().fill(head_qty);
    }

    opposite.prune_if_empty(limit_price);
    outcome
}
