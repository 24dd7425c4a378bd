//! One price level for one side: a FIFO queue of live orders, their
//! aggregate volume, and a by-id index for O(1) cancellation lookup.
//!
//! Cancellation never searches the queue. A canceled order is marked and
//! its counters removed immediately, but the queue node itself is left in
//! place as a tombstone and discarded lazily the next time the front of the
//! queue is inspected (`next_valid`/`pop_next_valid`).

use std::collections::{HashMap, VecDeque};

use crate::decimal::{zero, Price, Quantity};
use crate::enums::{OrderStatus, Side};
use crate::order::{OrderHandle, OrderId};

/// FIFO of orders resting at one `(price, side)`.
pub struct Limit {
    price: Price,
    side: Side,
    volume: Quantity,
    queue: VecDeque<OrderHandle>,
    by_id: HashMap<OrderId, OrderHandle>,
    valid_orders: usize,
}

impl Limit {
    pub fn new(price: Price, side: Side) -> Self {
        Limit { price, side, volume: zero(), queue: VecDeque::new(), by_id: HashMap::new(), valid_orders: 0 }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Sum of `qty_remaining` over valid orders in the queue.
    pub fn volume(&self) -> Quantity {
        self.volume
    }

    /// Number of valid (non-tombstoned) orders in the queue.
    pub fn valid_orders(&self) -> usize {
        self.valid_orders
    }

    /// Raw queue length, including not-yet-swept tombstones.
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// A limit is empty iff it has no valid orders left (`volume = 0`).
    pub fn empty(&self) -> bool {
        self.valid_orders == 0
    }

    /// Look up a resting order by id, `O(1)`.
    pub fn get(&self, id: &str) -> Option<OrderHandle> {
        self.by_id.get(id).cloned()
    }

    /// Enqueue `order`, index it by id, add its quantity to `volume`, and
    /// mark it `Pending`.
    pub fn add(&mut self, handle: OrderHandle) {
        let (id, qty) = {
            let mut order = handle.lock();
            order.set_status(OrderStatus::Pending);
            (order.id().to_string(), order.quantity())
        };
        self.by_id.insert(id, handle.clone());
        self.queue.push_back(handle);
        self.volume += qty;
        self.valid_orders += 1;
    }

    /// Drop tombstoned heads until the queue starts with a valid order or is empty.
    fn discard_stale_heads(&mut self) {
        while let Some(front) = self.queue.front() {
            if front.lock().valid() {
                break;
            }
            let stale = self.queue.pop_front().expect("front just checked");
            let id = stale.lock().id().to_string();
            self.by_id.remove(&id);
        }
    }

    /// Peek the next order a market sweep should consume, skipping tombstones.
    pub fn next_valid(&mut self) -> Option<OrderHandle> {
        self.discard_stale_heads();
        self.queue.front().cloned()
    }

    /// Dequeue and return the next valid order, removing it from the by-id index.
    pub fn pop_next_valid(&mut self) -> Option<OrderHandle> {
        self.discard_stale_heads();
        let handle = self.queue.pop_front()?;
        let qty = handle.lock().quantity();
        let id = handle.lock().id().to_string();
        self.by_id.remove(&id);
        self.volume -= qty;
        self.valid_orders -= 1;
        Some(handle)
    }

    /// Partially fill the queue's head in place, without dequeueing it.
    pub fn fill_next(&mut self, amount: Quantity) {
        self.discard_stale_heads();
        if let Some(handle) = self.queue.front() {
            handle.lock().fill(amount);
            self.volume -= amount;
        }
    }

    /// Mark every valid order filled and drop the entire queue.
    ///
    /// Used when a whole limit is consumed by a sweep (Phase A): cheaper
    /// than popping one order at a time since none of them survive.
    pub fn fill_all(&mut self) {
        for handle in self.queue.drain(..) {
            let mut order = handle.lock();
            if order.valid() {
                let remaining = order.quantity();
                order.fill(remaining);
            }
        }
        self.by_id.clear();
        self.volume = zero();
        self.valid_orders = 0;
    }

    /// Cancel the order with `id` if present and valid. Returns whether a
    /// cancellation actually occurred (no-op, returns `false`, if the id is
    /// unknown or the order is already terminal).
    pub fn cancel(&mut self, id: &str) -> bool {
        let Some(handle) = self.by_id.remove(id) else {
            return false;
        };
        let mut order = handle.lock();
        if !order.valid() {
            return false;
        }
        let qty = order.quantity();
        order.set_status(OrderStatus::Canceled);
        drop(order);
        self.volume -= qty;
        self.valid_orders -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderParams;
    use rust_decimal_macros::dec;

    fn handle(side: Side, price: Price, qty: Quantity) -> OrderHandle {
        OrderParams::gtc(side, price, qty).unwrap().into_order().into_handle()
    }

    #[test]
    fn add_updates_volume_and_count() {
        let mut limit = Limit::new(dec!(100), Side::Bid);
        limit.add(handle(Side::Bid, dec!(100), dec!(10)));
        limit.add(handle(Side::Bid, dec!(100), dec!(5)));
        assert_eq!(limit.volume(), dec!(15));
        assert_eq!(limit.valid_orders(), 2);
        assert!(!limit.empty());
    }

    #[test]
    fn cancel_tombstones_without_removing_from_queue() {
        let mut limit = Limit::new(dec!(100), Side::Bid);
        let first = handle(Side::Bid, dec!(100), dec!(10));
        let id = first.lock().id().to_string();
        limit.add(first);
        limit.add(handle(Side::Bid, dec!(100), dec!(5)));

        assert!(limit.cancel(&id));
        assert_eq!(limit.volume(), dec!(5));
        assert_eq!(limit.valid_orders(), 1);
        assert_eq!(limit.size(), 2, "tombstone is still physically queued");

        let next = limit.next_valid().unwrap();
        assert_eq!(next.lock().quantity(), dec!(5));
        assert_eq!(limit.size(), 1, "stale head swept lazily");
    }

    #[test]
    fn cancel_unknown_id_is_noop() {
        let mut limit = Limit::new(dec!(100), Side::Bid);
        assert!(!limit.cancel("does-not-exist"));
    }

    #[test]
    fn cancel_twice_is_noop_second_time() {
        let mut limit = Limit::new(dec!(100), Side::Bid);
        let order = handle(Side::Bid, dec!(100), dec!(10));
        let id = order.lock().id().to_string();
        limit.add(order);
        assert!(limit.cancel(&id));
        assert!(!limit.cancel(&id));
    }

    #[test]
    fn fill_next_partially_fills_head_in_place() {
        let mut limit = Limit::new(dec!(100), Side::Ask);
        limit.add(handle(Side::Ask, dec!(100), dec!(10)));
        limit.fill_next(dec!(4));
        assert_eq!(limit.volume(), dec!(6));
        let head = limit.next_valid().unwrap();
        assert_eq!(head.lock().quantity(), dec!(6));
    }

    #[test]
    fn pop_next_valid_removes_and_reindexes() {
        let mut limit = Limit::new(dec!(100), Side::Ask);
        let order = handle(Side::Ask, dec!(100), dec!(10));
        let id = order.lock().id().to_string();
        limit.add(order);

        let popped = limit.pop_next_valid().unwrap();
        assert_eq!(popped.lock().id(), id);
        assert!(limit.empty());
        assert!(limit.get(&id).is_none());
    }

    #[test]
    fn fill_all_drains_and_fills_every_valid_order() {
        let mut limit = Limit::new(dec!(100), Side::Bid);
        limit.add(handle(Side::Bid, dec!(100), dec!(10)));
        let second = handle(Side::Bid, dec!(100), dec!(5));
        let second_clone = second.clone();
        limit.add(second);

        limit.fill_all();

        assert!(limit.empty());
        assert_eq!(limit.size(), 0);
        assert_eq!(second_clone.lock().status(), OrderStatus::Filled);
    }
}
