//! One side (bid or ask) of the book: a price-ordered map of [`Limit`]s plus
//! a cached aggregate volume.
//!
//! Ask limits are ordered ascending (best = lowest price); bid limits are
//! ordered descending (best = highest price). Both share the same `Limit`
//! and queue code and differ only in which end of the map is "best" and in
//! the direction of the marketability/out-of-price comparisons.

use std::collections::BTreeMap;

use crate::decimal::{zero, Price, Quantity};
use crate::enums::Side as SideKind;
use crate::limit::Limit;
use crate::order::OrderHandle;

/// A triplet describing a price level from the outside: `(price, volume, valid_orders)`.
pub type LevelInfo = (Price, Quantity, usize);

pub struct BookSide {
    kind: SideKind,
    limits: BTreeMap<Price, Limit>,
    volume: Quantity,
}

impl BookSide {
    pub fn new(kind: SideKind) -> Self {
        BookSide { kind, limits: BTreeMap::new(), volume: zero() }
    }

    pub fn kind(&self) -> SideKind {
        self.kind
    }

    /// Cached sum of every Limit's volume on this side.
    pub fn volume(&self) -> Quantity {
        self.volume
    }

    /// Number of distinct price levels.
    pub fn size(&self) -> usize {
        self.limits.len()
    }

    pub fn empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn has_price(&self, price: Price) -> bool {
        self.limits.contains_key(&price)
    }

    pub fn get_limit(&self, price: Price) -> Option<&Limit> {
        self.limits.get(&price)
    }

    pub fn get_limit_mut(&mut self, price: Price) -> Option<&mut Limit> {
        self.limits.get_mut(&price)
    }

    fn best_entry(&self) -> Option<(&Price, &Limit)> {
        match self.kind {
            SideKind::Ask => self.limits.iter().next(),
            SideKind::Bid => self.limits.iter().next_back(),
        }
    }

    /// The best limit's `(price, volume, valid_orders)`, or `None` if this side is empty.
    pub fn best(&self) -> Option<LevelInfo> {
        self.best_entry().map(|(&price, limit)| (price, limit.volume(), limit.valid_orders()))
    }

    pub fn best_price(&self) -> Option<Price> {
        self.best_entry().map(|(&price, _)| price)
    }

    /// Mutable access to the best limit, for the matching engine.
    pub fn best_limit_mut(&mut self) -> Option<&mut Limit> {
        let price = self.best_price()?;
        self.limits.get_mut(&price)
    }

    /// Up to `n` levels, best-first: ascending for asks, descending for bids.
    pub fn best_levels(&self, n: usize) -> Vec<LevelInfo> {
        let iter = self.limits.iter().map(|(&price, limit)| (price, limit.volume(), limit.valid_orders()));
        match self.kind {
            SideKind::Ask => iter.take(n).collect(),
            SideKind::Bid => {
                let mut levels: Vec<LevelInfo> = iter.collect();
                levels.reverse();
                levels.truncate(n);
                levels
            }
        }
    }

    /// Whether an incoming order priced at `order_price` crosses this side's best limit.
    ///
    /// Call this on the *opposite* side from the incoming order: to check
    /// whether a bid at `p` is marketable, ask `ask_side.is_marketable(p)`.
    pub fn is_marketable(&self, order_price: Price) -> bool {
        match self.best_price() {
            None => false,
            Some(best) => match self.kind {
                SideKind::Ask => best <= order_price,
                SideKind::Bid => best >= order_price,
            },
        }
    }

    /// Enqueue `handle` at its price, creating the Limit if absent.
    pub fn place(&mut self, handle: OrderHandle) {
        let (price, qty) = {
            let order = handle.lock();
            (order.price(), order.quantity())
        };
        let limit = self.limits.entry(price).or_insert_with(|| Limit::new(price, self.kind));
        limit.add(handle);
        self.volume += qty;
    }

    /// Cancel `handle` if it's still resting on this side. Removes the Limit if it empties.
    pub fn cancel(&mut self, handle: &OrderHandle) -> bool {
        let (price, id) = {
            let order = handle.lock();
            (order.price(), order.id().to_string())
        };
        let Some(limit) = self.limits.get_mut(&price) else {
            return false;
        };
        let qty_before = limit.volume();
        if !limit.cancel(&id) {
            return false;
        }
        let drained = qty_before - limit.volume();
        self.volume -= drained;
        if limit.empty() {
            self.limits.remove(&price);
        }
        true
    }

    /// Remove a limit that the matching engine fully drained (Phase A).
    pub fn drop_limit(&mut self, price: Price, drained_volume: Quantity) {
        self.limits.remove(&price);
        self.volume -= drained_volume;
    }

    /// Unconditionally remove whatever limit sits at `price`, regardless of its volume.
    /// Used by snapshot/update ingestion, which replaces a whole price level at once.
    pub fn remove_price(&mut self, price: Price) {
        if let Some(limit) = self.limits.remove(&price) {
            self.volume -= limit.volume();
        }
    }

    /// Remove the limit at `price` if the engine left it empty (Phase B/C).
    pub fn prune_if_empty(&mut self, price: Price) {
        if let Some(limit) = self.limits.get(&price) {
            if limit.empty() {
                self.limits.remove(&price);
            }
        }
    }

    /// Account for volume consumed from the best limit without removing it (Phases B/C).
    pub fn consume_volume(&mut self, amount: Quantity) {
        self.volume -= amount;
    }
}
