//! Core module for the order book engine.
//!
//! This module defines [`OrderBook`], the dispatch layer that classifies an
//! incoming order as marketable or resting, runs the FOK/GTD pre-checks,
//! routes to the [`crate::engine`] or straight to placement, and records
//! accepted orders in by-id history and the expiry index.
//!
//! Use [`crate::builder::OrderBookBuilder`] to construct one.
//!
//! # Example
//! ```rust
//! use rust_order_book::{OrderBookBuilder, OrderParams, Side, ExecutionResult};
//!
//! let book = OrderBookBuilder::new("BTCUSD").with_autostart(true).build().unwrap();
//! let params = OrderParams::gtc(Side::Bid, rust_decimal_macros::dec!(100), rust_decimal_macros::dec!(10)).unwrap();
//! match book.process_one(params) {
//!     ExecutionResult::Limit(r) => assert!(r.success),
//!     _ => unreachable!(),
//! }
//! book.stop();
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::consts::REAPER_INTERVAL;
use crate::decimal::{self, Price, Quantity};
use crate::engine;
use crate::enums::{OrderStatus, Side, TimeInForce};
use crate::error::{ErrorType, OrderBookError, Result};
use crate::order::{self, OrderHandle, OrderId, OrderParams};
use crate::result::{CancelResult, ErrorResult, ExecutionResult, LimitResult, MarketResult};
use crate::side::{BookSide, LevelInfo};
use crate::utils::{current_timestamp_millis, current_timestamp_secs};

/// A snapshot or update frame: anonymous depth pairs for each side.
///
/// A pair with `volume = 0` is a deletion marker when applied via
/// `apply_updates`/`step`; `from_snapshot` rejects non-positive volumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub asks: Vec<(Price, Quantity)>,
    pub bids: Vec<(Price, Quantity)>,
}

/// A read-only view of the best `n` levels on each side.
#[derive(Debug, Clone, Default)]
pub struct Depth {
    pub asks: Vec<LevelInfo>,
    pub bids: Vec<LevelInfo>,
}

fn err_text(et: ErrorType) -> String {
    et.to_string()
}

/// The single-instrument limit order book and matching engine.
///
/// Each side is its own lock; the engine mutates only the opposite side
/// while matching and only the own side while placing a residual, so the
/// book never holds both side locks at once except in `apply_updates`
/// (ask then bid, fixed order, to match the only other two-lock path).
pub struct OrderBook {
    symbol: String,
    asks: Arc<Mutex<BookSide>>,
    bids: Arc<Mutex<BookSide>>,
    by_id: Arc<Mutex<HashMap<OrderId, OrderHandle>>>,
    expiry_index: Arc<Mutex<BTreeMap<i64, Vec<OrderHandle>>>>,
    update_queue: Mutex<VecDeque<Snapshot>>,
    alive: Arc<AtomicBool>,
    start_time: Arc<Mutex<Option<i64>>>,
    reaper: Mutex<Option<thread::JoinHandle<()>>>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        OrderBook {
            symbol: symbol.into(),
            asks: Arc::new(Mutex::new(BookSide::new(Side::Ask))),
            bids: Arc::new(Mutex::new(BookSide::new(Side::Bid))),
            by_id: Arc::new(Mutex::new(HashMap::new())),
            expiry_index: Arc::new(Mutex::new(BTreeMap::new())),
            update_queue: Mutex::new(VecDeque::new()),
            alive: Arc::new(AtomicBool::new(false)),
            start_time: Arc::new(Mutex::new(None)),
            reaper: Mutex::new(None),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /* ---------- lifecycle ---------- */

    /// Mark the book alive and spawn the background expiry reaper. A no-op if already running.
    pub fn start(&self) {
        if self.alive.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.start_time.lock() = Some(current_timestamp_millis());

        let asks = self.asks.clone();
        let bids = self.bids.clone();
        let expiry_index = self.expiry_index.clone();
        let alive = self.alive.clone();
        let handle = thread::spawn(move || reaper_loop(asks, bids, expiry_index, alive));
        *self.reaper.lock() = Some(handle);

        tracing::info!(symbol = %self.symbol, "order book started");
    }

    /// Mark the book not-alive and join the reaper on its next wake. Any
    /// in-flight `process_one` completes first since it holds no lock this needs.
    pub fn stop(&self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.reaper.lock().take() {
            let _ = handle.join();
        }
        tracing::info!(symbol = %self.symbol, "order book stopped");
    }

    /// Clear both sides, by-id history and the expiry index. Fails if the book is running.
    pub fn reset(&self) -> Result<()> {
        if self.is_running() {
            return Err(OrderBookError::from(ErrorType::NotRunning).with_message("cannot reset a running order book"));
        }
        *self.asks.lock() = BookSide::new(Side::Ask);
        *self.bids.lock() = BookSide::new(Side::Bid);
        self.by_id.lock().clear();
        self.expiry_index.lock().clear();
        *self.start_time.lock() = None;
        Ok(())
    }

    /// Milliseconds since `start()`, or `None` if never started.
    pub fn running_time(&self) -> Option<i64> {
        let started = (*self.start_time.lock())?;
        Some(current_timestamp_millis() - started)
    }

    /* ---------- order submission ---------- */

    #[tracing::instrument(skip(self, params), fields(symbol = %self.symbol))]
    pub fn process_one(&self, params: OrderParams) -> ExecutionResult {
        if !self.is_running() {
            return ExecutionResult::Error(ErrorResult::new(err_text(ErrorType::NotRunning)));
        }

        if params.tif() == TimeInForce::GTD {
            let now = current_timestamp_secs();
            if params.expiry().map_or(true, |e| e <= now) {
                return ExecutionResult::Error(ErrorResult::new(err_text(ErrorType::InvalidParams)));
            }
        }

        let handle = params.into_order().into_handle();
        let (side, price, tif) = {
            let o = handle.lock();
            (o.side(), o.price(), o.tif())
        };

        let marketable = match side {
            Side::Bid => self.asks.lock().is_marketable(price),
            Side::Ask => self.bids.lock().is_marketable(price),
        };

        if marketable {
            return self.process_marketable(handle, side, price, tif);
        }
        self.process_resting(handle, side, tif)
    }

    fn process_marketable(&self, handle: OrderHandle, side: Side, price: Price, tif: TimeInForce) -> ExecutionResult {
        let id = handle.lock().id().to_string();

        // Hold one guard on the opposite side across the FOK pre-check and the
        // match itself: a concurrent cancel/place/expiry between two separate
        // critical sections could shrink liquidity and let a FOK order through
        // the pre-check only to come out partial.
        let mut opposite = match side {
            Side::Bid => self.asks.lock(),
            Side::Ask => self.bids.lock(),
        };

        if tif == TimeInForce::FOK {
            let qty = handle.lock().quantity();
            if !fok_marketable(&opposite, side, price, qty) {
                handle.lock().set_status(OrderStatus::Error);
                tracing::warn!(order_id = %id, "FOK order not immediately fillable");
                return ExecutionResult::Market(MarketResult::rejected(id, err_text(ErrorType::FokNotMatchable)));
            }
        }

        let outcome = engine::execute(&handle, &mut opposite);
        drop(opposite);

        let residual = {
            let o = handle.lock();
            o.valid() && !o.quantity().is_zero()
        };
        if residual {
            match side {
                Side::Bid => self.bids.lock().place(handle.clone()),
                Side::Ask => self.asks.lock().place(handle.clone()),
            }
        }

        self.record_accepted(&handle);
        tracing::debug!(order_id = %id, limits_filled = outcome.limits_filled, orders_filled = outcome.orders_filled, "order matched");
        ExecutionResult::Market(MarketResult::filled(id, outcome.limits_filled, outcome.orders_filled, outcome.exec_volume))
    }

    fn process_resting(&self, handle: OrderHandle, side: Side, tif: TimeInForce) -> ExecutionResult {
        if tif == TimeInForce::FOK {
            handle.lock().set_status(OrderStatus::Error);
            return ExecutionResult::Limit(LimitResult::rejected(err_text(ErrorType::FokNotMatchable)));
        }

        match side {
            Side::Bid => self.bids.lock().place(handle.clone()),
            Side::Ask => self.asks.lock().place(handle.clone()),
        }
        self.record_accepted(&handle);
        let id = handle.lock().id().to_string();
        ExecutionResult::Limit(LimitResult::accepted(id))
    }

    fn record_accepted(&self, handle: &OrderHandle) {
        let (id, tif, expiry) = {
            let o = handle.lock();
            (o.id().to_string(), o.tif(), o.expiry())
        };
        if tif == TimeInForce::Fake {
            return;
        }
        self.by_id.lock().insert(id, handle.clone());
        if tif == TimeInForce::GTD {
            if let Some(expiry) = expiry {
                self.expiry_index.lock().entry(expiry).or_default().push(handle.clone());
            }
        }
    }

    /// Process a batch sequentially; atomicity is per-order, not across the batch.
    pub fn process_many(&self, batch: Vec<OrderParams>) -> Vec<ExecutionResult> {
        batch.into_iter().map(|p| self.process_one(p)).collect()
    }

    #[tracing::instrument(skip(self), fields(symbol = %self.symbol))]
    pub fn cancel(&self, id: &str) -> CancelResult {
        let Some(handle) = self.by_id.lock().get(id).cloned() else {
            return CancelResult::failed(id.to_string(), err_text(ErrorType::UnknownOrder));
        };
        if !handle.lock().valid() {
            return CancelResult::failed(id.to_string(), err_text(ErrorType::NotCancelable));
        }
        let side = handle.lock().side();
        let canceled = match side {
            Side::Bid => self.bids.lock().cancel(&handle),
            Side::Ask => self.asks.lock().cancel(&handle),
        };
        if canceled {
            CancelResult::canceled(id.to_string())
        } else {
            CancelResult::failed(id.to_string(), err_text(ErrorType::NotCancelable))
        }
    }

    /* ---------- queries (read-only, never mutate) ---------- */

    pub fn get_status(&self, id: &str) -> Option<(OrderStatus, Quantity)> {
        let handle = self.by_id.lock().get(id).cloned()?;
        let o = handle.lock();
        Some((o.status(), o.quantity()))
    }

    pub fn best_ask(&self) -> Option<LevelInfo> {
        self.asks.lock().best()
    }

    pub fn best_bid(&self) -> Option<LevelInfo> {
        self.bids.lock().best()
    }

    pub fn best_asks(&self, n: usize) -> Vec<LevelInfo> {
        self.asks.lock().best_levels(n)
    }

    pub fn best_bids(&self, n: usize) -> Vec<LevelInfo> {
        self.bids.lock().best_levels(n)
    }

    pub fn n_asks(&self) -> usize {
        self.asks.lock().size()
    }

    pub fn n_bids(&self) -> usize {
        self.bids.lock().size()
    }

    pub fn n_prices(&self) -> usize {
        self.n_asks() + self.n_bids()
    }

    pub fn asks_volume(&self) -> Quantity {
        self.asks.lock().volume()
    }

    pub fn bids_volume(&self) -> Quantity {
        self.bids.lock().volume()
    }

    pub fn midprice(&self) -> Option<Price> {
        let ask = self.best_ask()?.0;
        let bid = self.best_bid()?.0;
        Some((ask + bid) / Decimal::TWO)
    }

    pub fn spread(&self) -> Option<Price> {
        let ask = self.best_ask()?.0;
        let bid = self.best_bid()?.0;
        Some(ask - bid)
    }

    pub fn depth(&self, n: usize) -> Depth {
        Depth { asks: self.best_asks(n), bids: self.best_bids(n) }
    }

    /* ---------- snapshot / updates ---------- */

    /// Build an empty, primed book: every `(price, volume)` pair becomes a
    /// synthetic `Fake`-tif order at that price. Requires `volume > 0`.
    pub fn from_snapshot(symbol: impl Into<String>, snapshot: Snapshot) -> Result<Self> {
        for &(price, volume) in snapshot.asks.iter().chain(snapshot.bids.iter()) {
            if price <= decimal::zero() || volume <= decimal::zero() {
                return Err(ErrorType::MalformedSnapshot.into());
            }
        }
        let book = Self::new(symbol);
        book.apply_updates(&snapshot.asks, &snapshot.bids)?;
        Ok(book)
    }

    /// Queue update frames to be consumed one at a time via `step()`.
    pub fn load_updates(&self, frames: impl IntoIterator<Item = Snapshot>) {
        self.update_queue.lock().extend(frames);
    }

    /// Apply the next queued update frame, if any. Returns whether a frame was applied.
    pub fn step(&self) -> Result<bool> {
        let frame = self.update_queue.lock().pop_front();
        match frame {
            Some(f) => {
                self.apply_updates(&f.asks, &f.bids)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply one update frame directly: a `volume = 0` pair deletes the
    /// Limit at that price; otherwise the synthetic order at that price is
    /// replaced with a fresh one of the given volume. Acquires both side
    /// locks in a fixed order (ask then bid).
    pub fn apply_updates(&self, asks: &[(Price, Quantity)], bids: &[(Price, Quantity)]) -> Result<()> {
        for &(price, volume) in asks.iter().chain(bids.iter()) {
            if price <= decimal::zero() || volume < decimal::zero() {
                return Err(ErrorType::MalformedSnapshot.into());
            }
        }

        let mut ask_side = self.asks.lock();
        let mut bid_side = self.bids.lock();

        for &(price, volume) in asks {
            apply_one_update(&mut ask_side, Side::Ask, price, volume);
        }
        for &(price, volume) in bids {
            apply_one_update(&mut bid_side, Side::Bid, price, volume);
        }
        Ok(())
    }

    /// Plain-text rendering of the top `n` levels on each side. Not part of the core contract.
    pub fn view(&self, n: usize) -> String {
        let asks = self.best_asks(n);
        let bids = self.best_bids(n);
        let mut out = String::new();
        out.push_str(&format!("{} order book\n", self.symbol));
        out.push_str("asks:\n");
        for (price, volume, count) in asks.iter().rev() {
            out.push_str(&format!("  {price} x {volume} ({count})\n"));
        }
        out.push_str("bids:\n");
        for (price, volume, count) in &bids {
            out.push_str(&format!("  {price} x {volume} ({count})\n"));
        }
        out
    }
}

impl Drop for OrderBook {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.view(crate::consts::DEFAULT_LIMITS_VIEW))
    }
}

/// Cumulative opposite-side volume at prices at least as aggressive as
/// `price` must reach `qty` before a FOK order may touch the book. The
/// caller must already hold `opposite`'s lock and keep holding it through
/// the subsequent `engine::execute` call, or the check is stale by the time
/// it's used.
fn fok_marketable(opposite: &BookSide, side: Side, price: Price, qty: Quantity) -> bool {
    let mut cumulative = decimal::zero();
    for (level_price, level_volume, _) in opposite.best_levels(usize::MAX) {
        let acceptable = match side {
            Side::Bid => level_price <= price,
            Side::Ask => level_price >= price,
        };
        if !acceptable {
            break;
        }
        cumulative += level_volume;
        if cumulative >= qty {
            return true;
        }
    }
    cumulative >= qty
}

fn apply_one_update(side: &mut BookSide, kind: Side, price: Price, volume: Quantity) {
    if side.has_price(price) {
        side.remove_price(price);
    }
    if !volume.is_zero() {
        let fake = order::fake_order(kind, price, volume).into_handle();
        side.place(fake);
    }
}

/// Background loop: wake every `REAPER_INTERVAL`, cancel GTD orders past
/// their deadline. Never holds the expiry-index lock across a side lock.
fn reaper_loop(
    asks: Arc<Mutex<BookSide>>,
    bids: Arc<Mutex<BookSide>>,
    expiry_index: Arc<Mutex<BTreeMap<i64, Vec<OrderHandle>>>>,
    alive: Arc<AtomicBool>,
) {
    while alive.load(Ordering::SeqCst) {
        thread::sleep(REAPER_INTERVAL);
        if !alive.load(Ordering::SeqCst) {
            break;
        }

        let now = current_timestamp_secs();
        let expired: Vec<OrderHandle> = {
            let mut index = expiry_index.lock();
            let expired_keys: Vec<i64> = index.range(..now).map(|(&k, _)| k).collect();
            expired_keys.into_iter().flat_map(|k| index.remove(&k).unwrap_or_default()).collect()
        };

        for handle in expired {
            if !handle.lock().valid() {
                continue;
            }
            let side = handle.lock().side();
            let canceled = match side {
                Side::Bid => bids.lock().cancel(&handle),
                Side::Ask => asks.lock().cancel(&handle),
            };
            if canceled {
                tracing::debug!(order_id = %handle.lock().id(), "GTD order expired");
            }
        }
    }
}

#[cfg(test)]
mod tests;
