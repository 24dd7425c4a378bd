//! Order identity, lifecycle and construction-time parameter validation.
//!
//! An [`Order`] is never built directly by a client: [`OrderParams`]
//! validates and quantizes price/quantity and checks GTD expiry before an
//! `Order` comes into existence. Once accepted, an order is shared between
//! the book's by-id history, its resting Limit and (for GTD) the expiry
//! index via an [`OrderHandle`].

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::decimal::{self, Price, Quantity};
use crate::enums::{OrderStatus, Side, TimeInForce};
use crate::error::{ErrorType, Result};
use crate::utils::current_timestamp_secs;

/// Opaque, process-unique order identifier (UUID v4, string form).
pub type OrderId = String;

/// A shared, lock-protected handle to an order.
///
/// The by-id history, a Limit's FIFO queue and the expiry index all hold
/// clones of the same `OrderHandle` rather than copies of the order, so a
/// fill or cancel performed through any one of them is visible to the
/// others immediately.
pub type OrderHandle = Arc<Mutex<Order>>;

/// A resting or in-flight order: `(id, side, price, qty_remaining, tif, expiry?, status)`.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    side: Side,
    price: Price,
    qty_remaining: Quantity,
    tif: TimeInForce,
    expiry: Option<i64>,
    status: OrderStatus,
}

impl Order {
    fn new(side: Side, price: Price, quantity: Quantity, tif: TimeInForce, expiry: Option<i64>) -> Self {
        Order {
            id: Uuid::new_v4().to_string(),
            side,
            price,
            qty_remaining: quantity,
            tif,
            expiry,
            status: OrderStatus::Created,
        }
    }

    pub(crate) fn into_handle(self) -> OrderHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Remaining (unfilled) quantity.
    pub fn quantity(&self) -> Quantity {
        self.qty_remaining
    }

    pub fn tif(&self) -> TimeInForce {
        self.tif
    }

    pub fn expiry(&self) -> Option<i64> {
        self.expiry
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// An order is cancelable/matchable iff its status is `Created`, `Pending` or `Partial`.
    pub fn valid(&self) -> bool {
        self.status.is_valid()
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    /// Decrease `qty_remaining` by `min(amount, qty_remaining)`.
    ///
    /// Drives status to `Filled` when the remaining quantity reaches zero,
    /// to `Partial` otherwise. `fill` is the only mutator of `qty_remaining`.
    pub fn fill(&mut self, amount: Quantity) {
        let deducted = amount.min(self.qty_remaining);
        self.qty_remaining -= deducted;
        self.status = if self.qty_remaining.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
    }
}

/// Validated, quantized order construction arguments.
///
/// `OrderParams::new` (and the `gtc`/`fok`/`gtd` convenience constructors)
/// are the only way to produce an [`Order`]: price and quantity are range
/// checked and quantized, and a GTD expiry is checked against the current
/// time, before any `Order` value exists.
#[derive(Debug, Clone, Copy)]
pub struct OrderParams {
    side: Side,
    price: Price,
    quantity: Quantity,
    tif: TimeInForce,
    expiry: Option<i64>,
}

impl OrderParams {
    /// Validate `(side, price, quantity, tif, expiry)`.
    ///
    /// Fails with `InvalidParams` when price or quantity fall outside
    /// `[MIN_VALUE, MAX_VALUE]`, or when `tif = GTD` and `expiry` is missing
    /// or not strictly in the future.
    pub fn new(
        side: Side,
        price: Price,
        quantity: Quantity,
        tif: TimeInForce,
        expiry: Option<i64>,
    ) -> Result<Self> {
        let price = decimal::validate(price)?;
        let quantity = decimal::validate(quantity)?;

        if tif == TimeInForce::GTD {
            let now = current_timestamp_secs();
            match expiry {
                Some(e) if e > now => {}
                _ => return Err(ErrorType::InvalidParams.into()),
            }
        }

        Ok(OrderParams { side, price, quantity, tif, expiry })
    }

    /// Good-till-canceled order.
    pub fn gtc(side: Side, price: Price, quantity: Quantity) -> Result<Self> {
        Self::new(side, price, quantity, TimeInForce::GTC, None)
    }

    /// Fill-or-kill order.
    pub fn fok(side: Side, price: Price, quantity: Quantity) -> Result<Self> {
        Self::new(side, price, quantity, TimeInForce::FOK, None)
    }

    /// Good-till-date order, expiring at `expiry` (UTC seconds).
    pub fn gtd(side: Side, price: Price, quantity: Quantity, expiry: i64) -> Result<Self> {
        Self::new(side, price, quantity, TimeInForce::GTD, Some(expiry))
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn tif(&self) -> TimeInForce {
        self.tif
    }

    pub fn expiry(&self) -> Option<i64> {
        self.expiry
    }

    /// Instantiate the `Order` this parameter set describes.
    pub(crate) fn into_order(self) -> Order {
        Order::new(self.side, self.price, self.quantity, self.tif, self.expiry)
    }
}

/// Build a synthetic, anonymous depth order for snapshot/update ingestion.
///
/// Fake orders are never validated against by-id history and carry
/// [`TimeInForce::Fake`]; they exist only to occupy a Limit's volume.
pub(crate) fn fake_order(side: Side, price: Price, quantity: Quantity) -> Order {
    Order::new(side, price, quantity, TimeInForce::Fake, None)
}
