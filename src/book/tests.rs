use super::*;
use rust_decimal_macros::dec;
use std::thread::sleep;
use std::time::Duration;

fn running_book(symbol: &str) -> OrderBook {
    let book = OrderBook::new(symbol);
    book.start();
    book
}

fn place(book: &OrderBook, side: Side, price: Price, qty: Quantity, tif: TimeInForce, expiry: Option<i64>) -> ExecutionResult {
    let params = OrderParams::new(side, price, qty, tif, expiry).unwrap();
    book.process_one(params)
}

fn gtc(book: &OrderBook, side: Side, price: Price, qty: Quantity) -> ExecutionResult {
    place(book, side, price, qty, TimeInForce::GTC, None)
}

/// S1: simple placement.
#[test]
fn s1_simple_placement() {
    let book = running_book("S1");
    let result = gtc(&book, Side::Bid, dec!(100), dec!(10));
    assert!(result.success());
    assert_eq!(book.best_bid(), Some((dec!(100), dec!(10), 1)));
    assert_eq!(book.n_bids(), 1);
    assert_eq!(book.spread(), None);
}

/// S2: full match.
#[test]
fn s2_full_match() {
    let book = running_book("S2");
    let bid = gtc(&book, Side::Bid, dec!(100), dec!(10));
    let ExecutionResult::Limit(bid) = bid else { panic!("expected LimitResult") };

    let ask = gtc(&book, Side::Ask, dec!(100), dec!(10));
    let ExecutionResult::Market(ask) = ask else { panic!("expected MarketResult") };

    assert!(ask.success);
    assert_eq!(ask.limits_filled, 1);
    assert_eq!(ask.orders_filled, 1);
    assert_eq!(ask.exec_volume.get(&dec!(100)), Some(&dec!(10)));
    assert_eq!(book.n_asks(), 0);
    assert_eq!(book.n_bids(), 0);
    assert_eq!(book.get_status(bid.order_id.as_ref().unwrap()), Some((OrderStatus::Filled, dec!(0))));
}

/// S3: partial consume across levels.
#[test]
fn s3_partial_consume() {
    let book = running_book("S3");
    gtc(&book, Side::Bid, dec!(1400), dec!(200));
    gtc(&book, Side::Bid, dec!(1300), dec!(200));
    gtc(&book, Side::Bid, dec!(1400), dec!(200));
    gtc(&book, Side::Bid, dec!(1300), dec!(200));

    let ExecutionResult::Market(result) = gtc(&book, Side::Ask, dec!(1300), dec!(500)) else {
        panic!("expected MarketResult")
    };

    assert_eq!(result.limits_filled, 1);
    assert_eq!(result.orders_filled, 2);
    assert_eq!(result.exec_volume.get(&dec!(1400)), Some(&dec!(400)));
    assert_eq!(result.exec_volume.get(&dec!(1300)), Some(&dec!(100)));
    assert_eq!(book.best_bid(), Some((dec!(1300), dec!(300), 2)));
}

/// S4: FOK reject preserves the book; later FOK partially sweeps a level.
#[test]
fn s4_fok_reject_preserves_book() {
    let book = running_book("S4");
    for _ in 0..5 {
        gtc(&book, Side::Ask, dec!(125), dec!(100));
    }

    let rejected_not_marketable = place(&book, Side::Bid, dec!(120), dec!(1), TimeInForce::FOK, None);
    assert!(!rejected_not_marketable.success());
    assert_eq!(book.n_asks(), 5);
    assert_eq!(book.asks_volume(), dec!(500));

    let rejected_insufficient = place(&book, Side::Bid, dec!(125), dec!(525), TimeInForce::FOK, None);
    assert!(!rejected_insufficient.success());
    assert_eq!(book.asks_volume(), dec!(500), "book must be bitwise unchanged after a failed FOK");

    let accepted = place(&book, Side::Bid, dec!(125), dec!(425), TimeInForce::FOK, None);
    let ExecutionResult::Market(accepted) = accepted else { panic!("expected MarketResult") };
    assert!(accepted.success);
    assert_eq!(accepted.exec_volume.get(&dec!(125)), Some(&dec!(425)));
    assert_eq!(book.best_ask(), Some((dec!(125), dec!(75), 1)));
}

/// S5: GTD expiry via the background reaper.
#[test]
fn s5_gtd_expiry() {
    let book = running_book("S5");
    let now = current_timestamp_secs();
    let ExecutionResult::Limit(placed) =
        place(&book, Side::Bid, dec!(1000), dec!(1000), TimeInForce::GTD, Some(now + 1))
    else {
        panic!("expected LimitResult")
    };

    sleep(Duration::from_millis(1300));

    let (status, qty) = book.get_status(placed.order_id.as_ref().unwrap()).unwrap();
    assert_eq!(status, OrderStatus::Canceled);
    assert_eq!(qty, dec!(1000));
    assert_eq!(book.n_bids(), 0);
}

/// S6: snapshot prime.
#[test]
fn s6_snapshot_prime() {
    let snapshot = Snapshot {
        asks: vec![(dec!(101), dec!(10)), (dec!(102), dec!(10))],
        bids: vec![(dec!(99), dec!(10)), (dec!(98), dec!(10))],
    };
    let book = OrderBook::from_snapshot("S6", snapshot).unwrap();

    assert_eq!(book.best_ask(), Some((dec!(101), dec!(10), 1)));
    assert_eq!(book.best_bid(), Some((dec!(99), dec!(10), 1)));
    assert_eq!(book.midprice(), Some(dec!(100)));
    assert_eq!(book.spread(), Some(dec!(2)));
}

#[test]
fn snapshot_round_trips_through_json() {
    let snapshot = Snapshot {
        asks: vec![(dec!(101), dec!(10)), (dec!(102), dec!(10))],
        bids: vec![(dec!(99), dec!(10))],
    };
    let encoded = serde_json::to_string(&snapshot).unwrap();
    let decoded: Snapshot = serde_json::from_str(&encoded).unwrap();
    assert_eq!(snapshot, decoded);
}

#[test]
fn process_one_rejects_when_not_running() {
    let book = OrderBook::new("NOTSTARTED");
    let result = gtc(&book, Side::Bid, dec!(100), dec!(10));
    assert!(!result.success());
}

#[test]
fn cancel_is_idempotent() {
    let book = running_book("CANCEL");
    let ExecutionResult::Limit(placed) = gtc(&book, Side::Bid, dec!(100), dec!(10)) else {
        panic!("expected LimitResult")
    };
    let id = placed.order_id.unwrap();

    let first = book.cancel(&id);
    assert!(first.success);
    assert_eq!(book.n_bids(), 0);

    let second = book.cancel(&id);
    assert!(!second.success);
}

#[test]
fn cancel_unknown_id_reports_unknown_order() {
    let book = running_book("UNKNOWN");
    let result = book.cancel("never-placed");
    assert!(!result.success);
}

#[test]
fn resting_fok_is_rejected_without_mutating_book() {
    let book = running_book("RESTINGFOK");
    let result = place(&book, Side::Bid, dec!(100), dec!(10), TimeInForce::FOK, None);
    assert!(!result.success());
    assert_eq!(book.n_bids(), 0);
}

#[test]
fn apply_updates_replaces_and_deletes_levels() {
    let book = OrderBook::new("UPDATES");
    book.apply_updates(&[(dec!(101), dec!(5))], &[]).unwrap();
    assert_eq!(book.best_ask(), Some((dec!(101), dec!(5), 1)));

    book.apply_updates(&[(dec!(101), dec!(8))], &[]).unwrap();
    assert_eq!(book.best_ask(), Some((dec!(101), dec!(8), 1)));

    book.apply_updates(&[(dec!(101), dec!(0))], &[]).unwrap();
    assert_eq!(book.best_ask(), None);
}

#[test]
fn reset_requires_stopped_book() {
    let book = running_book("RESET");
    assert!(book.reset().is_err());
    book.stop();
    assert!(book.reset().is_ok());
}

#[test]
fn running_time_advances_after_start() {
    let book = running_book("TIMING");
    sleep(Duration::from_millis(20));
    assert!(book.running_time().unwrap() >= 20);
}
