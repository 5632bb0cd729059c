//! Per-market order book reconstruction
//!
//! A [`MarketStreamState`] is seeded from the stream's snapshot frame and then
//! advanced one [`UpdateMessage`] at a time. Each update is applied in a fixed
//! order:
//!
//! ```text
//! sequence check → trades → create → delete → status → sequence
//! ```
//!
//! An update whose sequence is not ahead of the book is rejected without
//! touching any state.

use crate::order::Order;
use crate::order_set::OrderSet;
use crate::snapshot::MarketState;
use luno_types::{
    BookSide, CreateUpdate, LunoError, LunoResult, MarketStatus, SnapshotMessage, TradeUpdate,
    UpdateMessage,
};
use tracing::{debug, trace};

/// Update rejected because it is not newer than the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfOrderUpdate {
    /// Sequence the book is at
    pub current: u64,
    /// Sequence carried by the rejected update
    pub received: u64,
}

impl std::fmt::Display for OutOfOrderUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Out of order update: book at sequence {}, received {}",
            self.current, self.received
        )
    }
}

impl std::error::Error for OutOfOrderUpdate {}

/// Live order book of a single market
#[derive(Debug, Clone)]
pub struct MarketStreamState {
    sequence: u64,
    bids: OrderSet,
    asks: OrderSet,
    status: MarketStatus,
}

impl MarketStreamState {
    /// Build the book from the first frame of a stream
    ///
    /// Fails with [`LunoError::InvalidInitialState`] if there is no snapshot.
    pub fn new(first: Option<&SnapshotMessage>) -> LunoResult<Self> {
        first.map(Self::from).ok_or_else(|| {
            LunoError::InvalidInitialState("stream did not start with a snapshot".to_string())
        })
    }

    /// Sequence of the last applied update (or of the snapshot)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Current market status
    pub fn status(&self) -> &MarketStatus {
        &self.status
    }

    /// Buy side
    pub fn bids(&self) -> &OrderSet {
        &self.bids
    }

    /// Sell side
    pub fn asks(&self) -> &OrderSet {
        &self.asks
    }

    /// Apply one incremental update
    ///
    /// On `Err` the book is exactly as it was before the call.
    pub fn apply_update(&mut self, update: &UpdateMessage) -> Result<(), OutOfOrderUpdate> {
        if update.sequence <= self.sequence {
            return Err(OutOfOrderUpdate {
                current: self.sequence,
                received: update.sequence,
            });
        }

        for trade in &update.trade_updates {
            self.apply_trade(trade);
        }

        if let Some(create) = &update.create_update {
            self.apply_create(create);
        }

        if let Some(delete) = &update.delete_update {
            self.asks.remove(&delete.order_id);
            self.bids.remove(&delete.order_id);
        }

        if let Some(status) = &update.status_update {
            self.status = status.status.clone();
        }

        self.sequence = update.sequence;
        Ok(())
    }

    /// Copy the book out as an immutable [`MarketState`]
    pub fn snapshot(&self) -> MarketState {
        MarketState {
            sequence: self.sequence,
            asks: self.asks.snapshot(false),
            bids: self.bids.snapshot(true),
            status: self.status.clone(),
        }
    }

    // Trades do not say which side the maker rested on
    fn apply_trade(&mut self, trade: &TradeUpdate) {
        self.asks.remove_and_decrement(&trade.maker_order_id, trade.base);
        self.bids.remove_and_decrement(&trade.maker_order_id, trade.base);
    }

    fn apply_create(&mut self, create: &CreateUpdate) {
        let Some(side) = create.side() else {
            trace!(
                order_id = %create.order_id,
                order_type = %create.order_type,
                "Dropping create update with unknown type"
            );
            return;
        };

        let order = Order::new(create.order_id.clone(), create.price, create.volume);
        self.side_mut(side.opposite()).remove(&order.order_id);
        self.side_mut(side).insert(order);
    }

    fn side_mut(&mut self, side: BookSide) -> &mut OrderSet {
        match side {
            BookSide::Bid => &mut self.bids,
            BookSide::Ask => &mut self.asks,
        }
    }
}

impl From<&SnapshotMessage> for MarketStreamState {
    fn from(snapshot: &SnapshotMessage) -> Self {
        let mut bids = OrderSet::new();
        let mut asks = OrderSet::new();

        for entry in &snapshot.bids {
            bids.insert(Order::from(entry));
        }
        // An id listed on both sides keeps its ask entry
        for entry in &snapshot.asks {
            if bids.remove(&entry.id).is_some() {
                debug!(order_id = %entry.id, "Order listed on both sides of snapshot");
            }
            asks.insert(Order::from(entry));
        }

        Self {
            sequence: snapshot.sequence,
            bids,
            asks,
            status: snapshot.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luno_types::OrderEntry;
    use rust_decimal_macros::dec;

    fn make_snapshot(sequence: u64) -> SnapshotMessage {
        SnapshotMessage {
            sequence,
            status: MarketStatus::Active,
            asks: vec![
                OrderEntry::new("a1", dec!(101), dec!(3)),
                OrderEntry::new("a2", dec!(102), dec!(1)),
            ],
            bids: vec![
                OrderEntry::new("b1", dec!(100), dec!(2)),
                OrderEntry::new("b2", dec!(99), dec!(5)),
            ],
            timestamp: None,
        }
    }

    fn make_state() -> MarketStreamState {
        MarketStreamState::from(&make_snapshot(10))
    }

    #[test]
    fn test_new_requires_snapshot() {
        assert!(matches!(
            MarketStreamState::new(None),
            Err(LunoError::InvalidInitialState(_))
        ));

        let state = MarketStreamState::new(Some(&make_snapshot(7))).unwrap();
        assert_eq!(state.sequence(), 7);
        assert_eq!(state.status(), &MarketStatus::Active);
        assert_eq!(state.bids().len(), 2);
        assert_eq!(state.asks().len(), 2);
    }

    #[test]
    fn test_snapshot_with_id_on_both_sides_keeps_ask() {
        let mut snapshot = make_snapshot(3);
        snapshot.bids.push(OrderEntry::new("a2", dec!(98), dec!(4)));

        let state = MarketStreamState::from(&snapshot);
        assert!(!state.bids().contains("a2"));
        assert!(state.asks().contains("a2"));
        assert_eq!(state.bids().len(), 2);
    }

    #[test]
    fn test_snapshot_sorted() {
        let snap = make_state().snapshot();
        let asks: Vec<_> = snap.asks.iter().map(|o| o.order_id.as_str()).collect();
        let bids: Vec<_> = snap.bids.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(asks, vec!["a1", "a2"]);
        assert_eq!(bids, vec!["b1", "b2"]);
    }

    #[test]
    fn test_stale_and_duplicate_updates_rejected() {
        let mut state = make_state();
        let before = state.snapshot();

        let stale = UpdateMessage::new(9).with_delete("a1");
        assert_eq!(
            state.apply_update(&stale),
            Err(OutOfOrderUpdate {
                current: 10,
                received: 9
            })
        );

        let duplicate = UpdateMessage::new(10).with_delete("a1");
        assert!(state.apply_update(&duplicate).is_err());

        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_gap_accepted() {
        let mut state = make_state();
        state.apply_update(&UpdateMessage::new(15)).unwrap();
        assert_eq!(state.sequence(), 15);
    }

    #[test]
    fn test_trade_hits_whichever_side_holds_the_order() {
        let mut state = make_state();
        let update = UpdateMessage::new(11)
            .with_trade(TradeUpdate::new("a1", dec!(1)))
            .with_trade(TradeUpdate::new("b2", dec!(5)));
        state.apply_update(&update).unwrap();

        assert_eq!(state.asks().get("a1").unwrap().volume, dec!(2));
        assert!(!state.bids().contains("b2"));
        assert_eq!(state.bids().len(), 1);
    }

    #[test]
    fn test_trade_unknown_maker_is_noop() {
        let mut state = make_state();
        let before = state.snapshot();
        let update = UpdateMessage::new(11).with_trade(TradeUpdate::new("zz", dec!(1)));
        state.apply_update(&update).unwrap();

        let after = state.snapshot();
        assert_eq!(after.asks, before.asks);
        assert_eq!(after.bids, before.bids);
        assert_eq!(after.sequence, 11);
    }

    #[test]
    fn test_create_bid_and_ask() {
        let mut state = make_state();
        state
            .apply_update(
                &UpdateMessage::new(11).with_create(CreateUpdate::new(
                    "b3",
                    dec!(100.5),
                    dec!(1),
                    BookSide::Bid,
                )),
            )
            .unwrap();
        state
            .apply_update(
                &UpdateMessage::new(12).with_create(CreateUpdate::new(
                    "a3",
                    dec!(100.75),
                    dec!(4),
                    BookSide::Ask,
                )),
            )
            .unwrap();

        let snap = state.snapshot();
        assert_eq!(snap.best_bid().unwrap().order_id, "b3");
        assert_eq!(snap.best_ask().unwrap().order_id, "a3");
        assert_eq!(snap.spread(), Some(dec!(0.25)));
    }

    #[test]
    fn test_create_unknown_type_dropped() {
        let mut state = make_state();
        let mut create = CreateUpdate::new("x1", dec!(100), dec!(1), BookSide::Bid);
        create.order_type = "STOP".to_string();

        state
            .apply_update(&UpdateMessage::new(11).with_create(create))
            .unwrap();

        assert!(!state.bids().contains("x1"));
        assert!(!state.asks().contains("x1"));
        assert_eq!(state.sequence(), 11);
    }

    #[test]
    fn test_create_moves_id_across_sides() {
        let mut state = make_state();
        let update = UpdateMessage::new(11).with_create(CreateUpdate::new(
            "b1",
            dec!(105),
            dec!(1),
            BookSide::Ask,
        ));
        state.apply_update(&update).unwrap();

        assert!(!state.bids().contains("b1"));
        assert_eq!(state.asks().get("b1").unwrap().price, dec!(105));
    }

    #[test]
    fn test_delete_either_side() {
        let mut state = make_state();
        state
            .apply_update(&UpdateMessage::new(11).with_delete("a2"))
            .unwrap();
        state
            .apply_update(&UpdateMessage::new(12).with_delete("b1"))
            .unwrap();
        state
            .apply_update(&UpdateMessage::new(13).with_delete("missing"))
            .unwrap();

        assert_eq!(state.asks().len(), 1);
        assert_eq!(state.bids().len(), 1);
    }

    #[test]
    fn test_status_update() {
        let mut state = make_state();
        state
            .apply_update(&UpdateMessage::new(11).with_status(MarketStatus::PostOnly))
            .unwrap();
        assert_eq!(state.status(), &MarketStatus::PostOnly);
        assert_eq!(state.snapshot().status, MarketStatus::PostOnly);
    }

    #[test]
    fn test_steps_run_in_fixed_order() {
        // Trade, create and delete of the same id in one update: the create
        // re-adds the fully traded order and the delete then removes it.
        let mut state = make_state();
        let update = UpdateMessage::new(11)
            .with_trade(TradeUpdate::new("a1", dec!(3)))
            .with_create(CreateUpdate::new("a1", dec!(101), dec!(9), BookSide::Ask))
            .with_delete("a1")
            .with_status(MarketStatus::Disabled);
        state.apply_update(&update).unwrap();

        assert!(!state.asks().contains("a1"));
        assert_eq!(state.status(), &MarketStatus::Disabled);
        assert_eq!(state.sequence(), 11);
    }

    #[test]
    fn test_snapshot_detached_from_book() {
        let mut state = make_state();
        let before = state.snapshot();
        state
            .apply_update(&UpdateMessage::new(11).with_delete("a1"))
            .unwrap();

        assert_eq!(before.asks.len(), 2);
        assert_eq!(state.snapshot().asks.len(), 1);
    }

    #[test]
    fn test_out_of_order_display() {
        let err = OutOfOrderUpdate {
            current: 5,
            received: 3,
        };
        assert_eq!(
            err.to_string(),
            "Out of order update: book at sequence 5, received 3"
        );
    }
}
