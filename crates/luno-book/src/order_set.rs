//! One side of the order book, keyed by order ID
//!
//! Hybrid storage:
//! - HashMap for order lookup by ID (O(1) trade and delete handling)
//! - BTreeSet of `(price, order_id)` for sorted iteration without re-sorting
//!
//! Orders at the same price are ordered by ID, so snapshots are deterministic.

use crate::order::Order;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

/// Resting orders for one side of a market
#[derive(Debug, Clone, Default)]
pub struct OrderSet {
    /// Order index: order_id -> order
    orders: HashMap<String, Order>,
    /// Price index, ascending
    by_price: BTreeSet<(Decimal, String)>,
}

impl OrderSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order, replacing any order with the same ID
    pub fn insert(&mut self, order: Order) {
        let key = (order.price, order.order_id.clone());
        if let Some(previous) = self.orders.insert(order.order_id.clone(), order) {
            self.by_price.remove(&(previous.price, previous.order_id));
        }
        self.by_price.insert(key);
    }

    /// Remove an order by ID
    ///
    /// Returns the removed order if found
    pub fn remove(&mut self, order_id: &str) -> Option<Order> {
        let order = self.orders.remove(order_id)?;
        self.by_price.remove(&(order.price, order.order_id.clone()));
        Some(order)
    }

    /// Reduce an order's volume by a traded amount
    ///
    /// The order is dropped once its remaining volume is zero or negative.
    /// Unknown IDs are ignored. Returns true if the order was present.
    pub fn remove_and_decrement(&mut self, order_id: &str, volume: Decimal) -> bool {
        let Some(order) = self.orders.get_mut(order_id) else {
            return false;
        };

        let remaining = order.volume - volume;
        if remaining > Decimal::ZERO {
            *order = order.with_volume(remaining);
        } else {
            self.remove(order_id);
        }
        true
    }

    /// All orders sorted by price, ascending or descending
    ///
    /// Always returns a fresh vector; later changes to the set are not
    /// visible through it.
    pub fn snapshot(&self, descending: bool) -> Vec<Order> {
        if descending {
            self.by_price
                .iter()
                .rev()
                .filter_map(|(_, id)| self.orders.get(id).cloned())
                .collect()
        } else {
            self.by_price
                .iter()
                .filter_map(|(_, id)| self.orders.get(id).cloned())
                .collect()
        }
    }

    /// Best order: lowest price when ascending, highest when descending
    pub fn best(&self, descending: bool) -> Option<&Order> {
        let key = if descending {
            self.by_price.iter().next_back()
        } else {
            self.by_price.iter().next()
        }?;
        self.orders.get(&key.1)
    }

    /// Get an order by ID
    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Check if an order exists
    pub fn contains(&self, order_id: &str) -> bool {
        self.orders.contains_key(order_id)
    }

    /// Iterate over order IDs (unordered)
    pub fn order_ids(&self) -> impl Iterator<Item = &str> {
        self.orders.keys().map(String::as_str)
    }

    /// Number of orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Total resting volume
    pub fn total_volume(&self) -> Decimal {
        self.orders.values().map(|o| o.volume).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn set_of(orders: &[(&str, Decimal, Decimal)]) -> OrderSet {
        let mut set = OrderSet::new();
        for (id, price, volume) in orders {
            set.insert(Order::new(*id, *price, *volume));
        }
        set
    }

    #[test]
    fn test_insert_and_get() {
        let set = set_of(&[("o1", dec!(100), dec!(1)), ("o2", dec!(101), dec!(2))]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("o1"));
        assert_eq!(set.get("o2").unwrap().volume, dec!(2));
        assert_eq!(set.total_volume(), dec!(3));
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut set = set_of(&[("o1", dec!(100), dec!(1))]);
        set.insert(Order::new("o1", dec!(105), dec!(4)));

        assert_eq!(set.len(), 1);
        assert_eq!(set.snapshot(false), vec![Order::new("o1", dec!(105), dec!(4))]);
    }

    #[test]
    fn test_remove() {
        let mut set = set_of(&[("o1", dec!(100), dec!(1))]);
        assert_eq!(set.remove("o1").unwrap().order_id, "o1");
        assert!(set.remove("o1").is_none());
        assert!(set.is_empty());
        assert!(set.snapshot(false).is_empty());
    }

    #[test]
    fn test_partial_decrement() {
        let mut set = set_of(&[("o1", dec!(100), dec!(3))]);
        assert!(set.remove_and_decrement("o1", dec!(1.25)));
        assert_eq!(set.get("o1").unwrap().volume, dec!(1.75));
        assert_eq!(set.get("o1").unwrap().price, dec!(100));
    }

    #[test]
    fn test_full_decrement_removes() {
        let mut set = set_of(&[("o1", dec!(100), dec!(3)), ("o2", dec!(100), dec!(3))]);
        set.remove_and_decrement("o1", dec!(3));
        set.remove_and_decrement("o2", dec!(5));
        assert!(set.is_empty());
        assert!(set.best(false).is_none());
    }

    #[test]
    fn test_decrement_unknown_is_noop() {
        let mut set = set_of(&[("o1", dec!(100), dec!(3))]);
        assert!(!set.remove_and_decrement("missing", dec!(1)));
        assert_eq!(set.snapshot(false), vec![Order::new("o1", dec!(100), dec!(3))]);
    }

    #[test]
    fn test_snapshot_ordering() {
        let set = set_of(&[
            ("o1", dec!(101), dec!(1)),
            ("o2", dec!(99.5), dec!(1)),
            ("o3", dec!(100), dec!(1)),
        ]);

        let asc: Vec<_> = set.snapshot(false).into_iter().map(|o| o.price).collect();
        assert_eq!(asc, vec![dec!(99.5), dec!(100), dec!(101)]);

        let desc: Vec<_> = set.snapshot(true).into_iter().map(|o| o.price).collect();
        assert_eq!(desc, vec![dec!(101), dec!(100), dec!(99.5)]);

        assert_eq!(set.best(false).unwrap().order_id, "o2");
        assert_eq!(set.best(true).unwrap().order_id, "o1");
    }

    #[test]
    fn test_equal_prices_ordered_by_id() {
        let set = set_of(&[("b", dec!(100), dec!(1)), ("a", dec!(100.0), dec!(2))]);
        let ids: Vec<_> = set.snapshot(false).into_iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut set = set_of(&[("o1", dec!(100), dec!(3))]);
        let before = set.snapshot(false);

        set.remove_and_decrement("o1", dec!(1));
        set.insert(Order::new("o2", dec!(90), dec!(1)));

        assert_eq!(before, vec![Order::new("o1", dec!(100), dec!(3))]);
    }
}
