use serde::Serialize;
use std::collections::BTreeMap;

use super::{OrderKey, Rating};
use crate::error::{AppError, AppResult};

/// What recording an order did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTransition {
    /// First time this order was placed
    Added,
    /// Second time: moved from one-time to repeated
    Promoted,
    /// Already repeated, nothing changed
    Unchanged,
}

/// A single user's orders, split by how often each was placed.
///
/// An order key lives in at most one of the two maps. Keys move
/// one-time -> repeated and never back, except through
/// [`OrderLedger::forget_repeated`] when a match is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLedger {
    one_time: BTreeMap<OrderKey, Rating>,
    repeated: BTreeMap<OrderKey, Rating>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored maps.
    ///
    /// Fails if a key is present in both maps.
    pub fn from_parts(
        one_time: BTreeMap<OrderKey, Rating>,
        repeated: BTreeMap<OrderKey, Rating>,
    ) -> AppResult<Self> {
        if let Some(key) = one_time.keys().find(|key| repeated.contains_key(*key)) {
            return Err(AppError::InvalidInput(format!(
                "{} is both a one-time and a repeated order",
                key
            )));
        }
        Ok(Self { one_time, repeated })
    }

    /// Records an order.
    ///
    /// A repeat order takes the rating given the second time; the rating
    /// captured at promotion is never updated afterwards.
    pub fn record(&mut self, key: OrderKey, rating: Rating) -> OrderTransition {
        if self.repeated.contains_key(&key) {
            return OrderTransition::Unchanged;
        }

        if self.one_time.remove(&key).is_some() {
            self.repeated.insert(key, rating);
            OrderTransition::Promoted
        } else {
            self.one_time.insert(key, rating);
            OrderTransition::Added
        }
    }

    pub fn one_time(&self) -> &BTreeMap<OrderKey, Rating> {
        &self.one_time
    }

    pub fn repeated(&self) -> &BTreeMap<OrderKey, Rating> {
        &self.repeated
    }

    /// Whether the user has ever placed this order
    pub fn has_tried(&self, key: &OrderKey) -> bool {
        self.one_time.contains_key(key) || self.repeated.contains_key(key)
    }

    /// First repeated order (in key order) that `other` also repeats
    pub fn first_shared_repeat<'a>(&'a self, other: &OrderLedger) -> Option<&'a OrderKey> {
        self.repeated
            .keys()
            .find(|key| other.repeated.contains_key(*key))
    }

    /// Drops a repeated order, returning its rating if it was present
    pub fn forget_repeated(&mut self, key: &OrderKey) -> Option<Rating> {
        self.repeated.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.one_time.is_empty() && self.repeated.is_empty()
    }
}
