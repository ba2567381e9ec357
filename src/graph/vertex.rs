use std::collections::BTreeMap;

use crate::models::{OrderLedger, UserId};

/// One user in the match graph
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: UserId,
    pub ledger: OrderLedger,
    /// Matched users and the cuisine each match was made on
    pub(super) neighbours: BTreeMap<UserId, String>,
}

impl Vertex {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ledger: OrderLedger::new(),
            neighbours: BTreeMap::new(),
        }
    }

    pub fn neighbours(&self) -> &BTreeMap<UserId, String> {
        &self.neighbours
    }

    pub fn is_matched(&self) -> bool {
        !self.neighbours.is_empty()
    }
}
