use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderRecord, UserId};

/// A match as stored in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighbourRecord {
    pub user_id: UserId,
    /// Cuisine the match was made on
    pub cuisine: String,
}

/// Everything persisted for one user: both halves of the ledger and the
/// user's matches with their labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub user_id: UserId,
    pub one_time: Vec<OrderRecord>,
    pub repeated: Vec<OrderRecord>,
    pub neighbours: Vec<NeighbourRecord>,
    pub saved_at: DateTime<Utc>,
}
