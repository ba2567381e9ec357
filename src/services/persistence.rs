use chrono::Utc;
use std::collections::BTreeMap;

use crate::{
    db::SnapshotStore,
    error::{AppError, AppResult},
    graph::MatchGraph,
    models::{NeighbourRecord, OrderKey, OrderLedger, OrderRecord, Rating, UserId, UserSnapshot},
};

/// Takes a snapshot of one user's ledger and matches.
///
/// Matches still waiting on an unloaded user are included so that saving
/// never drops them.
pub fn capture(graph: &MatchGraph, user: UserId) -> AppResult<UserSnapshot> {
    let vertex = graph.vertex(user)?;

    let records = |orders: &BTreeMap<OrderKey, Rating>| -> Vec<OrderRecord> {
        orders
            .iter()
            .map(|(key, rating)| OrderRecord::new(key, *rating))
            .collect()
    };

    let mut neighbours: Vec<NeighbourRecord> = vertex
        .neighbours()
        .iter()
        .map(|(id, cuisine)| NeighbourRecord {
            user_id: *id,
            cuisine: cuisine.clone(),
        })
        .collect();
    neighbours.extend(
        graph
            .pending_neighbours(user)
            .into_iter()
            .map(|(id, cuisine)| NeighbourRecord {
                user_id: id,
                cuisine: cuisine.to_string(),
            }),
    );

    Ok(UserSnapshot {
        user_id: user,
        one_time: records(vertex.ledger.one_time()),
        repeated: records(vertex.ledger.repeated()),
        neighbours,
        saved_at: Utc::now(),
    })
}

/// Applies a snapshot to the graph.
///
/// The user's vertex is created if missing and its ledger replaced by the
/// stored one. Stored matches are added on top of any the graph already has;
/// matches to users not in the graph wait until those users are added.
/// The snapshot is validated before anything is changed.
pub fn restore(graph: &mut MatchGraph, snapshot: UserSnapshot) -> AppResult<()> {
    let user = snapshot.user_id;

    let to_map = |records: Vec<OrderRecord>| -> AppResult<BTreeMap<OrderKey, Rating>> {
        let mut orders = BTreeMap::new();
        for record in records {
            let (key, rating) = record.into_parts()?;
            if orders.contains_key(&key) {
                return Err(AppError::InvalidInput(format!(
                    "{} is listed more than once",
                    key
                )));
            }
            orders.insert(key, rating);
        }
        Ok(orders)
    };
    let ledger = OrderLedger::from_parts(to_map(snapshot.one_time)?, to_map(snapshot.repeated)?)?;

    if snapshot.neighbours.iter().any(|n| n.user_id == user) {
        return Err(AppError::SelfEdge(user));
    }

    graph.add_vertex(user);
    graph.vertex_mut(user)?.ledger = ledger;

    let mut deferred = 0;
    for neighbour in &snapshot.neighbours {
        if !graph.restore_edge(user, neighbour.user_id, &neighbour.cuisine)? {
            deferred += 1;
        }
    }

    tracing::debug!(
        user_id = %user,
        matches = snapshot.neighbours.len(),
        deferred,
        "Restored snapshot"
    );
    Ok(())
}

/// Persists one user's current state
pub async fn save_user(store: &dyn SnapshotStore, graph: &MatchGraph, user: UserId) -> AppResult<()> {
    let snapshot = capture(graph, user)?;
    store.save(&snapshot).await?;

    tracing::info!(user_id = %user, backend = store.name(), "Saved user");
    Ok(())
}

/// Loads one user's saved state into the graph
pub async fn load_user(store: &dyn SnapshotStore, graph: &mut MatchGraph, user: UserId) -> AppResult<()> {
    let snapshot = store.load(user).await?;
    if snapshot.user_id != user {
        return Err(AppError::Internal(format!(
            "snapshot for user {} belongs to user {}",
            user, snapshot.user_id
        )));
    }
    restore(graph, snapshot)?;

    tracing::info!(user_id = %user, backend = store.name(), "Loaded user");
    Ok(())
}
