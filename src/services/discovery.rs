use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::{
    error::AppResult,
    graph::MatchGraph,
    models::{OrderKey, UserId},
};

/// A match created by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMatch {
    pub user_id: UserId,
    pub cuisine: String,
    /// The repeated order both users share
    pub order: OrderKey,
}

/// Connects every pair of distinct, unmatched users that repeat a common order.
///
/// Users are bucketed by repeated order so only users sharing at least one
/// order are ever compared. Each pair is matched at most once, on the first
/// shared order in the lower id's key order. Returns the number of matches
/// added.
pub fn discover_all(graph: &mut MatchGraph) -> usize {
    let mut by_order: BTreeMap<&OrderKey, Vec<UserId>> = BTreeMap::new();
    for vertex in graph.vertices() {
        for key in vertex.ledger.repeated().keys() {
            by_order.entry(key).or_default().push(vertex.id);
        }
    }

    let mut seen: HashSet<(UserId, UserId)> = HashSet::new();
    let mut found: Vec<(UserId, UserId, String)> = Vec::new();

    for vertex in graph.vertices() {
        let x = vertex.id;
        for key in vertex.ledger.repeated().keys() {
            let Some(sharers) = by_order.get(key) else {
                continue;
            };
            for &y in sharers {
                // Self-pairs are excluded explicitly; the vertex is always in
                // its own bucket.
                if x == y {
                    continue;
                }
                let pair = (x.min(y), x.max(y));
                if graph.adjacent(x, y) || !seen.insert(pair) {
                    continue;
                }
                found.push((x, y, key.cuisine.clone()));
            }
        }
    }

    let added = found.len();
    for (x, y, cuisine) in found {
        // Both ids come from the graph and differ, so this cannot fail.
        if let Err(e) = graph.add_edge(x, y, &cuisine) {
            tracing::error!(error = %e, user_id = %x, neighbour = %y, "Failed to add discovered match");
        }
    }

    tracing::info!(
        users = graph.len(),
        matches = added,
        "Batch match discovery complete"
    );
    added
}

/// Matches `user` against every other user it is not yet matched with,
/// typically right after one of its orders was recorded.
///
/// Already-matched pairs are never re-evaluated. Finding nothing is the
/// normal outcome and yields an empty list.
pub fn discover_for(graph: &mut MatchGraph, user: UserId) -> AppResult<Vec<NewMatch>> {
    let candidates: Vec<NewMatch> = {
        let me = graph.vertex(user)?;
        if me.ledger.repeated().is_empty() {
            return Ok(Vec::new());
        }

        graph
            .vertices()
            .filter(|other| other.id != user && !graph.adjacent(user, other.id))
            .filter_map(|other| {
                me.ledger
                    .first_shared_repeat(&other.ledger)
                    .map(|key| NewMatch {
                        user_id: other.id,
                        cuisine: key.cuisine.clone(),
                        order: key.clone(),
                    })
            })
            .collect()
    };

    for new_match in &candidates {
        graph.add_edge(user, new_match.user_id, &new_match.cuisine)?;
    }

    if !candidates.is_empty() {
        tracing::info!(
            user_id = %user,
            new_matches = candidates.len(),
            "Incremental match discovery found matches"
        );
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;

    fn uid(id: u32) -> UserId {
        UserId::new(id)
    }

    fn order_n(graph: &mut MatchGraph, id: u32, restaurant: &str, cuisine: &str, times: usize) {
        graph.add_vertex(uid(id));
        for _ in 0..times {
            graph
                .record_order(uid(id), restaurant, cuisine, Rating::Given(4))
                .unwrap();
        }
    }

    /// Straightforward pairwise scan used as a reference for the indexed pass
    fn naive_pairs(graph: &MatchGraph) -> HashSet<(UserId, UserId)> {
        let mut pairs = HashSet::new();
        for x in graph.vertices() {
            for y in graph.vertices() {
                if x.id != y.id && x.ledger.first_shared_repeat(&y.ledger).is_some() {
                    pairs.insert((x.id.min(y.id), x.id.max(y.id)));
                }
            }
        }
        pairs
    }

    #[test]
    fn test_batch_matches_users_with_shared_repeat() {
        let mut graph = MatchGraph::new();
        order_n(&mut graph, 1000, "Pizza Place", "Italian", 2);
        order_n(&mut graph, 2000, "Pizza Place", "Italian", 3);
        order_n(&mut graph, 3000, "Pizza Place", "Italian", 1);

        let added = discover_all(&mut graph);

        assert_eq!(added, 1);
        assert_eq!(graph.label(uid(1000), uid(2000)), Some("Italian"));
        assert!(!graph.adjacent(uid(1000), uid(3000)));
    }

    #[test]
    fn test_batch_never_creates_self_edges() {
        let mut graph = MatchGraph::new();
        order_n(&mut graph, 1000, "Pizza Place", "Italian", 2);
        order_n(&mut graph, 1000, "Curry Corner", "Indian", 2);

        assert_eq!(discover_all(&mut graph), 0);
        assert!(graph.neighbours_of(uid(1000)).unwrap().is_empty());
    }

    #[test]
    fn test_batch_one_edge_per_pair() {
        let mut graph = MatchGraph::new();
        for id in [1000, 2000] {
            order_n(&mut graph, id, "Pizza Place", "Italian", 2);
            order_n(&mut graph, id, "Curry Corner", "Indian", 2);
        }

        assert_eq!(discover_all(&mut graph), 1);
        assert_eq!(graph.edge_count(), 1);
        // First shared order in key order wins.
        assert_eq!(graph.label(uid(1000), uid(2000)), Some("Indian"));
    }

    #[test]
    fn test_batch_keeps_existing_labels() {
        let mut graph = MatchGraph::new();
        order_n(&mut graph, 1000, "Pizza Place", "Italian", 2);
        order_n(&mut graph, 2000, "Pizza Place", "Italian", 2);
        graph.add_edge(uid(1000), uid(2000), "Mexican").unwrap();

        assert_eq!(discover_all(&mut graph), 0);
        assert_eq!(graph.label(uid(1000), uid(2000)), Some("Mexican"));
    }

    #[test]
    fn test_batch_agrees_with_pairwise_scan() {
        let mut graph = MatchGraph::new();
        let rows = [
            (1000, "Pizza Place", "Italian", 2),
            (1000, "Taco Truck", "Mexican", 2),
            (2000, "Taco Truck", "Mexican", 2),
            (3000, "Pizza Place", "Italian", 3),
            (3000, "Sushi Bar", "Japanese", 2),
            (4000, "Sushi Bar", "Japanese", 2),
            (5000, "Sushi Bar", "Japanese", 1),
            (6000, "Curry Corner", "Indian", 2),
        ];
        for (id, restaurant, cuisine, times) in rows {
            order_n(&mut graph, id, restaurant, cuisine, times);
        }

        let expected = naive_pairs(&graph);
        discover_all(&mut graph);

        let mut actual = HashSet::new();
        for vertex in graph.vertices() {
            for neighbour in vertex.neighbours().keys() {
                actual.insert((vertex.id.min(*neighbour), vertex.id.max(*neighbour)));
            }
        }
        assert_eq!(actual, expected);
        assert_eq!(graph.edge_count(), expected.len());
    }

    #[test]
    fn test_incremental_after_second_order() {
        let mut graph = MatchGraph::new();
        order_n(&mut graph, 1000, "Pizza Place", "Italian", 2);
        order_n(&mut graph, 2000, "Pizza Place", "Italian", 1);
        discover_all(&mut graph);
        assert!(!graph.adjacent(uid(1000), uid(2000)));

        graph
            .record_order(uid(2000), "Pizza Place", "Italian", Rating::Given(5))
            .unwrap();
        let found = discover_for(&mut graph, uid(2000)).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, uid(1000));
        assert_eq!(found[0].cuisine, "Italian");
        assert_eq!(graph.label(uid(1000), uid(2000)), Some("Italian"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_incremental_skips_already_matched() {
        let mut graph = MatchGraph::new();
        order_n(&mut graph, 1000, "Pizza Place", "Italian", 2);
        order_n(&mut graph, 2000, "Pizza Place", "Italian", 2);
        graph.add_edge(uid(1000), uid(2000), "Italian").unwrap();

        assert!(discover_for(&mut graph, uid(1000)).unwrap().is_empty());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_incremental_no_match_is_not_an_error() {
        let mut graph = MatchGraph::new();
        order_n(&mut graph, 1000, "Pizza Place", "Italian", 2);
        order_n(&mut graph, 2000, "Sushi Bar", "Japanese", 2);

        assert!(discover_for(&mut graph, uid(1000)).unwrap().is_empty());
        assert!(discover_for(&mut graph, uid(9999)).is_err());
    }
}
