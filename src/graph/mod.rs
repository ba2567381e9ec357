use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::{AppError, AppResult},
    models::{Menu, OrderKey, OrderTransition, Rating, UserId},
};

mod vertex;

pub use vertex::Vertex;

/// Attempts at drawing an unused id before giving up
const MAX_ID_ATTEMPTS: usize = 10_000;

/// Users, their classified orders, and the cuisine-labelled matches between them.
///
/// Matches are undirected: whenever `a` lists `b` as a neighbour, `b` lists
/// `a` with the same cuisine label, and no user is ever matched with
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MatchGraph {
    vertices: BTreeMap<UserId, Vertex>,
    /// Restored edges whose other end is not loaded yet, keyed by the missing user
    pending: BTreeMap<UserId, BTreeMap<UserId, String>>,
    menu: Menu,
}

impl MatchGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_menu(menu: Menu) -> Self {
        Self {
            menu,
            ..Self::default()
        }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Adds an empty vertex unless one already exists.
    ///
    /// Returns whether a vertex was created. Restored edges waiting on this
    /// user are connected.
    pub fn add_vertex(&mut self, id: UserId) -> bool {
        if self.vertices.contains_key(&id) {
            return false;
        }
        self.vertices.insert(id, Vertex::new(id));

        if let Some(waiting) = self.pending.remove(&id) {
            for (owner, label) in waiting {
                if self.vertices.contains_key(&owner) {
                    tracing::debug!(user_id = %id, neighbour = %owner, "Connecting deferred match");
                    self.link(id, owner, label);
                }
            }
        }
        true
    }

    /// Creates a vertex for a brand new user under a freshly drawn id
    pub fn new_user<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AppResult<UserId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = UserId::random(rng);
            if !self.vertices.contains_key(&id) && !self.pending.contains_key(&id) {
                self.add_vertex(id);
                tracing::info!(user_id = %id, "Created new user");
                return Ok(id);
            }
        }
        Err(AppError::Internal(
            "could not allocate an unused user id".to_string(),
        ))
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn vertex(&self, id: UserId) -> AppResult<&Vertex> {
        self.vertices.get(&id).ok_or(AppError::UnknownVertex(id))
    }

    pub(crate) fn vertex_mut(&mut self, id: UserId) -> AppResult<&mut Vertex> {
        self.vertices.get_mut(&id).ok_or(AppError::UnknownVertex(id))
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.vertices.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of undirected matches
    pub fn edge_count(&self) -> usize {
        self.vertices
            .values()
            .map(|v| v.neighbours.len())
            .sum::<usize>()
            / 2
    }

    /// Records an order in a user's ledger
    pub fn record_order(
        &mut self,
        id: UserId,
        restaurant: &str,
        cuisine: &str,
        rating: Rating,
    ) -> AppResult<OrderTransition> {
        let key = OrderKey::new(restaurant, cuisine)?;
        let vertex = self.vertex_mut(id)?;
        let transition = vertex.ledger.record(key, rating);

        tracing::debug!(
            user_id = %id,
            restaurant = %restaurant,
            cuisine = %cuisine,
            transition = ?transition,
            "Recorded order"
        );
        Ok(transition)
    }

    /// Matches two users on a cuisine, replacing any previous label
    pub fn add_edge(&mut self, id1: UserId, id2: UserId, cuisine: &str) -> AppResult<()> {
        self.ensure_known(id1)?;
        self.ensure_known(id2)?;
        if id1 == id2 {
            return Err(AppError::SelfEdge(id1));
        }

        self.link(id1, id2, cuisine.to_string());
        tracing::debug!(user_id = %id1, neighbour = %id2, cuisine = %cuisine, "Added match");
        Ok(())
    }

    /// Removes the match between two users, returning its cuisine label
    pub fn remove_edge(&mut self, id1: UserId, id2: UserId) -> AppResult<String> {
        self.ensure_known(id1)?;
        self.ensure_known(id2)?;

        let label = self
            .vertex_mut(id1)?
            .neighbours
            .remove(&id2)
            .ok_or(AppError::NotAdjacent(id1, id2))?;
        self.vertex_mut(id2)?.neighbours.remove(&id1);

        tracing::debug!(user_id = %id1, neighbour = %id2, "Removed match");
        Ok(label)
    }

    /// Whether two users are matched; unknown users are never matched
    pub fn adjacent(&self, id1: UserId, id2: UserId) -> bool {
        self.label(id1, id2).is_some()
    }

    /// Cuisine two users were matched on
    pub fn label(&self, id1: UserId, id2: UserId) -> Option<&str> {
        self.vertices
            .get(&id1)
            .and_then(|v| v.neighbours.get(&id2))
            .map(String::as_str)
    }

    pub fn neighbours_of(&self, id: UserId) -> AppResult<BTreeSet<UserId>> {
        Ok(self.vertex(id)?.neighbours.keys().copied().collect())
    }

    /// Re-creates a stored match for `owner`.
    ///
    /// When the neighbour is not in the graph yet the match is parked and
    /// connected once that user's vertex is added. Returns whether the edge
    /// exists now.
    pub fn restore_edge(&mut self, owner: UserId, neighbour: UserId, cuisine: &str) -> AppResult<bool> {
        self.ensure_known(owner)?;
        if owner == neighbour {
            return Err(AppError::SelfEdge(owner));
        }

        if self.contains(neighbour) {
            self.add_edge(owner, neighbour, cuisine)?;
            Ok(true)
        } else {
            tracing::debug!(user_id = %owner, neighbour = %neighbour, "Deferring match to unloaded user");
            self.pending
                .entry(neighbour)
                .or_default()
                .insert(owner, cuisine.to_string());
            Ok(false)
        }
    }

    /// Parked matches of `owner` that are still waiting on the other user
    pub fn pending_neighbours(&self, owner: UserId) -> Vec<(UserId, &str)> {
        self.pending
            .iter()
            .filter_map(|(missing, waiting)| {
                waiting.get(&owner).map(|label| (*missing, label.as_str()))
            })
            .collect()
    }

    /// Unmatches `user` from each of `matches`, then drops the repeated
    /// order that produced those matches from the user's ledger.
    ///
    /// Other orders the users still share are left alone. Nothing is
    /// removed unless every listed user is a distinct current match.
    pub fn remove_matches(&mut self, user: UserId, matches: &[UserId], order: &OrderKey) -> AppResult<()> {
        self.ensure_known(user)?;
        let mut checked = BTreeSet::new();
        for other in matches {
            self.ensure_known(*other)?;
            if !checked.insert(*other) || !self.adjacent(user, *other) {
                return Err(AppError::NotAdjacent(user, *other));
            }
        }
        for other in matches {
            self.remove_edge(user, *other)?;
        }
        self.vertex_mut(user)?.ledger.forget_repeated(order);

        tracing::info!(
            user_id = %user,
            removed = matches.len(),
            order = %order,
            "Removed matches"
        );
        Ok(())
    }

    /// The part of the menu that some user orders repeatedly
    pub fn featured_menu(&self) -> Menu {
        let restaurants: BTreeSet<&str> = self
            .vertices
            .values()
            .flat_map(|v| v.ledger.repeated().keys())
            .map(|key| key.restaurant.as_str())
            .collect();
        self.menu.restricted_to(restaurants)
    }

    fn ensure_known(&self, id: UserId) -> AppResult<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(AppError::UnknownVertex(id))
        }
    }

    fn link(&mut self, id1: UserId, id2: UserId, cuisine: String) {
        if let Some(v) = self.vertices.get_mut(&id1) {
            v.neighbours.insert(id2, cuisine.clone());
        }
        if let Some(v) = self.vertices.get_mut(&id2) {
            v.neighbours.insert(id1, cuisine);
        }
        for id in [id1, id2] {
            let other = if id == id1 { id2 } else { id1 };
            if let Some(waiting) = self.pending.get_mut(&other) {
                waiting.remove(&id);
            }
        }
    }
}
