use crate::{
    error::AppResult,
    graph::MatchGraph,
    models::{OrderKey, Recommendation, Recommendations, Slot, UserId},
};

/// Ranks orders a user's matches have tried that the user has not.
///
/// Only one-time orders of a match count, and only those in the cuisine the
/// match was made on. An order tried by several matches collapses into one
/// aggregate slot whose rating is a running average of the contributions.
pub struct RecommendationEngine<'a> {
    graph: &'a MatchGraph,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(graph: &'a MatchGraph) -> Self {
        Self { graph }
    }

    /// Builds the recommendation list for `user`.
    ///
    /// Slots are ordered by when they were created or last merged, the most
    /// recently merged last.
    pub fn rank(&self, user: UserId) -> AppResult<Recommendations> {
        let me = self.graph.vertex(user)?;
        if !me.is_matched() {
            return Ok(Recommendations::NoMatches);
        }

        let mut slots: Vec<Recommendation> = Vec::new();

        for (match_id, cuisine) in me.neighbours() {
            let matched = self.graph.vertex(*match_id)?;
            for (order, rating) in matched.ledger.one_time() {
                if &order.cuisine != cuisine || me.ledger.has_tried(order) {
                    continue;
                }
                merge_candidate(&mut slots, *match_id, order, rating.value().map(f64::from));
            }
        }

        tracing::debug!(
            user_id = %user,
            matches = me.neighbours().len(),
            recommendations = slots.len(),
            "Ranked recommendations"
        );

        if slots.is_empty() {
            Ok(Recommendations::NothingNew)
        } else {
            Ok(Recommendations::Ranked(slots))
        }
    }
}

fn merge_candidate(
    slots: &mut Vec<Recommendation>,
    contributor: UserId,
    order: &OrderKey,
    rating: Option<f64>,
) {
    let Some(pos) = slots.iter().position(|slot| &slot.order == order) else {
        slots.push(Recommendation {
            source: Slot::SingleAttribution {
                contributor,
                rating,
            },
            order: order.clone(),
        });
        return;
    };

    let existing = slots.remove(pos);
    let source = match existing.source {
        Slot::SingleAttribution { rating: prev, .. } => Slot::Aggregate {
            count: 2,
            rating: average(prev, rating),
        },
        Slot::Aggregate { count, rating: prev } => Slot::Aggregate {
            count: count + 1,
            rating: average(prev, rating),
        },
    };
    slots.push(Recommendation {
        source,
        order: existing.order,
    });
}

/// Mean of two ratings; a missing side defers to the other.
///
/// The running mean keeps its fraction between merges instead of being
/// cut to a whole number.
fn average(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}
