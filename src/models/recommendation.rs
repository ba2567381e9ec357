use serde::Serialize;
use std::fmt::Display;

use super::{OrderKey, UserId};

/// Who a recommendation is attributed to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slot {
    /// Several matches tried the same order
    Aggregate { count: u32, rating: Option<f64> },
    /// A single match tried the order
    SingleAttribution {
        contributor: UserId,
        rating: Option<f64>,
    },
}

impl Slot {
    pub fn rating(&self) -> Option<f64> {
        match self {
            Slot::Aggregate { rating, .. } | Slot::SingleAttribution { rating, .. } => *rating,
        }
    }
}

/// An order the requesting user has not tried, drawn from their matches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub source: Slot,
    pub order: OrderKey,
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Slot::Aggregate { count, rating } => {
                write!(
                    f,
                    "{} of your matches tried {} from {}",
                    count, self.order.cuisine, self.order.restaurant
                )?;
                if let Some(rating) = rating {
                    write!(f, ", average rating {}", format_rating(*rating))?;
                }
                Ok(())
            }
            Slot::SingleAttribution {
                contributor,
                rating,
            } => {
                write!(
                    f,
                    "User {} tried {} from {}",
                    contributor, self.order.cuisine, self.order.restaurant
                )?;
                if let Some(rating) = rating {
                    write!(f, ", rated {}", format_rating(*rating))?;
                }
                write!(f, ".")
            }
        }
    }
}

/// Whole numbers print bare, anything else with one decimal
fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{}", rating as i64)
    } else {
        format!("{:.1}", rating)
    }
}

/// Outcome of a recommendation request
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendations {
    /// The user has not been matched with anyone
    NoMatches,
    /// Matches exist but none of them tried anything new for the user
    NothingNew,
    Ranked(Vec<Recommendation>),
}

impl Recommendations {
    pub fn entries(&self) -> &[Recommendation] {
        match self {
            Recommendations::Ranked(entries) => entries,
            Recommendations::NoMatches | Recommendations::NothingNew => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> OrderKey {
        OrderKey::new("Pizza Place", "Italian").unwrap()
    }

    #[test]
    fn test_single_attribution_with_rating() {
        let rec = Recommendation {
            source: Slot::SingleAttribution {
                contributor: UserId::new(2000),
                rating: Some(5.0),
            },
            order: order(),
        };
        assert_eq!(
            rec.to_string(),
            "User 2000 tried Italian from Pizza Place, rated 5."
        );
    }

    #[test]
    fn test_single_attribution_without_rating() {
        let rec = Recommendation {
            source: Slot::SingleAttribution {
                contributor: UserId::new(2000),
                rating: None,
            },
            order: order(),
        };
        assert_eq!(rec.to_string(), "User 2000 tried Italian from Pizza Place.");
    }

    #[test]
    fn test_aggregate_with_fractional_average() {
        let rec = Recommendation {
            source: Slot::Aggregate {
                count: 2,
                rating: Some(4.5),
            },
            order: order(),
        };
        assert_eq!(
            rec.to_string(),
            "2 of your matches tried Italian from Pizza Place, average rating 4.5"
        );
    }

    #[test]
    fn test_aggregate_without_rating() {
        let rec = Recommendation {
            source: Slot::Aggregate {
                count: 3,
                rating: None,
            },
            order: order(),
        };
        assert_eq!(rec.to_string(), "3 of your matches tried Italian from Pizza Place");
    }

    #[test]
    fn test_entries_empty_for_non_ranked() {
        assert!(Recommendations::NoMatches.entries().is_empty());
        assert!(Recommendations::NothingNew.entries().is_empty());
    }
}
