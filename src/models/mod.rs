use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

pub mod ledger;
pub mod menu;
pub mod recommendation;
pub mod snapshot;

pub use ledger::{OrderLedger, OrderTransition};
pub use menu::Menu;
pub use recommendation::{Recommendation, Recommendations, Slot};
pub use snapshot::{NeighbourRecord, UserSnapshot};

/// Identifier of a user, one per vertex in the match graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u32);

impl UserId {
    /// Lowest identifier handed out to new users
    pub const MIN_GENERATED: u32 = 1000;
    /// Exclusive upper bound for generated identifiers
    pub const MAX_GENERATED: u32 = 999_999;

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Draws a fresh identifier from `[MIN_GENERATED, MAX_GENERATED)`
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN_GENERATED..Self::MAX_GENERATED))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identity of an order: the restaurant and the cuisine ordered from it.
///
/// Ratings are not part of the identity, so two orders of the same dish
/// compare equal whatever the user thought of them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderKey {
    pub restaurant: String,
    pub cuisine: String,
}

impl OrderKey {
    /// Builds a key, rejecting blank restaurant or cuisine names
    pub fn new(restaurant: impl Into<String>, cuisine: impl Into<String>) -> AppResult<Self> {
        let restaurant = restaurant.into();
        let cuisine = cuisine.into();

        if restaurant.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "restaurant must not be empty".to_string(),
            ));
        }
        if cuisine.trim().is_empty() {
            return Err(AppError::InvalidInput("cuisine must not be empty".to_string()));
        }

        Ok(Self {
            restaurant,
            cuisine,
        })
    }
}

impl Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} from {}", self.cuisine, self.restaurant)
    }
}

/// Rating a user gave an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Option<u8>", into = "Option<u8>")]
pub enum Rating {
    /// Score between 0 and 5 inclusive
    Given(u8),
    /// The user skipped rating this order
    NotGiven,
}

impl Rating {
    pub const MAX: u8 = 5;

    /// Parses interactive input: a bare integer between 0 and 5
    pub fn parse(input: &str) -> AppResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::InvalidRating(format!(
                "'{}' is not a number",
                input
            )));
        }

        let score: u8 = trimmed.parse().map_err(|_| {
            AppError::InvalidRating(format!("'{}' must be between 0 and 5", input))
        })?;
        Self::try_from(Some(score)).map_err(AppError::InvalidRating)
    }

    /// Parses a dataset field, where unrated orders read "Not given"
    pub fn from_dataset(field: &str) -> AppResult<Self> {
        let trimmed = field.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("not given") {
            return Ok(Rating::NotGiven);
        }
        Self::parse(trimmed)
    }

    pub fn value(self) -> Option<u8> {
        match self {
            Rating::Given(score) => Some(score),
            Rating::NotGiven => None,
        }
    }
}

impl TryFrom<Option<u8>> for Rating {
    type Error = String;

    fn try_from(value: Option<u8>) -> Result<Self, Self::Error> {
        match value {
            Some(score) if score <= Rating::MAX => Ok(Rating::Given(score)),
            Some(score) => Err(format!("{} must be between 0 and {}", score, Rating::MAX)),
            None => Ok(Rating::NotGiven),
        }
    }
}

impl From<Rating> for Option<u8> {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Given(score) => write!(f, "{}", score),
            Rating::NotGiven => write!(f, "Not given"),
        }
    }
}

/// One classified order as it appears in a persisted snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub restaurant: String,
    pub cuisine: String,
    pub rating: Rating,
}

impl OrderRecord {
    pub fn new(key: &OrderKey, rating: Rating) -> Self {
        Self {
            restaurant: key.restaurant.clone(),
            cuisine: key.cuisine.clone(),
            rating,
        }
    }

    pub fn into_parts(self) -> AppResult<(OrderKey, Rating)> {
        let key = OrderKey::new(self.restaurant, self.cuisine)?;
        Ok((key, self.rating))
    }
}
