use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Restaurants seen in the order history and the cuisines each one serves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Menu {
    restaurants: BTreeMap<String, BTreeSet<String>>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, restaurant: &str, cuisine: &str) {
        self.restaurants
            .entry(restaurant.to_string())
            .or_default()
            .insert(cuisine.to_string());
    }

    pub fn contains_restaurant(&self, restaurant: &str) -> bool {
        self.restaurants.contains_key(restaurant)
    }

    pub fn serves(&self, restaurant: &str, cuisine: &str) -> bool {
        self.restaurants
            .get(restaurant)
            .is_some_and(|cuisines| cuisines.contains(cuisine))
    }

    pub fn cuisines(&self, restaurant: &str) -> Option<&BTreeSet<String>> {
        self.restaurants.get(restaurant)
    }

    /// Cuisine offered when the caller only picks a restaurant
    pub fn default_cuisine(&self, restaurant: &str) -> Option<&str> {
        self.restaurants
            .get(restaurant)
            .and_then(|cuisines| cuisines.iter().next())
            .map(String::as_str)
    }

    /// Keeps only the named restaurants
    pub fn restricted_to<'a>(&self, restaurants: impl IntoIterator<Item = &'a str>) -> Menu {
        let wanted: BTreeSet<&str> = restaurants.into_iter().collect();
        Menu {
            restaurants: self
                .restaurants
                .iter()
                .filter(|(name, _)| wanted.contains(name.as_str()))
                .map(|(name, cuisines)| (name.clone(), cuisines.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}
