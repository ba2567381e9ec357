use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::graph::{MatchGraph, Vertex};
use crate::models::{Menu, OrderKey, OrderTransition, Rating, Recommendations, Slot, UserId};
use crate::services::discovery::{self, NewMatch};
use crate::services::persistence;
use crate::services::RecommendationEngine;

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub one_time_orders: usize,
    pub repeated_orders: usize,
    pub matches: usize,
}

impl From<&Vertex> for UserResponse {
    fn from(vertex: &Vertex) -> Self {
        Self {
            user_id: vertex.id,
            one_time_orders: vertex.ledger.one_time().len(),
            repeated_orders: vertex.ledger.repeated().len(),
            matches: vertex.neighbours().len(),
        }
    }
}

/// A rating as typed by the user, either a JSON number or a string.
///
/// Any other JSON value is kept so it can be rejected as an invalid rating.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RatingInput {
    Number(i64),
    Text(String),
    Other(Value),
}

impl RatingInput {
    pub fn parse(&self) -> AppResult<Rating> {
        match self {
            RatingInput::Number(n) => u8::try_from(*n)
                .ok()
                .and_then(|score| Rating::try_from(Some(score)).ok())
                .ok_or_else(|| AppError::InvalidRating(format!("{} must be between 0 and 5", n))),
            RatingInput::Text(text) => Rating::parse(text),
            RatingInput::Other(value) => Err(AppError::InvalidRating(format!(
                "{} is not a whole number",
                value
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub restaurant: String,
    /// Falls back to the restaurant's first cuisine on the menu
    pub cuisine: Option<String>,
    pub rating: RatingInput,
}

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub transition: OrderTransition,
    pub new_matches: Vec<NewMatch>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub user_id: UserId,
    pub cuisine: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveMatchesRequest {
    pub users: Vec<UserId>,
    pub restaurant: String,
    pub cuisine: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    NoMatches,
    NothingNew,
    Ranked,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub source: Slot,
    pub restaurant: String,
    pub cuisine: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub status: RecommendationStatus,
    pub recommendations: Vec<RecommendationResponse>,
}

impl From<Recommendations> for RecommendationsResponse {
    fn from(result: Recommendations) -> Self {
        let status = match &result {
            Recommendations::NoMatches => RecommendationStatus::NoMatches,
            Recommendations::NothingNew => RecommendationStatus::NothingNew,
            Recommendations::Ranked(_) => RecommendationStatus::Ranked,
        };
        let recommendations = result
            .entries()
            .iter()
            .map(|rec| RecommendationResponse {
                source: rec.source.clone(),
                restaurant: rec.order.restaurant.clone(),
                cuisine: rec.order.cuisine.clone(),
                message: rec.to_string(),
            })
            .collect();

        Self {
            status,
            recommendations,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Register a new user under a freshly generated id
pub async fn create_user(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let mut inner = state.inner.write().await;
    let mut rng = StdRng::from_entropy();
    let user_id = inner.graph.new_user(&mut rng)?;

    persistence::save_user(state.store.as_ref(), &inner.graph, user_id).await?;

    let response = UserResponse::from(inner.graph.vertex(user_id)?);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Resume a returning user's session from their saved snapshot
pub async fn open_session(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<UserResponse>> {
    let mut inner = state.inner.write().await;
    persistence::load_user(state.store.as_ref(), &mut inner.graph, user_id).await?;

    Ok(Json(UserResponse::from(inner.graph.vertex(user_id)?)))
}

/// Record an order, look for new matches, and save the user
pub async fn place_order(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<PlaceOrderRequest>,
) -> AppResult<Json<PlaceOrderResponse>> {
    let rating = request.rating.parse()?;

    let mut inner = state.inner.write().await;
    let graph = &mut inner.graph;
    graph.vertex(user_id)?;
    let cuisine = resolve_cuisine(graph.menu(), &request.restaurant, request.cuisine)?;

    let transition = graph.record_order(user_id, &request.restaurant, &cuisine, rating)?;
    let new_matches = discovery::discover_for(graph, user_id)?;
    persistence::save_user(state.store.as_ref(), graph, user_id).await?;

    tracing::info!(
        user_id = %user_id,
        restaurant = %request.restaurant,
        cuisine = %cuisine,
        transition = ?transition,
        new_matches = new_matches.len(),
        "Order placed"
    );

    Ok(Json(PlaceOrderResponse {
        transition,
        new_matches,
    }))
}

/// Checks an order against the menu and picks its cuisine.
///
/// An empty menu accepts any restaurant, since nothing was ingested.
fn resolve_cuisine(menu: &Menu, restaurant: &str, cuisine: Option<String>) -> AppResult<String> {
    if menu.is_empty() {
        return cuisine
            .ok_or_else(|| AppError::InvalidInput("cuisine is required".to_string()));
    }
    if !menu.contains_restaurant(restaurant) {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not on the menu",
            restaurant
        )));
    }

    match cuisine {
        Some(cuisine) if menu.serves(restaurant, &cuisine) => Ok(cuisine),
        Some(cuisine) => Err(AppError::InvalidInput(format!(
            "'{}' does not serve {}",
            restaurant, cuisine
        ))),
        None => menu
            .default_cuisine(restaurant)
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidInput("cuisine is required".to_string())),
    }
}

/// List a user's matches and the cuisine each was made on
pub async fn list_matches(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<MatchResponse>>> {
    let inner = state.inner.read().await;
    Ok(Json(matches_of(&inner.graph, user_id)?))
}

fn matches_of(graph: &MatchGraph, user_id: UserId) -> AppResult<Vec<MatchResponse>> {
    Ok(graph
        .vertex(user_id)?
        .neighbours()
        .iter()
        .map(|(id, cuisine)| MatchResponse {
            user_id: *id,
            cuisine: cuisine.clone(),
        })
        .collect())
}

/// Undo matches made by an order and forget that the order was repeated
pub async fn remove_matches(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<RemoveMatchesRequest>,
) -> AppResult<StatusCode> {
    let order = OrderKey::new(request.restaurant, request.cuisine)?;

    let mut inner = state.inner.write().await;
    inner.graph.remove_matches(user_id, &request.users, &order)?;
    persistence::save_user(state.store.as_ref(), &inner.graph, user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Orders the user's matches tried that the user has not
pub async fn recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<RecommendationsResponse>> {
    let inner = state.inner.read().await;
    let result = RecommendationEngine::new(&inner.graph).rank(user_id)?;
    Ok(Json(result.into()))
}

/// Restaurants someone orders repeatedly, with their cuisines
pub async fn get_menu(State(state): State<AppState>) -> Json<Menu> {
    let inner = state.inner.read().await;
    Json(inner.graph.featured_menu())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_input_number() {
        assert_eq!(RatingInput::Number(5).parse().unwrap(), Rating::Given(5));
        assert!(RatingInput::Number(6).parse().is_err());
        assert!(RatingInput::Number(-2).parse().is_err());
    }

    #[test]
    fn test_rating_input_text() {
        assert_eq!(
            RatingInput::Text("0".to_string()).parse().unwrap(),
            Rating::Given(0)
        );
        assert!(matches!(
            RatingInput::Text("great".to_string()).parse(),
            Err(AppError::InvalidRating(_))
        ));
    }

    #[test]
    fn test_rating_input_other_json() {
        for raw in ["4.5", "true", "null", "[4]"] {
            let input: RatingInput = serde_json::from_str(raw).unwrap();
            assert!(matches!(input.parse(), Err(AppError::InvalidRating(_))));
        }
    }

    #[test]
    fn test_resolve_cuisine() {
        let mut menu = Menu::new();
        menu.add("Fusion House", "Thai");
        menu.add("Fusion House", "Korean");

        assert_eq!(resolve_cuisine(&menu, "Fusion House", None).unwrap(), "Korean");
        assert_eq!(
            resolve_cuisine(&menu, "Fusion House", Some("Thai".to_string())).unwrap(),
            "Thai"
        );
        assert!(resolve_cuisine(&menu, "Fusion House", Some("Greek".to_string())).is_err());
        assert!(resolve_cuisine(&menu, "Nowhere", None).is_err());
    }

    #[test]
    fn test_resolve_cuisine_without_menu() {
        let menu = Menu::new();
        assert_eq!(
            resolve_cuisine(&menu, "Anywhere", Some("Greek".to_string())).unwrap(),
            "Greek"
        );
        assert!(resolve_cuisine(&menu, "Anywhere", None).is_err());
    }
}
